use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use annotation_filter::{
    Annotation, FilterConfig, FilterOptions, StructuredQuery, UnknownFieldPolicy,
    filter_annotations_with,
};

/// Filter a JSON array of annotations with a structured query and print the
/// ids that match.
#[derive(Parser, Debug)]
#[command(name = "annofilter", version, about = "Filter annotations by structured query")]
struct Cli {
    /// JSON file holding an array of annotations (`-` reads stdin)
    #[arg(long, value_name = "FILE")]
    annotations: PathBuf,

    /// JSON file holding the structured query
    #[arg(long, value_name = "FILE", conflicts_with = "query_json")]
    query: Option<PathBuf>,

    /// Structured query given inline as JSON
    #[arg(long, value_name = "JSON")]
    query_json: Option<String>,

    /// Config file (defaults to $XDG_CONFIG_HOME/annofilter/config.toml)
    #[arg(long, value_name = "FILE", env = "ANNOFILTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured unknown-field policy (ignore | reject)
    #[arg(long, value_name = "POLICY")]
    unknown_fields: Option<UnknownFieldPolicy>,

    /// Reference time for `since` as RFC 3339 (defaults to now)
    #[arg(long, value_name = "RFC3339")]
    now: Option<DateTime<Utc>>,

    /// Print a JSON array instead of one id per line
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// `ANNOFILTER_LOG` > `RUST_LOG` > `--log-level`.
fn init_tracing(level: &str) {
    let filter = std::env::var("ANNOFILTER_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading annotations from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_query(cli: &Cli) -> Result<StructuredQuery> {
    let (raw, origin) = match (&cli.query, &cli.query_json) {
        (Some(path), None) => (read_input(path)?, path.display().to_string()),
        (None, Some(inline)) => (inline.clone(), "--query-json".to_string()),
        (None, None) => bail!("one of --query or --query-json is required"),
        (Some(_), Some(_)) => bail!("--query and --query-json are mutually exclusive"),
    };
    serde_json::from_str(&raw).with_context(|| format!("parsing query from {origin}"))
}

fn main() -> Result<()> {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = match &cli.config {
        Some(path) => FilterConfig::load_from(path),
        None => FilterConfig::load(),
    }
    .context("loading configuration")?;

    let mut options = FilterOptions::from(&config);
    if let Some(policy) = cli.unknown_fields {
        options = options.with_unknown_fields(policy);
    }
    if let Some(now) = cli.now {
        options = options.with_now(now);
    }

    let query = load_query(&cli)?;
    let annotations: Vec<Annotation> = serde_json::from_str(&read_input(&cli.annotations)?)
        .with_context(|| format!("parsing annotations from {}", cli.annotations.display()))?;

    let ids = filter_annotations_with(&annotations, &query, &options)?;

    if cli.json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        for id in &ids {
            println!("{id}");
        }
    }
    Ok(())
}
