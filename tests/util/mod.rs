use annotation_filter::model::types::{Annotation, Selector, Target, Timestamp, UserInfo};
use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;

/// Stable reference instant for deterministic `since` tests (2023-11-14T22:13:20Z).
#[allow(dead_code)]
pub const BASE_TS_MS: i64 = 1_700_000_000_000;

#[allow(dead_code)]
pub fn base_now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(BASE_TS_MS).unwrap()
}

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

#[allow(dead_code)]
struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

#[allow(dead_code)]
pub struct TempFixtureDir {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TempFixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Write `contents` to `name` inside the fixture dir and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }
}

/// Builder for annotation fixtures with sensible defaults.
#[allow(dead_code)]
pub struct AnnotationFixtureBuilder {
    id: Option<String>,
    text: String,
    tags: Vec<String>,
    uri: String,
    user: String,
    display_name: Option<String>,
    quote: Option<String>,
    updated: Option<Timestamp>,
}

#[allow(dead_code)]
impl AnnotationFixtureBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: String::new(),
            tags: Vec::new(),
            uri: "https://example.com/article".into(),
            user: "acct:tester@example.com".into(),
            display_name: None,
            quote: None,
            updated: Some(Timestamp::EpochMillis(BASE_TS_MS)),
        }
    }

    /// Fixture with no id at all.
    pub fn anonymous() -> Self {
        let mut builder = Self::new("");
        builder.id = None;
        builder
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }

    /// Last update `secs` seconds before [`BASE_TS_MS`].
    pub fn updated_secs_ago(mut self, secs: i64) -> Self {
        self.updated = Some(Timestamp::EpochMillis(BASE_TS_MS - secs * 1000));
        self
    }

    pub fn updated(mut self, ts: Timestamp) -> Self {
        self.updated = Some(ts);
        self
    }

    pub fn build(self) -> Annotation {
        let target = self
            .quote
            .map(|exact| Target {
                source: self.uri.clone(),
                selector: vec![Selector::TextQuote {
                    exact,
                    prefix: None,
                    suffix: None,
                }],
            })
            .into_iter()
            .collect();
        Annotation {
            id: self.id,
            text: self.text,
            tags: self.tags,
            uri: self.uri,
            user: self.user,
            user_info: self.display_name.map(|name| UserInfo {
                display_name: Some(name),
            }),
            updated: self.updated,
            target,
        }
    }
}

/// A small mixed corpus used across integration tests.
#[allow(dead_code)]
pub fn sample_corpus() -> Vec<Annotation> {
    vec![
        AnnotationFixtureBuilder::new("rust-intro")
            .text("Ownership and borrowing in Rust")
            .tags(["rust", "Programming"])
            .user("acct:ferris@example.com")
            .display_name("Ferris Crab")
            .quote("The borrow checker")
            .updated_secs_ago(30)
            .build(),
        AnnotationFixtureBuilder::new("cafe-review")
            .text("Best café in town, crème brûlée was great")
            .tags(["food"])
            .uri("https://reviews.example.org/cafe")
            .user("acct:gourmand@example.org")
            .display_name("Zoë Müller")
            .updated_secs_ago(3_600)
            .build(),
        AnnotationFixtureBuilder::anonymous()
            .text("Rust without an id")
            .tags(["rust"])
            .build(),
        AnnotationFixtureBuilder::new("python-notes")
            .text("List comprehensions")
            .tags(["python", "programming"])
            .user("acct:guido@example.com")
            .quote("Readability counts")
            .updated_secs_ago(86_400)
            .build(),
        AnnotationFixtureBuilder::new("")
            .text("Rust with an empty id")
            .build(),
    ]
}
