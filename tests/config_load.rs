use annotation_filter::{FilterConfig, FilterOptions, UnknownFieldPolicy};
use serial_test::serial;

mod util;

use util::{EnvGuard, TempFixtureDir};

#[test]
#[serial]
fn config_path_respects_xdg_config_home() {
    let fixture = TempFixtureDir::new();
    let _guard = EnvGuard::set("XDG_CONFIG_HOME", fixture.path().to_string_lossy());
    let path = FilterConfig::config_path().unwrap();
    assert_eq!(path, fixture.path().join("annofilter").join("config.toml"));
}

#[test]
#[serial]
fn load_without_file_gives_defaults() {
    let fixture = TempFixtureDir::new();
    let _guard = EnvGuard::set("XDG_CONFIG_HOME", fixture.path().to_string_lossy());
    assert_eq!(FilterConfig::load().unwrap(), FilterConfig::default());
}

#[test]
#[serial]
fn load_reads_xdg_file() {
    let fixture = TempFixtureDir::new();
    let _guard = EnvGuard::set("XDG_CONFIG_HOME", fixture.path().to_string_lossy());
    std::fs::create_dir_all(fixture.path().join("annofilter")).unwrap();
    fixture.write("annofilter/config.toml", "unknown_fields = \"reject\"\n");

    let config = FilterConfig::load().unwrap();
    assert_eq!(config.unknown_fields, UnknownFieldPolicy::Reject);
    assert_eq!(
        FilterOptions::from(&config).unknown_fields,
        UnknownFieldPolicy::Reject
    );
}

#[test]
fn saved_config_is_human_readable() {
    let fixture = TempFixtureDir::new();
    let path = fixture.path().join("config.toml");
    FilterConfig {
        unknown_fields: UnknownFieldPolicy::Reject,
    }
    .save_to(&path)
    .unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("unknown_fields = \"reject\""), "got: {raw}");
}
