use ngi_assets::{ConfigError, NextGenConfig};
use ngi_fileid::AddressingScheme;
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_load_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
addressing = "natural"

[derived_format]
quality = 60

[render]
allow_session_grant = true
cache_ttl_secs = 30
"#
    )
    .unwrap();

    let config = NextGenConfig::load(file.path()).unwrap();
    assert_eq!(config.addressing, AddressingScheme::Natural);
    assert_eq!(config.derived_format.quality, 60);
    assert_eq!(config.derived_format.extension, "webp");
    assert!(config.render.allow_session_grant);
    assert!(config.render.lazy_loading);
    assert_eq!(config.render.cache_ttl().map(|ttl| ttl.as_secs()), Some(30));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = NextGenConfig::load(dir.path().join("ngi.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_load_rejects_bad_quality() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[derived_format]\nquality = 0").unwrap();
    let err = NextGenConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Quality(0)));
}

#[test]
fn test_round_trips_through_toml() {
    let config = NextGenConfig::new()
        .with_addressing(AddressingScheme::Natural)
        .with_session_grant(true);
    let text = toml::to_string(&config).unwrap();
    assert_eq!(NextGenConfig::from_toml_str(&text).unwrap(), config);
}
