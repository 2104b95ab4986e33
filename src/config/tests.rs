//! Configuration tests

use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

/// The generated template must parse back into the file layer
#[test]
fn test_config_roundtrip_default() {
    let toml_str = Config::default().to_toml();
    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_display_toml_masks_session_cookie() {
    let mut config = Config::default();
    config.session_cookie = Some("JSESSIONID=secret-value".to_string());

    let shown = config.to_display_toml();
    assert!(!shown.contains("secret-value"));
    assert!(shown.contains("JSESSIONID=********"));
    // Still valid TOML
    let _: FileConfig = toml::from_str(&shown).unwrap();

    assert!(config.to_toml().contains("secret-value"));
}

#[test]
fn test_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.base_url = "http://example.test/app/".to_string();
    config.session_cookie = Some("JSESSIONID=abc\"def".to_string());
    config.mode = Mode::Admin;
    config.bulk_stagger = Duration::from_millis(50);
    config.logging.file_rotation = LogRotation::Hourly;

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let loaded = Config::from_sources(file, env_from(&[]));
    assert_eq!(loaded.base_url, "http://example.test/app/");
    assert_eq!(loaded.session_cookie.as_deref(), Some("JSESSIONID=abc\"def"));
    assert_eq!(loaded.mode, Mode::Admin);
    assert_eq!(loaded.bulk_stagger, Duration::from_millis(50));
    assert_eq!(loaded.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_defaults_without_file_or_env() {
    let config = Config::from_sources(FileConfig::default(), env_from(&[]));
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.mode, Mode::Public);
    assert_eq!(config.session_cookie, None);
    assert_eq!(config.bulk_stagger, Duration::from_millis(200));
    assert_eq!(config.certificate, CertificateConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
base_url = "http://file.test"
mode = "public"
download_dir = "/tmp/file"
"#,
    )
    .unwrap();
    let config = Config::from_sources(
        file,
        env_from(&[
            (ENV_BASE_URL, "http://env.test/root"),
            (ENV_MODE, "admin"),
            (ENV_SESSION, "JSESSIONID=1"),
        ]),
    );
    assert_eq!(config.base_url, "http://env.test/root/");
    assert_eq!(config.mode, Mode::Admin);
    assert_eq!(config.session_cookie.as_deref(), Some("JSESSIONID=1"));
    // Not overridden: file value wins over default
    assert_eq!(config.download_dir, PathBuf::from("/tmp/file"));
}

#[test]
fn test_blank_env_values_are_ignored() {
    let file: FileConfig = toml::from_str(r#"base_url = "http://file.test/""#).unwrap();
    let config = Config::from_sources(file, env_from(&[(ENV_BASE_URL, "  ")]));
    assert_eq!(config.base_url, "http://file.test/");
}

#[test]
fn test_certificate_values_are_clamped() {
    let file: FileConfig = toml::from_str(
        r#"
[certificate]
quality = 0
scale = 9
"#,
    )
    .unwrap();
    let config = Config::from_sources(file, env_from(&[]));
    assert_eq!(config.certificate.quality, 1);
    assert_eq!(config.certificate.scale, 4);
}

#[test]
fn test_cli_overrides_win() {
    let config = Config::from_sources(FileConfig::default(), env_from(&[(ENV_MODE, "public")]))
        .with_overrides(true, Some("http://cli.test".to_string()));
    assert_eq!(config.mode, Mode::Admin);
    assert_eq!(config.base_url, "http://cli.test/");
}

#[test]
fn test_log_rotation_parse() {
    assert_eq!(LogRotation::parse("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::parse("never"), LogRotation::Never);
    assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
}

#[test]
fn test_state_file_lives_in_state_dir() {
    let mut config = Config::default();
    config.state_dir = PathBuf::from("/var/tmp/eventdesk");
    assert_eq!(
        config.state_file(),
        PathBuf::from("/var/tmp/eventdesk/state.json")
    );
}
