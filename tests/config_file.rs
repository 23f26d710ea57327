//! Settings file parsing and round-trip tests.

use searxngr::config::{read_settings, Settings};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn minimal_file_fills_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "searxng_url = \"https://searxng.example.com\"").unwrap();

    let settings = read_settings(file.path()).unwrap();
    assert_eq!(
        settings.searxng_url.as_deref(),
        Some("https://searxng.example.com")
    );
    assert_eq!(settings.result_count, 10);
    assert_eq!(settings.safe_search, "strict");
    assert_eq!(settings.categories, vec!["general".to_string()]);
    assert_eq!(settings.http_method, "GET");
    assert_eq!(settings.timeout_secs, 30);
    assert!(!settings.expand);
    assert!(!settings.no_verify_ssl);
}

#[test]
fn full_file_round_trips() {
    let mut settings = Settings::default();
    settings.searxng_url = Some("https://searxng.example.com".to_string());
    settings.result_count = 20;
    settings.safe_search = "moderate".to_string();
    settings.engines = vec!["google".to_string(), "duckduckgo".to_string()];
    settings.categories = vec!["news".to_string(), "general".to_string()];
    settings.expand = true;
    settings.language = Some("en".to_string());
    settings.username = Some("user".to_string());
    settings.password = Some("pass".to_string());

    let serialized = toml::to_string_pretty(&settings).unwrap();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serialized.as_bytes()).unwrap();

    let loaded = read_settings(file.path()).unwrap();
    assert_eq!(loaded.result_count, 20);
    assert_eq!(loaded.safe_search, "moderate");
    assert_eq!(loaded.engines, settings.engines);
    assert_eq!(loaded.categories, settings.categories);
    assert!(loaded.expand);
    assert_eq!(loaded.language.as_deref(), Some("en"));
    assert_eq!(loaded.username.as_deref(), Some("user"));
}

#[test]
fn malformed_file_is_an_error_not_a_default() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "result_count = \"lots\"").unwrap();
    assert!(read_settings(file.path()).is_err());
}
