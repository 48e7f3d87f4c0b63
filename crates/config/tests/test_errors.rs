//! Tests for error handling

use nbpilot_config::{Config, ConfigError};
use std::io;

#[test]
fn test_io_error_display() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err = ConfigError::Io(io_err);

    let display = format!("{}", err);
    assert!(display.contains("config I/O error"));
    assert!(display.contains("file not found"));
}

#[test]
fn test_json_error_display() {
    let json_err: serde_json::Error =
        serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
    let err = ConfigError::Json(json_err);

    assert!(err.to_string().contains("invalid config JSON"));
}

#[test]
fn test_unknown_provider_display() {
    let err = ConfigError::UnknownProvider("azure".to_string());
    assert_eq!(err.to_string(), "unknown LLM provider: azure");
}

#[test]
fn test_error_trait() {
    fn check_error_trait<T: std::error::Error + Send + Sync + 'static>() {}
    check_error_trait::<ConfigError>();
}

#[test]
fn test_io_error_from() {
    let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "no permission");
    let err: ConfigError = io_err.into();
    assert!(matches!(err, ConfigError::Io(_)));
}

/// Malformed JSON on disk surfaces as a Json error
#[tokio::test]
async fn test_load_malformed_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let result = Config::load_from(&path).await;
    assert!(matches!(result, Err(ConfigError::Json(_))));
}

/// A provider pointing at an unknown backend is reported by name
#[test]
fn test_default_llm_unknown_provider() {
    let mut config = Config::default();
    config.agent.provider = "missing".to_string();

    match config.default_llm() {
        Err(ConfigError::UnknownProvider(name)) => assert_eq!(name, "missing"),
        other => panic!("Expected UnknownProvider, got {:?}", other),
    }
}
