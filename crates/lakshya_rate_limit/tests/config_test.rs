//! Tests for configuration loading.

use lakshya_rate_limit::LakshyaConfig;
use std::io::Write;

#[test]
fn test_bundled_defaults() -> anyhow::Result<()> {
    let config = LakshyaConfig::from_toml_str("")?;

    assert_eq!(*config.retry.max_attempts(), 3);
    assert_eq!(*config.retry.base_delay_ms(), 2000);
    assert_eq!(*config.retry.backoff_multiplier(), 2.0);
    assert_eq!(config.model.name(), "gemini-2.0-flash");
    assert_eq!(config.model.api_key_env(), "GEMINI_API_KEY");
    assert_eq!(config.chat.fallback_message(), "Sorry, I encountered an error.");
    assert!(config.storage.path.is_none());
    Ok(())
}

#[test]
fn test_bundled_templates_present() -> anyhow::Result<()> {
    let config = LakshyaConfig::from_toml_str("")?;

    for id in [
        "counselor_system",
        "day_in_life",
        "future_pathways",
        "college_finder",
        "recommendations",
        "quiz_suggestions",
    ] {
        assert!(config.template(id).is_some(), "missing template {}", id);
    }
    assert!(config.template("unknown").is_none());
    Ok(())
}

#[test]
fn test_overrides_win_over_defaults() -> anyhow::Result<()> {
    let config = LakshyaConfig::from_toml_str(
        r#"
        [retry]
        max_attempts = 5
        base_delay_ms = 250

        [model]
        name = "gemini-1.5-pro"

        [templates.custom]
        text = "Hello {{name}}"
        "#,
    )?;

    assert_eq!(*config.retry.max_attempts(), 5);
    assert_eq!(*config.retry.base_delay_ms(), 250);
    assert_eq!(*config.retry.backoff_multiplier(), 2.0);
    assert_eq!(config.model.name(), "gemini-1.5-pro");
    assert_eq!(config.template("custom"), Some("Hello {{name}}"));
    assert!(config.template("day_in_life").is_some());
    Ok(())
}

#[test]
fn test_invalid_retry_policy_rejected() {
    let result = LakshyaConfig::from_toml_str(
        r#"
        [retry]
        max_attempts = 0
        "#,
    );
    assert!(result.is_err());

    let result = LakshyaConfig::from_toml_str(
        r#"
        [retry]
        backoff_multiplier = 1.0
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_unknown_retry_field_rejected() {
    let result = LakshyaConfig::from_toml_str(
        r#"
        [retry]
        max_attempt = 4
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_config_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
[storage]
path = "/tmp/lakshya-data"

[chat]
history_limit = 6
"#
    )?;

    let config = LakshyaConfig::from_file(file.path())?;

    assert_eq!(
        config.storage.path.as_deref(),
        Some(std::path::Path::new("/tmp/lakshya-data"))
    );
    assert_eq!(*config.chat.history_limit(), 6);
    assert_eq!(*config.chat.max_tool_rounds(), 4);
    Ok(())
}

#[test]
fn test_missing_file_is_error() {
    assert!(LakshyaConfig::from_file("/nonexistent/lakshya.toml").is_err());
}
