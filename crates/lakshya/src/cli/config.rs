//! Configuration loading and the `config` command.

use lakshya::{LakshyaConfig, LakshyaResult};
use std::path::Path;

/// Configuration from `path` when given, otherwise the standard layers.
pub fn load_config(path: Option<&Path>) -> LakshyaResult<LakshyaConfig> {
    match path {
        Some(path) => LakshyaConfig::from_file(path),
        None => LakshyaConfig::load(),
    }
}

/// Print `config` as pretty JSON on stdout.
pub fn show_config(config: &LakshyaConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
