//! Runtime configuration.
//!
//! The configuration system layers:
//! - Bundled defaults (include_str! from lakshya.toml)
//! - User overrides (~/.config/lakshya/lakshya.toml, then ./lakshya.toml)
//! - Environment variables prefixed `LAKSHYA__` (e.g. `LAKSHYA__RETRY__MAX_ATTEMPTS=5`)
//!
//! Later sources win.

use config::{Config, Environment, File, FileFormat};
use lakshya_core::RetryPolicy;
use lakshya_error::{ConfigError, LakshyaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../lakshya.toml");

/// Model backend settings.
///
/// ```toml
/// [model]
/// name = "gemini-2.0-flash"
/// api_key_env = "GEMINI_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct ModelConfig {
    /// Default model identifier
    name: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    api_key_env: String,

    /// Base URL of the generative language API
    #[serde(default = "default_endpoint")]
    endpoint: String,

    /// Sampling temperature
    #[serde(default)]
    temperature: Option<f32>,

    /// Maximum output tokens per call
    #[serde(default)]
    max_output_tokens: Option<u32>,
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    /// Root directory of the file-backed store; in-memory when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Counselor chat settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct ChatConfig {
    /// Reply shown to the student when the model call fails
    #[serde(default = "default_fallback_message")]
    fallback_message: String,

    /// Number of past messages included in each prompt
    #[serde(default = "default_history_limit")]
    history_limit: usize,

    /// Maximum model/tool round trips per flow
    #[serde(default = "default_max_tool_rounds")]
    max_tool_rounds: usize,
}

fn default_fallback_message() -> String {
    "Sorry, I encountered an error.".to_string()
}

fn default_history_limit() -> usize {
    20
}

fn default_max_tool_rounds() -> usize {
    4
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_message: default_fallback_message(),
            history_limit: default_history_limit(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

/// A prompt template.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateConfig {
    /// Template text with `{{placeholder}}` markers
    pub text: String,
}

/// Top-level configuration.
///
/// # Example
///
/// ```no_run
/// use lakshya_rate_limit::LakshyaConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = LakshyaConfig::load()?;
/// println!("max attempts: {}", config.retry.max_attempts());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LakshyaConfig {
    /// Retry policy for every model call
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Model backend settings
    pub model: ModelConfig,

    /// Document store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Counselor chat settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Prompt templates keyed by template id
    #[serde(default)]
    pub templates: HashMap<String, TemplateConfig>,
}

impl LakshyaConfig {
    /// Load configuration with precedence: env > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails
    /// validation.
    #[instrument]
    pub fn load() -> LakshyaResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/lakshya/lakshya.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("lakshya").required(false))
            .add_source(
                Environment::with_prefix("LAKSHYA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    /// Load bundled defaults overlaid with one specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LakshyaResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));

        Self::finish(builder)
    }

    /// Bundled defaults overlaid with TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed.
    pub fn from_toml_str(overrides: &str) -> LakshyaResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml));

        Self::finish(builder)
    }

    /// Text of a template, if configured.
    pub fn template(&self, id: &str) -> Option<&str> {
        self.templates.get(id).map(|t| t.text.as_str())
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> LakshyaResult<()> {
        self.retry
            .validate()
            .map_err(|reason| ConfigError::new(format!("[retry] {}", reason)))?;
        if self.model.name.trim().is_empty() {
            Err(ConfigError::new("[model] name must not be empty"))?;
        }
        if self.chat.history_limit == 0 {
            Err(ConfigError::new("[chat] history_limit must be at least 1"))?;
        }
        Ok(())
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> LakshyaResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
