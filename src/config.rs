//! Configuration management for the credit risk scorer

use crate::encoder::DEFAULT_ENCODER_FILE_PATTERN;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file, optional
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `CREDIT_RISK__MODELS__MODELS_DIR`
pub const ENV_PREFIX: &str = "CREDIT_RISK";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub models: ModelsConfig,
    pub charts: ChartsConfig,
    pub logging: LoggingConfig,
}

/// Serialized artifacts configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory containing the classifier and encoder artifacts
    pub models_dir: String,
    /// ONNX classifier file, relative to `models_dir`
    pub model_file: String,
    /// Optional JSON list of training column names, relative to `models_dir`
    pub feature_names_file: String,
    /// Feature importance list, relative to `models_dir`
    pub importance_file: String,
    /// Encoder file names relative to `models_dir`; `{field}` becomes the
    /// column name, e.g. `Saving accounts_encoder.json`
    pub encoder_file_pattern: String,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            models_dir: "models".to_string(),
            model_file: "credit_model.onnx".to_string(),
            feature_names_file: "feature_names.json".to_string(),
            importance_file: "feature_importance.json".to_string(),
            encoder_file_pattern: DEFAULT_ENCODER_FILE_PATTERN.to_string(),
            onnx_threads: 1,
        }
    }
}

/// Static chart images shown with the explanation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub feature_importance: String,
    pub risk_distribution: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            feature_importance: "images/feature_importance.png".to_string(),
            risk_distribution: "images/risk_distribution.png".to_string(),
        }
    }
}

impl ChartsConfig {
    /// Chart titles and paths in display order
    pub fn entries(&self) -> [(&'static str, &str); 2] {
        [
            ("Feature importance", self.feature_importance.as_str()),
            ("Risk distribution", self.risk_distribution.as_str()),
        ]
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file, if present, and the environment
    pub fn load() -> Result<Self> {
        Self::build(File::with_name(DEFAULT_CONFIG_PATH).required(false))
    }

    /// Load configuration from a specific path plus environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(File::from(path.as_ref()))
    }

    fn build(file: File<config::FileSourceFile, config::FileFormat>) -> Result<Self> {
        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}
