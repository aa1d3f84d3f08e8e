//! Configuration management for the job fit assistant

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_CV_FILE_NAME: &str = "Proposed_CV.doc";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Let the model use web search when it cannot read the job URL directly
    pub enable_search: bool,
    /// No timeout is applied when unset
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reject structurally invalid analysis results instead of accepting any parseable JSON
    pub strict_validation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            enable_search: true,
            request_timeout_secs: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_CV_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| AssistantError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AssistantError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("job-fit-assistant")
            .join("config.toml")
    }

    /// Resolve the API key from the configured variable, then `API_KEY`
    pub fn resolve_api_key(&self) -> Result<String> {
        [self.api.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::Configuration(format!(
                    "API key not found; set {} (or {})",
                    self.api.api_key_env, FALLBACK_API_KEY_ENV
                ))
            })
    }

    /// Update a single dotted key such as `api.model`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.model" => self.api.model = value.to_string(),
            "api.api_key_env" => self.api.api_key_env = value.to_string(),
            "api.enable_search" => self.api.enable_search = parse_bool(key, value)?,
            "api.request_timeout_secs" => {
                self.api.request_timeout_secs = match value {
                    "" | "none" => None,
                    secs => Some(secs.parse().map_err(|_| {
                        AssistantError::Configuration(format!("{} expects a number of seconds", key))
                    })?),
                }
            }
            "analysis.strict_validation" => self.analysis.strict_validation = parse_bool(key, value)?,
            "output.format" => {
                self.output.format = crate::cli::parse_output_format(value)
                    .map_err(AssistantError::Configuration)?
            }
            "output.detailed" => self.output.detailed = parse_bool(key, value)?,
            "output.color_output" => self.output.color_output = parse_bool(key, value)?,
            "export.file_name" => self.export.file_name = value.to_string(),
            _ => {
                return Err(AssistantError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(AssistantError::Configuration(format!(
            "{} expects true or false, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.model, "gemini-2.5-flash");
        assert!(config.api.enable_search);
        assert!(config.api.request_timeout_secs.is_none());
        assert!(!config.analysis.strict_validation);
        assert_eq!(config.export.file_name, "Proposed_CV.doc");
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\nstrict_validation = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.analysis.strict_validation);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_set_value_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set_value("api.model", "gemini-2.5-pro").unwrap();
        config.set_value("api.enable_search", "off").unwrap();
        config.set_value("output.format", "json").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.api.model, "gemini-2.5-pro");
        assert!(!reloaded.api.enable_search);
        assert_eq!(reloaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_set_value_rejects_unknown_key_and_bad_bool() {
        let mut config = Config::default();
        assert!(config.set_value("models.default", "x").is_err());
        assert!(config.set_value("analysis.strict_validation", "maybe").is_err());
    }
}
