//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use docket_extractor::PipelineConfig;
use docket_llm::{ollama, openai};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, stored as `~/.docket/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Which completion service to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI or any compatible chat completions API
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider kind
    #[serde(default)]
    pub kind: ProviderKind,

    /// API base URL; the provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model name; the provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            endpoint: None,
            model: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl ProviderSettings {
    /// Configured model, or the provider's default.
    pub fn model_or_default(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(model), _) => model.as_str(),
            (None, ProviderKind::OpenAi) => openai::DEFAULT_MODEL,
            (None, ProviderKind::Ollama) => ollama::DEFAULT_MODEL,
        }
    }

    /// Configured endpoint, or the provider's default.
    pub fn endpoint_or_default(&self) -> &str {
        match (&self.endpoint, self.kind) {
            (Some(endpoint), _) => endpoint.as_str(),
            (None, ProviderKind::OpenAi) => openai::DEFAULT_ENDPOINT,
            (None, ProviderKind::Ollama) => ollama::DEFAULT_ENDPOINT,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".docket").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default file is read
    /// when present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.pipeline.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

fn default_api_key_env() -> String {
    openai::API_KEY_ENV.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.provider.model_or_default(), "gpt-4o-mini");
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.provider.kind = ProviderKind::Ollama;
        config.provider.model = Some("mistral".to_string());
        config.pipeline.max_concurrency = 2;
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider.endpoint_or_default(), "http://localhost:11434");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provider]\nkind = \"ollama\"\n\n[pipeline]\nreduce_batch_size = 4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.provider.model_or_default(), "llama3.1");
        assert_eq!(config.pipeline.reduce_batch_size, 4);
        assert_eq!(config.pipeline.chunk_size, 30_000);
    }

    #[test]
    fn test_invalid_pipeline_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[pipeline]\nchunk_size = 100\nchunk_overlap = 100\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
