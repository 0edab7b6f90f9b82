use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::{defaults, endpoints, models, paths};
use crate::error::SwarmError;
use crate::llm::{LlmClient, OpenAIClient};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key_env: String,
    pub base_url: String,
    pub default_model: String,
    /// Cheaper model for agents that only triage or summarise.
    pub fast_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunSettings {
    pub max_turns: usize,
    pub stream: bool,
    pub debug: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key_env: defaults::API_KEY_ENV.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            default_model: models::DEFAULT_MODEL.to_string(),
            fast_model: models::FAST_MODEL.to_string(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_turns: defaults::MAX_TURNS,
            stream: false,
            debug: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load from the default location; a missing or unreadable file yields defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(SwarmError::from)
            .and_then(|content| {
                toml::from_str(&content).map_err(|e| SwarmError::Config(e.to_string()))
            }) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), SwarmError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SwarmError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SwarmError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn build_client(&self) -> Result<Arc<dyn LlmClient>, SwarmError> {
        let api_key = self
            .api_key()
            .ok_or_else(|| SwarmError::MissingApiKey(self.llm.api_key_env.clone()))?;
        Ok(Arc::new(
            OpenAIClient::new(api_key)
                .with_model(&self.llm.default_model)
                .with_base_url(&self.llm.base_url),
        ))
    }
}
