//! Global huddle configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HuddleError, HuddleResult};

const DEFAULT_PORT: u16 = 4280;
const DEFAULT_PROVIDER: &str = "google";

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// Global configuration at ~/.config/huddle/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HuddleConfig {
    /// Port the local server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Identity provider name, resolved to a `huddle-provider-{name}`
    /// binary on PATH.
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for HuddleConfig {
    fn default() -> Self {
        HuddleConfig {
            port: DEFAULT_PORT,
            provider: DEFAULT_PROVIDER.to_string(),
        }
    }
}

impl HuddleConfig {
    pub fn config_path() -> HuddleResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HuddleError::Config("Could not determine config directory".into()))?
            .join("huddle");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the configuration, creating a commented default file on first
    /// use.
    pub fn load() -> HuddleResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let config: HuddleConfig = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .build()
            .map_err(|e| HuddleError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HuddleError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Save the current config to ~/.config/huddle/config.toml
    pub fn save(&self) -> HuddleResult<()> {
        let config_path = Self::config_path()?;

        let content =
            toml::to_string_pretty(self).map_err(|e| HuddleError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| HuddleError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> HuddleResult<()> {
        let contents = format!(
            "\
# huddle configuration

# Port the local server listens on:
# port = {DEFAULT_PORT}

# Identity provider (resolves to huddle-provider-<name> on PATH):
# provider = \"{DEFAULT_PROVIDER}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HuddleError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| HuddleError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
