use crate::error::BridgeError;
use crate::models::config::BridgeConfig;
use std::fs;
use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "OCR_BRIDGE_CONFIG";

/// Locates and reads the bridge configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Resolve the config path from `OCR_BRIDGE_CONFIG`, falling back to the
    /// platform config directory (`<config_dir>/ocr-bridge/config.json`).
    pub fn new() -> Result<Self, BridgeError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(Self::with_path(path));
        }

        let config_path = dirs::config_dir()
            .ok_or_else(|| BridgeError::Config("Failed to determine config directory".to_string()))?
            .join("ocr-bridge")
            .join("config.json");

        Ok(Self { config_path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from disk
    ///
    /// If config file doesn't exist, returns default configuration
    pub fn load(&self) -> Result<BridgeConfig, BridgeError> {
        if !self.config_exists() {
            return Ok(BridgeConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| BridgeError::Config(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if config file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}
