use serde::{Deserialize, Serialize};

/// Recognition engine (OCR HTTP server) settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Boxes scored below this are dropped from the result
    pub min_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:39835".to_string(),
            timeout_secs: 5,
            min_score: 0.0,
        }
    }
}

/// Image decoding limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Whether `http(s)://` image locators may be fetched
    pub allow_remote: bool,
    pub max_bytes: usize,
    pub fetch_timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            allow_remote: true,
            max_bytes: 20 * 1024 * 1024,
            fetch_timeout_secs: 10,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub engine: EngineConfig,
    pub image: ImageConfig,
    pub logging: LoggingConfig,
}
