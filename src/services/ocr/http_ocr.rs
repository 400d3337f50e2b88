use super::engine::{EngineLoader, Recognition, RecognitionEngine};
use crate::error::BridgeError;
use crate::models::config::EngineConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Recognition engine backed by a local OCR HTTP server
#[derive(Clone)]
pub struct HttpOcrEngine {
    client: reqwest::Client,
    base_url: String,
    min_score: f64,
}

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

/// Single recognized text box; the server also sends corner points under
/// `box`, which the bridge has no use for
#[derive(Deserialize, Clone, Debug)]
struct TextBox {
    text: String,
    #[serde(default = "full_score")]
    score: f64,
}

fn full_score() -> f64 {
    1.0
}

#[derive(Deserialize)]
struct OcrResponse {
    boxes: Vec<TextBox>,
}

impl HttpOcrEngine {
    /// Create a new HTTP OCR engine
    pub fn new(config: &EngineConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Initialization(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            min_score: config.min_score,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Encode image to base64 PNG
    fn encode_image(image: &DynamicImage) -> Result<String, BridgeError> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
            .map_err(|e| BridgeError::Recognition(format!("Failed to encode image: {}", e)))?;
        Ok(general_purpose::STANDARD.encode(&buffer))
    }

    /// Keep box texts in server order, dropping low-confidence boxes
    fn collect_fragments(boxes: Vec<TextBox>, min_score: f64) -> Vec<String> {
        boxes
            .into_iter()
            .filter(|b| b.score >= min_score)
            .map(|b| b.text)
            .collect()
    }
}

#[async_trait]
impl RecognitionEngine for HttpOcrEngine {
    async fn init(&self) -> Result<(), BridgeError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BridgeError::Initialization(format!("Health check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BridgeError::Initialization(format!(
                "OCR server unhealthy: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<Recognition, BridgeError> {
        let image_base64 = Self::encode_image(image)?;
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { image_base64 })
            .send()
            .await
            .map_err(|e| BridgeError::Recognition(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BridgeError::Recognition(format!("OCR server error: {}", error_text)));
        }

        let data: OcrResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Recognition(format!("Failed to parse response: {}", e)))?;

        Ok(Recognition {
            text: Self::collect_fragments(data.boxes, self.min_score),
        })
    }
}

/// Builds the HTTP engine from config when the Initializer asks for it
pub struct HttpEngineLoader {
    config: EngineConfig,
}

impl HttpEngineLoader {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineLoader for HttpEngineLoader {
    async fn load(&self) -> Result<Arc<dyn RecognitionEngine>, BridgeError> {
        let engine = HttpOcrEngine::new(&self.config)?;
        tracing::debug!(base_url = %engine.base_url(), "loaded HTTP OCR engine");
        Ok(Arc::new(engine))
    }
}
