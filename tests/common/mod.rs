#![allow(dead_code)]

use async_trait::async_trait;
use image::DynamicImage;
use ocr_bridge_lib::error::BridgeError;
use ocr_bridge_lib::services::image_loader::ImageDecoder;
use ocr_bridge_lib::services::ocr::{EngineLoader, Recognition, RecognitionEngine};
use std::sync::Arc;
use std::time::Duration;

/// Engine that echoes a fixed text, or reports the delay it was asked to wait
pub struct ScriptedEngine {
    pub init_error: Option<String>,
    pub text: Vec<String>,
}

impl ScriptedEngine {
    pub fn returning(text: &[&str]) -> Self {
        Self {
            init_error: None,
            text: text.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn rejecting_init(message: &str) -> Self {
        Self {
            init_error: Some(message.to_string()),
            text: Vec::new(),
        }
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedEngine {
    async fn init(&self) -> Result<(), BridgeError> {
        match &self.init_error {
            Some(message) => Err(BridgeError::Initialization(message.clone())),
            None => Ok(()),
        }
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<Recognition, BridgeError> {
        // Width doubles as a delay in milliseconds for ordering tests
        if image.width() > 1 {
            tokio::time::sleep(Duration::from_millis(image.width() as u64)).await;
            return Ok(Recognition {
                text: vec![format!("waited {}", image.width())],
            });
        }
        Ok(Recognition {
            text: self.text.clone(),
        })
    }
}

pub struct ScriptedLoader {
    engine: Arc<ScriptedEngine>,
}

impl ScriptedLoader {
    pub fn new(engine: ScriptedEngine) -> Box<Self> {
        Box::new(Self {
            engine: Arc::new(engine),
        })
    }
}

#[async_trait]
impl EngineLoader for ScriptedLoader {
    async fn load(&self) -> Result<Arc<dyn RecognitionEngine>, BridgeError> {
        Ok(self.engine.clone())
    }
}

/// Loads `data:image/png;base64,AAAA` and `delay:<ms>` locators, rejects the rest
pub struct ScriptedDecoder;

#[async_trait]
impl ImageDecoder for ScriptedDecoder {
    async fn decode(&self, image_data: &str) -> Result<DynamicImage, BridgeError> {
        if image_data == "data:image/png;base64,AAAA" {
            return Ok(DynamicImage::new_rgb8(1, 1));
        }
        if let Some(ms) = image_data.strip_prefix("delay:").and_then(|ms| ms.parse::<u32>().ok()) {
            return Ok(DynamicImage::new_rgb8(ms.max(2), 1));
        }
        Err(BridgeError::ImageNotLoaded(format!("cannot load {}", image_data)))
    }
}
