//! In-process stand-ins for the engine, loader and decoder seams.

use crate::error::BridgeError;
use crate::services::image_loader::ImageDecoder;
use crate::services::ocr::{EngineLoader, Recognition, RecognitionEngine};
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;

#[derive(Clone)]
enum Outcome {
    Text(Vec<String>),
    Fail(String),
    Panic,
}

#[derive(Clone)]
pub struct FakeEngine {
    init_error: Option<String>,
    outcome: Outcome,
}

impl FakeEngine {
    pub fn returning(text: &[&str]) -> Self {
        Self {
            init_error: None,
            outcome: Outcome::Text(text.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            init_error: None,
            outcome: Outcome::Fail(message.to_string()),
        }
    }

    pub fn panicking() -> Self {
        Self {
            init_error: None,
            outcome: Outcome::Panic,
        }
    }

    pub fn with_init_error(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }
}

#[async_trait]
impl RecognitionEngine for FakeEngine {
    async fn init(&self) -> Result<(), BridgeError> {
        match &self.init_error {
            Some(message) => Err(BridgeError::Initialization(message.clone())),
            None => Ok(()),
        }
    }

    async fn recognize(&self, _image: &DynamicImage) -> Result<Recognition, BridgeError> {
        match &self.outcome {
            Outcome::Text(text) => Ok(Recognition { text: text.clone() }),
            Outcome::Fail(message) => Err(BridgeError::Recognition(message.clone())),
            Outcome::Panic => panic!("engine blew up"),
        }
    }
}

pub struct FakeLoader {
    engine: Result<FakeEngine, String>,
}

impl FakeLoader {
    pub fn engine(engine: FakeEngine) -> Self {
        Self { engine: Ok(engine) }
    }

    pub fn broken(message: &str) -> Self {
        Self {
            engine: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl EngineLoader for FakeLoader {
    async fn load(&self) -> Result<Arc<dyn RecognitionEngine>, BridgeError> {
        match &self.engine {
            Ok(engine) => Ok(Arc::new(engine.clone())),
            Err(message) => Err(BridgeError::Initialization(message.clone())),
        }
    }
}

pub struct FakeDecoder {
    loads: bool,
}

impl FakeDecoder {
    pub fn ok() -> Self {
        Self { loads: true }
    }

    pub fn failing() -> Self {
        Self { loads: false }
    }
}

#[async_trait]
impl ImageDecoder for FakeDecoder {
    async fn decode(&self, _image_data: &str) -> Result<DynamicImage, BridgeError> {
        if self.loads {
            Ok(DynamicImage::new_rgb8(1, 1))
        } else {
            Err(BridgeError::ImageNotLoaded("fake decoder refused".to_string()))
        }
    }
}
