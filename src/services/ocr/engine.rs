use crate::error::BridgeError;
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;

/// Text fragments recognized in one image, in engine order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recognition {
    pub text: Vec<String>,
}

/// Recognition engine - abstraction over OCR implementations
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Engine-level setup. Called once before any `recognize`.
    async fn init(&self) -> Result<(), BridgeError>;

    /// Recognize text fragments in a decoded image
    async fn recognize(&self, image: &DynamicImage) -> Result<Recognition, BridgeError>;
}

/// Lazily acquires an engine implementation at startup
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn RecognitionEngine>, BridgeError>;
}

/// Capability reference to a started engine
#[derive(Clone)]
pub struct EngineHandle(Arc<dyn RecognitionEngine>);

impl EngineHandle {
    pub(crate) fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self(engine)
    }

    pub async fn recognize(&self, image: &DynamicImage) -> Result<Recognition, BridgeError> {
        self.0.recognize(image).await
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EngineHandle")
    }
}
