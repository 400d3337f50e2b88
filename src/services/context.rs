use super::image_loader::ImageDecoder;
use super::ocr::EngineHandle;
use crate::error::BridgeError;
use std::sync::{Arc, OnceLock};

/// Engine readiness as seen by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Ready,
    Failed,
}

/// Outcome written once by the Initializer
#[derive(Debug)]
pub(crate) enum Readiness {
    Ready(EngineHandle),
    Failed(String),
}

/// State shared by every dispatch: a write-once readiness latch plus the
/// image decoder. Built at startup and handed to the bridge behind an `Arc`.
pub struct BridgeContext {
    readiness: OnceLock<Readiness>,
    decoder: Arc<dyn ImageDecoder>,
}

impl BridgeContext {
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            readiness: OnceLock::new(),
            decoder,
        }
    }

    pub fn state(&self) -> InitState {
        match self.readiness.get() {
            None => InitState::Uninitialized,
            Some(Readiness::Ready(_)) => InitState::Ready,
            Some(Readiness::Failed(_)) => InitState::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == InitState::Ready
    }

    /// Started engine, if initialization succeeded
    pub fn engine(&self) -> Option<&EngineHandle> {
        match self.readiness.get() {
            Some(Readiness::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Diagnostic captured when initialization failed
    pub(crate) fn failure(&self) -> Option<&str> {
        match self.readiness.get() {
            Some(Readiness::Failed(message)) => Some(message),
            _ => None,
        }
    }

    pub fn decoder(&self) -> &dyn ImageDecoder {
        self.decoder.as_ref()
    }

    /// Settle the latch. Fails if it was already settled.
    pub(crate) fn settle(&self, readiness: Readiness) -> Result<(), BridgeError> {
        self.readiness
            .set(readiness)
            .map_err(|_| BridgeError::Initialization("initialization already settled".to_string()))
    }
}
