use crate::error::BridgeError;
use crate::models::message::OutboundEnvelope;
use crate::services::context::{BridgeContext, Readiness};
use crate::services::ocr::{EngineHandle, EngineLoader, RecognitionEngine};
use crate::services::transport::Outbox;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Brings the recognition engine up exactly once and reports the outcome
/// to the parent with a single `pos:ocr:init` envelope.
pub struct Initializer {
    loader: Box<dyn EngineLoader>,
    started: AtomicBool,
}

impl Initializer {
    pub fn new(loader: Box<dyn EngineLoader>) -> Self {
        Self {
            loader,
            started: AtomicBool::new(false),
        }
    }

    /// Load and init the engine, settle the readiness latch, then emit INIT.
    ///
    /// Later calls are ignored and emit nothing.
    pub async fn start(&self, ctx: &BridgeContext, outbox: &Outbox) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("initializer already started, ignoring");
            return;
        }

        info!("initializing ocr...");
        match self.acquire().await {
            Ok(engine) => {
                if let Err(e) = ctx.settle(Readiness::Ready(EngineHandle::new(engine))) {
                    warn!(error = %e, "readiness latch rejected engine");
                    return;
                }
                outbox.post(OutboundEnvelope::init_ok());
                info!("ocr initialized!");
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "error initializing ocr");
                if let Err(e) = ctx.settle(Readiness::Failed(message.clone())) {
                    warn!(error = %e, "readiness latch rejected failure");
                    return;
                }
                outbox.post(OutboundEnvelope::init_failed(message));
            }
        }
    }

    async fn acquire(&self) -> Result<Arc<dyn RecognitionEngine>, BridgeError> {
        let engine = self.loader.load().await?;
        engine.init().await?;
        Ok(engine)
    }
}
