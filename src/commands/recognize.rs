use crate::error::BridgeError;
use crate::models::message::{OutboundEnvelope, RecognizeCommand, RecognizeResult};
use crate::services::context::BridgeContext;
use crate::services::ocr::{EngineHandle, Recognition};
use std::sync::Arc;
use tracing::warn;

/// Run one recognition and build its `pos:ocr:image_result` envelope.
///
/// Never fails: decode errors, engine errors and panics inside the
/// recognition task all come back as an `{error}` result.
pub async fn handle_recognize_command(ctx: Arc<BridgeContext>, command: RecognizeCommand) -> OutboundEnvelope {
    let image_data = command.image_data.clone();
    let task = tokio::spawn(async move { process_ocr(&ctx, &image_data).await });

    let result = match task.await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "recognition task aborted");
            RecognizeResult::from_error(&BridgeError::Unexpected)
        }
    };

    OutboundEnvelope::image_result(command, result)
}

/// Decode `image_data` and run it through the engine
pub async fn process_ocr(ctx: &BridgeContext, image_data: &str) -> RecognizeResult {
    let Some(engine) = ctx.engine() else {
        return RecognizeResult::from_error(&BridgeError::NotReady);
    };

    match decode_and_recognize(ctx, engine, image_data).await {
        Ok(recognition) => RecognizeResult::text(recognition.text),
        Err(e) => {
            match &e {
                BridgeError::ImageNotLoaded(detail) => warn!(%detail, "image not loaded"),
                other => warn!(error = %other, "recognition failed"),
            }
            RecognizeResult::from_error(&e)
        }
    }
}

async fn decode_and_recognize(
    ctx: &BridgeContext,
    engine: &EngineHandle,
    image_data: &str,
) -> Result<Recognition, BridgeError> {
    let image = ctx.decoder().decode(image_data).await?;
    engine.recognize(&image).await
}
