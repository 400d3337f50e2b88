pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

use commands::Initializer;
use error::BridgeError;
use models::config::BridgeConfig;
use services::bridge::MessageBridge;
use services::config::ConfigManager;
use services::context::BridgeContext;
use services::image_loader::ImageLoader;
use services::ocr::HttpEngineLoader;
use services::transport::{spawn_line_reader, write_envelopes, Outbox};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Run the bridge over `reader`/`writer` until the reader hits EOF and every
/// pending envelope has been written.
pub async fn serve<R, W>(
    ctx: Arc<BridgeContext>,
    initializer: Initializer,
    reader: R,
    writer: W,
) -> Result<(), BridgeError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (outbox, outbound) = Outbox::channel();
    let (inbound, reader_task) = spawn_line_reader(reader);

    // Listener first, then initialization, so an early INIT can't race ahead
    let mut bridge = MessageBridge::new(ctx, outbox);
    bridge.start(initializer);

    // The bridge owns the last Outbox; the writer finishes once it is dropped
    let (_, written) = tokio::join!(bridge.run(inbound), write_envelopes(writer, outbound));

    match reader_task.await {
        Ok(Err(e)) => tracing::warn!(error = %e, "inbound reader stopped"),
        Err(e) => tracing::warn!(error = %e, "inbound reader task failed"),
        Ok(Ok(())) => {}
    }
    written
}

/// Bridge wired to the configured HTTP engine and the default image loader
pub async fn serve_stdio(config: BridgeConfig) -> Result<(), BridgeError> {
    let decoder = ImageLoader::new(config.image.clone())?;
    let ctx = Arc::new(BridgeContext::new(Arc::new(decoder)));
    let initializer = Initializer::new(Box::new(HttpEngineLoader::new(config.engine.clone())));

    serve(ctx, initializer, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Load config, install logging, and serve stdio on a single-threaded runtime
pub fn run() -> Result<(), BridgeError> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    utils::init_logging(&config.logging);
    tracing::info!(
        config = %manager.config_file_path().display(),
        found = manager.config_exists(),
        engine = %config.engine.base_url,
        "starting ocr bridge"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BridgeError::Config(format!("Failed to build runtime: {}", e)))?;

    runtime.block_on(serve_stdio(config))
}
