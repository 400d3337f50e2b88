use super::context::BridgeContext;
use super::transport::Outbox;
use crate::commands::init::Initializer;
use crate::commands::recognize::handle_recognize_command;
use crate::models::message::InboundMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Routes inbound messages against engine readiness and answers on the
/// outbound channel. Each accepted recognition runs as its own task, so
/// responses may go out in a different order than requests came in.
pub struct MessageBridge {
    ctx: Arc<BridgeContext>,
    outbox: Outbox,
    in_flight: JoinSet<()>,
    init_task: Option<JoinHandle<()>>,
}

impl MessageBridge {
    pub fn new(ctx: Arc<BridgeContext>, outbox: Outbox) -> Self {
        Self {
            ctx,
            outbox,
            in_flight: JoinSet::new(),
            init_task: None,
        }
    }

    #[cfg(test)]
    fn context(&self) -> &Arc<BridgeContext> {
        &self.ctx
    }

    /// Number of recognitions currently running
    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Kick off the Initializer in the background
    pub fn start(&mut self, initializer: Initializer) {
        if self.init_task.is_some() {
            warn!("bridge already started an initializer, ignoring");
            return;
        }
        let ctx = Arc::clone(&self.ctx);
        let outbox = self.outbox.clone();
        self.init_task = Some(tokio::spawn(async move {
            initializer.start(&ctx, &outbox).await;
        }));
    }

    /// Handle one raw inbound line
    pub fn receive(&mut self, line: &str) {
        let message = match InboundMessage::parse(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "ignoring inbound line");
                return;
            }
        };

        match message {
            InboundMessage::RecognizeImage(command) => {
                if !self.ctx.is_ready() {
                    debug!(
                        state = ?self.ctx.state(),
                        failure = self.ctx.failure().unwrap_or("-"),
                        "ocr not ready, dropping recognize command"
                    );
                    return;
                }
                info!(
                    image_bytes = command.image_data.len(),
                    request_id = command.request_id.as_deref().unwrap_or("-"),
                    "recognize"
                );

                let ctx = Arc::clone(&self.ctx);
                let outbox = self.outbox.clone();
                self.in_flight.spawn(async move {
                    let envelope = handle_recognize_command(ctx, command).await;
                    outbox.post(envelope);
                });
                debug!(in_flight = self.in_flight.len(), "recognition dispatched");
            }
            InboundMessage::Informational { action, payload } => {
                info!(%action, %payload, "received");
            }
            InboundMessage::Unknown { action } => {
                debug!(%action, "ignoring unrelated action");
            }
        }
    }

    /// Consume lines until the inbound channel closes, then wait for the
    /// Initializer and every in-flight recognition to answer.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<String>) {
        loop {
            tokio::select! {
                line = inbound.recv() => match line {
                    Some(line) => self.receive(&line),
                    None => break,
                },
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "recognition task failed");
                    }
                }
            }
        }

        self.drain().await;
    }

    /// Wait for pending work to emit its envelopes
    pub async fn drain(&mut self) {
        if let Some(task) = self.init_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "initializer task failed");
            }
        }
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "recognition task failed");
            }
        }
        debug!("bridge drained");
    }
}
