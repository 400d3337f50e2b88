use crate::error::BridgeError;
use crate::models::message::OutboundEnvelope;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half of the outbound channel. Cheap to clone; every task that
/// answers the parent holds one.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<OutboundEnvelope>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget send to the parent
    pub fn post(&self, envelope: OutboundEnvelope) {
        let action = envelope.action();
        if self.tx.send(envelope).is_err() {
            tracing::warn!(action, "outbound channel closed, dropping envelope");
        }
    }
}

/// Forward each inbound line from `reader` into a channel until EOF.
///
/// Lines that are not valid UTF-8 are logged and skipped; only a failed
/// read ends the task with an error.
pub fn spawn_line_reader<R>(reader: R) -> (mpsc::Receiver<String>, JoinHandle<Result<(), BridgeError>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(64);
    let handle = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| BridgeError::Transport(format!("Failed to read inbound line: {}", e)))?;
            if read == 0 {
                break;
            }

            let line = match String::from_utf8(trim_line_ending(&buf).to_vec()) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(bytes = buf.len(), error = %e, "ignoring inbound line that is not UTF-8");
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(line).await.is_err() {
                break;
            }
        }
        tracing::debug!("inbound channel reached EOF");
        Ok::<(), BridgeError>(())
    });
    (rx, handle)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Serialize each envelope as one JSON line on `writer` until every
/// [`Outbox`] is dropped.
pub async fn write_envelopes<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<OutboundEnvelope>,
) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = rx.recv().await {
        let mut line = serde_json::to_vec(&envelope)
            .map_err(|e| BridgeError::Transport(format!("Failed to serialize envelope: {}", e)))?;
        line.push(b'\n');

        writer
            .write_all(&line)
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to write envelope: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to flush envelope: {}", e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::{RecognizeCommand, RecognizeResult};

    #[tokio::test]
    async fn test_reader_skips_blank_lines() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"action\":\"a\"}\n\n")
            .read(b"  \n{\"action\":\"b\"}\n")
            .build();

        let (mut rx, handle) = spawn_line_reader(reader);
        assert_eq!(rx.recv().await.as_deref(), Some("{\"action\":\"a\"}"));
        assert_eq!(rx.recv().await.as_deref(), Some("{\"action\":\"b\"}"));
        assert_eq!(rx.recv().await, None);
        tokio_test::assert_ok!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_reader_survives_invalid_utf8_line() {
        let reader = tokio_test::io::Builder::new()
            .read(b"\xff\xfe\n")
            .read(b"{\"action\":\"a\"}\n")
            .build();

        let (mut rx, handle) = spawn_line_reader(reader);
        assert_eq!(rx.recv().await.as_deref(), Some("{\"action\":\"a\"}"));
        assert_eq!(rx.recv().await, None);
        tokio_test::assert_ok!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_reader_strips_crlf_and_keeps_unterminated_tail() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"action\":\"a\"}\r\n")
            .read(b"{\"action\":\"b\"}")
            .build();

        let (mut rx, handle) = spawn_line_reader(reader);
        assert_eq!(rx.recv().await.as_deref(), Some("{\"action\":\"a\"}"));
        assert_eq!(rx.recv().await.as_deref(), Some("{\"action\":\"b\"}"));
        assert_eq!(rx.recv().await, None);
        tokio_test::assert_ok!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_reader_reports_io_errors() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"action\":\"a\"}\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            .build();

        let (mut rx, handle) = spawn_line_reader(reader);
        assert_eq!(rx.recv().await.as_deref(), Some("{\"action\":\"a\"}"));
        assert_eq!(rx.recv().await, None);
        let err = tokio_test::assert_err!(handle.await.unwrap());
        assert!(matches!(err, BridgeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_writer_emits_json_lines() {
        let writer = tokio_test::io::Builder::new()
            .write(b"{\"action\":\"pos:ocr:init\",\"result\":true}\n")
            .write(b"{\"action\":\"pos:ocr:image_result\",\"result\":{\"error\":\"Image not loaded!\"},\"imageData\":\"xyz\"}\n")
            .build();

        let (outbox, rx) = Outbox::channel();
        outbox.post(OutboundEnvelope::init_ok());
        outbox.post(OutboundEnvelope::image_result(
            RecognizeCommand {
                image_data: "xyz".to_string(),
                request_id: None,
            },
            RecognizeResult::Error {
                error: "Image not loaded!".to_string(),
            },
        ));
        drop(outbox);

        tokio_test::assert_ok!(write_envelopes(writer, rx).await);
    }

    #[tokio::test]
    async fn test_post_after_receiver_dropped_does_not_panic() {
        let (outbox, rx) = Outbox::channel();
        drop(rx);
        outbox.post(OutboundEnvelope::init_ok());
    }
}
