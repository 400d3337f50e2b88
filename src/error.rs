use thiserror::Error;

/// Fallback text used when a fault carries no usable message.
pub const UNEXPECTED_ERROR: &str = "An unexpected error has occurred!";

/// Every failure the bridge can observe.
///
/// The `Display` output of the recognition-path variants is exactly what the
/// parent process receives in an `{error}` result, so keep those strings stable.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Engine failed to load or start. Terminal for the process.
    #[error("{0}")]
    Initialization(String),

    #[error("OCR is not initialized")]
    NotReady,

    /// The detail is for logs only; the parent always sees the fixed text.
    #[error("Image not loaded!")]
    ImageNotLoaded(String),

    #[error("{0}")]
    Recognition(String),

    #[error("An unexpected error has occurred!")]
    Unexpected,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    /// Message to put on the wire, falling back to the generic text when empty.
    pub fn outward_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNEXPECTED_ERROR.to_string()
        } else {
            message
        }
    }
}
