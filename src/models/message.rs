use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action tags shared with the parent process
pub mod actions {
    pub const INIT: &str = "pos:ocr:init";
    pub const RECOGNIZE_IMAGE: &str = "pos:ocr:recognize_image";
    pub const IMAGE_RESULT: &str = "pos:ocr:image_result";
}

/// Request to run OCR on one image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeCommand {
    pub image_data: String,
    /// Optional correlation id, echoed back untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// A parsed inbound line
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    RecognizeImage(RecognizeCommand),
    /// `pos:ocr:init` / `pos:ocr:image_result` echoed back at us; logged only
    Informational { action: String, payload: Value },
    Unknown { action: String },
}

impl InboundMessage {
    /// Parse one line of inbound JSON.
    ///
    /// Lines without a string `action` are rejected, as are recognize
    /// commands whose `imageData` is missing or not a string. Any other
    /// action is accepted and classified.
    pub fn parse(line: &str) -> Result<Self, BridgeError> {
        let payload: Value = serde_json::from_str(line)
            .map_err(|e| BridgeError::InvalidMessage(format!("not JSON: {}", e)))?;

        let action = payload
            .as_object()
            .ok_or_else(|| BridgeError::InvalidMessage("expected a JSON object".to_string()))?
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::InvalidMessage("missing string `action`".to_string()))?
            .to_string();

        Ok(match action.as_str() {
            actions::RECOGNIZE_IMAGE => {
                let command = serde_json::from_value::<RecognizeCommand>(payload)
                    .map_err(|e| BridgeError::InvalidMessage(format!("bad recognize command: {}", e)))?;
                Self::RecognizeImage(command)
            }
            actions::INIT | actions::IMAGE_RESULT => Self::Informational { action, payload },
            _ => Self::Unknown { action },
        })
    }
}

/// Outcome of one recognition, as the parent sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecognizeResult {
    Text { text: Vec<String> },
    Error { error: String },
}

impl RecognizeResult {
    pub fn text(text: Vec<String>) -> Self {
        Self::Text { text }
    }

    pub fn from_error(error: &BridgeError) -> Self {
        Self::Error {
            error: error.outward_message(),
        }
    }
}

/// Everything written to the parent, tagged by action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum OutboundEnvelope {
    #[serde(rename = "pos:ocr:init")]
    Init {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename = "pos:ocr:image_result", rename_all = "camelCase")]
    ImageResult {
        result: RecognizeResult,
        image_data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl OutboundEnvelope {
    pub fn init_ok() -> Self {
        Self::Init {
            result: true,
            message: None,
        }
    }

    pub fn init_failed(message: impl Into<String>) -> Self {
        Self::Init {
            result: false,
            message: Some(message.into()),
        }
    }

    pub fn image_result(command: RecognizeCommand, result: RecognizeResult) -> Self {
        Self::ImageResult {
            result,
            image_data: command.image_data,
            request_id: command.request_id,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Init { .. } => actions::INIT,
            Self::ImageResult { .. } => actions::IMAGE_RESULT,
        }
    }
}
