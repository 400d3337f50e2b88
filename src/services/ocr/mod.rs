pub mod engine;
pub mod http_ocr;

// Re-export main types
pub use engine::{EngineHandle, EngineLoader, Recognition, RecognitionEngine};
pub use http_ocr::{HttpEngineLoader, HttpOcrEngine};
