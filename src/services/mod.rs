pub mod bridge;
pub mod config;
pub mod context;
pub mod image_loader;
pub mod ocr;
pub mod transport;
