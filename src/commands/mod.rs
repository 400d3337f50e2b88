pub mod init;
pub mod recognize;

pub use init::Initializer;
pub use recognize::{handle_recognize_command, process_ocr};
