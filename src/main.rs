fn main() {
    if let Err(e) = ocr_bridge_lib::run() {
        eprintln!("ocr-bridge: {}", e);
        std::process::exit(1);
    }
}
