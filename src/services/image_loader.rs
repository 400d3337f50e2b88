use crate::error::BridgeError;
use crate::models::config::ImageConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Turns an inbound `imageData` string into a decoded image
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, image_data: &str) -> Result<DynamicImage, BridgeError>;
}

/// Where the image bytes come from
#[derive(Debug, PartialEq)]
enum ImageSource<'a> {
    /// `data:<mime>;base64,<payload>`
    DataUrl { mime: Option<&'a str>, payload: &'a str },
    Remote(&'a str),
    Base64(&'a str),
}

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^data:(?P<mime>[^;,]*)(?P<params>(?:;[^;,]*)*),(?P<payload>.*)$")
            .expect("data URL pattern is valid")
    })
}

fn classify(image_data: &str) -> Result<ImageSource<'_>, BridgeError> {
    let trimmed = image_data.trim();

    if trimmed.starts_with("data:") {
        let caps = data_url_pattern()
            .captures(trimmed)
            .ok_or_else(|| BridgeError::ImageNotLoaded("malformed data URL".to_string()))?;

        let is_base64 = caps
            .name("params")
            .map(|p| p.as_str().split(';').any(|param| param.eq_ignore_ascii_case("base64")))
            .unwrap_or(false);
        if !is_base64 {
            return Err(BridgeError::ImageNotLoaded(
                "data URL is not base64-encoded".to_string(),
            ));
        }

        let mime = caps.name("mime").map(|m| m.as_str()).filter(|m| !m.is_empty());
        let payload = caps.name("payload").map(|p| p.as_str()).unwrap_or_default();
        return Ok(ImageSource::DataUrl { mime, payload });
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(ImageSource::Remote(trimmed));
    }

    Ok(ImageSource::Base64(trimmed))
}

/// Default decoder: data URLs, bare base64, and (optionally) remote URLs
pub struct ImageLoader {
    client: reqwest::Client,
    config: ImageConfig,
}

impl ImageLoader {
    pub fn new(config: ImageConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BridgeError> {
        if !self.config.allow_remote {
            return Err(BridgeError::ImageNotLoaded(
                "remote image URLs are disabled".to_string(),
            ));
        }

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::ImageNotLoaded(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BridgeError::ImageNotLoaded(format!(
                "image fetch returned {}",
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            self.check_size(usize::try_from(length).unwrap_or(usize::MAX))?;
        }

        // Content-Length may be absent or wrong; enforce the cap while streaming
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| BridgeError::ImageNotLoaded(format!("Failed to read response: {}", e)))?
        {
            self.check_size(body.len().saturating_add(chunk.len()))?;
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn check_size(&self, len: usize) -> Result<(), BridgeError> {
        if len > self.config.max_bytes {
            return Err(BridgeError::ImageNotLoaded(format!(
                "image is {} bytes, limit is {}",
                len, self.config.max_bytes
            )));
        }
        Ok(())
    }

    /// Decode base64 text, tolerating line breaks inside the payload. The
    /// decoded size is bounded before any bytes are allocated.
    fn decode_base64(&self, payload: &str) -> Result<Vec<u8>, BridgeError> {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        self.check_size(compact.len() / 4 * 3)?;
        general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| BridgeError::ImageNotLoaded(format!("Failed to decode base64: {}", e)))
    }

    async fn load_bytes(&self, image_data: &str) -> Result<Vec<u8>, BridgeError> {
        match classify(image_data)? {
            ImageSource::DataUrl { mime, payload } => {
                if let Some(mime) = mime {
                    if !mime.starts_with("image/") {
                        tracing::debug!(mime, "data URL does not declare an image type");
                    }
                }
                self.decode_base64(payload)
            }
            ImageSource::Remote(url) => self.fetch(url).await,
            ImageSource::Base64(payload) => self.decode_base64(payload),
        }
    }
}

#[async_trait]
impl ImageDecoder for ImageLoader {
    async fn decode(&self, image_data: &str) -> Result<DynamicImage, BridgeError> {
        let bytes = self.load_bytes(image_data).await?;
        self.check_size(bytes.len())?;

        // Pixel decoding is CPU-bound; keep it off the message loop
        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| BridgeError::ImageNotLoaded(format!("decode task failed: {}", e)))?
            .map_err(|e| BridgeError::ImageNotLoaded(format!("Failed to load image: {}", e)))
    }
}
