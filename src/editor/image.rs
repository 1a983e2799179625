//! Pasted image ingestion
//!
//! Turns the first image payload of a paste event into an inline markdown
//! image whose source is a self-contained `data:` URI:
//! - size check against the configured ceiling
//! - base64 encoding off the event loop
//! - `![image-<millis>](data:<mime>;base64,...)` literal generation
//!
//! Placement is left to the caller, which inserts the literal at whatever
//! selection is current once encoding finishes.

use crate::config::ImageConfig;
use crate::error::{ImageError, ImageResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;

/// One binary item delivered by the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    /// Media type tag, e.g. `image/png`
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ClipboardPayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A paste event: zero or more typed payloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteEvent {
    pub payloads: Vec<ClipboardPayload>,
}

impl PasteEvent {
    pub fn new(payloads: Vec<ClipboardPayload>) -> Self {
        Self { payloads }
    }

    /// Whether the event carries an image the editor should take over
    pub fn has_image(&self) -> bool {
        self.payloads.iter().any(ClipboardPayload::is_image)
    }

    /// First image payload; any further images are ignored
    pub fn into_first_image(self) -> Option<ClipboardPayload> {
        self.payloads.into_iter().find(ClipboardPayload::is_image)
    }
}

/// Known image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Svg,
    Bmp,
    Avif,
}

impl ImageFormat {
    /// Canonical media type
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Avif => "image/avif",
        }
    }

    /// Detect format from a media type tag
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            "image/svg+xml" => Some(ImageFormat::Svg),
            "image/bmp" => Some(ImageFormat::Bmp),
            "image/avif" => Some(ImageFormat::Avif),
            _ => None,
        }
    }

    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        if data.len() >= 12 && &data[4..12] == b"ftypavif" {
            return Some(ImageFormat::Avif);
        }

        let start = std::str::from_utf8(&data[..data.len().min(256)]).ok()?;
        if start.contains("<svg") {
            return Some(ImageFormat::Svg);
        }

        None
    }
}

/// `type/subtype` part of a media type, lowercased, parameters dropped
fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn is_token(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}

/// Whether the essence is a `type/subtype` pair of header tokens
fn is_well_formed_mime(mime_type: &str) -> bool {
    let essence = mime_essence(mime_type);
    match essence.split_once('/') {
        Some((kind, subtype)) => is_token(kind) && is_token(subtype),
        None => false,
    }
}

/// Media type written into the data URI.
///
/// A recognised declared type is written in canonical form. An unrecognised
/// `image/*` subtype is replaced by the sniffed format when the bytes are
/// recognisable, and kept otherwise.
fn effective_mime(payload: &ClipboardPayload) -> String {
    if let Some(format) = ImageFormat::from_mime(&payload.mime_type) {
        return format.mime_type().to_string();
    }
    match ImageFormat::from_bytes(&payload.data) {
        Some(format) => format.mime_type().to_string(),
        None => mime_essence(&payload.mime_type),
    }
}

/// Validates, encodes and formats pasted images
#[derive(Debug, Clone, Default)]
pub struct ImageIngestor {
    config: ImageConfig,
}

impl ImageIngestor {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Reject payloads that are not images, carry a malformed media type
    /// or exceed the size ceiling
    pub fn validate(&self, payload: &ClipboardPayload) -> ImageResult<()> {
        if !payload.is_image() {
            return Err(ImageError::NotAnImage {
                mime_type: payload.mime_type.clone(),
            });
        }
        if !is_well_formed_mime(&payload.mime_type) {
            return Err(ImageError::MalformedMime {
                mime_type: payload.mime_type.clone(),
            });
        }
        if payload.data.len() > self.config.max_bytes {
            return Err(ImageError::TooLarge {
                size: payload.data.len(),
                max: self.config.max_bytes,
            });
        }
        Ok(())
    }

    /// Encode a payload into a `data:` URI on the blocking pool
    pub async fn encode(&self, payload: ClipboardPayload) -> ImageResult<String> {
        if payload.data.is_empty() {
            return Err(ImageError::Encoding("image data is empty".to_string()));
        }

        let mime = effective_mime(&payload);
        let encoded = tokio::task::spawn_blocking(move || BASE64.encode(&payload.data))
            .await
            .map_err(|e| ImageError::Encoding(e.to_string()))?;

        Ok(format!("data:{};base64,{}", mime, encoded))
    }

    /// Markdown image literal for an encoded URI
    pub fn markdown_literal(&self, data_uri: &str, timestamp_millis: i64) -> String {
        format!(
            "![{}-{}]({})",
            self.config.alt_prefix, timestamp_millis, data_uri
        )
    }

    /// Handle a paste event.
    ///
    /// Returns `Ok(None)` when the event carries no image. Otherwise the
    /// first image is validated and encoded, and the markdown literal to
    /// insert is returned.
    pub async fn prepare(&self, event: PasteEvent) -> ImageResult<Option<String>> {
        let Some(payload) = event.into_first_image() else {
            return Ok(None);
        };

        self.validate(&payload)?;
        log::debug!(
            "Encoding pasted {} image ({} bytes)",
            payload.mime_type,
            payload.data.len()
        );

        let uri = self.encode(payload).await?;
        Ok(Some(
            self.markdown_literal(&uri, Utc::now().timestamp_millis()),
        ))
    }
}
