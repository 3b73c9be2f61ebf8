//! Label images handed to a scan session.

use std::path::Path;

use anyhow::{Context, Result};
use image::ImageFormat;
use sha2::{Digest, Sha256};

const FALLBACK_MIME: &str = "application/octet-stream";

/// An uploaded or captured label photo.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanImage {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`.
    pub content_hash: String,
}

impl ScanImage {
    /// Wrap raw bytes, sniffing the MIME type from the content.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = sniff_mime(&bytes).to_string();
        let content_hash = {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            format!("{:x}", hasher.finalize())
        };
        Self {
            filename: filename.into(),
            mime,
            bytes,
            content_hash,
        }
    }

    /// Read an image file from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::from_bytes(filename, bytes))
    }

    /// True when the content looks like a format we know how to name.
    pub fn is_recognized_format(&self) -> bool {
        self.mime != FALLBACK_MIME
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image bytes are noisy in logs and test failures.
impl std::fmt::Debug for ScanImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanImage")
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("content_hash", &self.content_hash)
            .finish()
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => FALLBACK_MIME,
    }
}
