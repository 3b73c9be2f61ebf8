//! Modular OCR engine abstraction.
//!
//! Defines the [`OcrEngine`] trait and unified types so different text
//! recognition backends (local Tesseract binary, HTTP sidecar) can be swapped
//! through configuration.

pub mod sidecar;
pub mod tesseract;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::scan_image::ScanImage;

/// Default recognition language hint.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Unified OCR result returned by every engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub text: String,
    /// Engine-reported confidence, 0-100.
    pub confidence: f64,
}

/// Input to an OCR engine: the image plus a language hint.
pub struct OcrInput<'a> {
    pub image: &'a ScanImage,
    pub language: &'a str,
}

/// Async trait implemented by each OCR backend.
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn recognize(&self, input: &OcrInput<'_>) -> anyhow::Result<OcrOutput>;
}

/// Known engine identifiers used for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrEngineKind {
    Tesseract,
    Sidecar,
}

impl OcrEngineKind {
    /// Parse a configuration string into an engine kind.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tesseract" => Some(Self::Tesseract),
            "sidecar" => Some(Self::Sidecar),
            _ => None,
        }
    }
}

/// Build the configured engine.
pub fn build_engine(config: &AppConfig) -> Arc<dyn OcrEngine> {
    match config.ocr_engine {
        OcrEngineKind::Tesseract => Arc::new(tesseract::TesseractEngine::new(&config.tesseract_bin)),
        OcrEngineKind::Sidecar => Arc::new(sidecar::SidecarEngine::new(
            reqwest::Client::new(),
            &config.ocr_sidecar_url,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_from_str() {
        assert_eq!(OcrEngineKind::from_str("tesseract"), Some(OcrEngineKind::Tesseract));
        assert_eq!(OcrEngineKind::from_str("sidecar"), Some(OcrEngineKind::Sidecar));
        assert_eq!(OcrEngineKind::from_str("docling"), None);
    }
}
