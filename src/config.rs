//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by
//! `main`). Everything has a default so a bare checkout runs.

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;

use crate::ocr::{OcrEngineKind, DEFAULT_LANGUAGE};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SIDECAR_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub ocr_engine: OcrEngineKind,
    pub tesseract_bin: String,
    pub ocr_sidecar_url: String,
    pub ocr_language: String,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bind = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid BIND_ADDR '{}': {}", bind, e))?;

        let engine = get("OCR_ENGINE", "tesseract");
        let ocr_engine = OcrEngineKind::from_str(&engine).ok_or_else(|| {
            anyhow::anyhow!("Unknown OCR_ENGINE '{}'. Available: tesseract, sidecar", engine)
        })?;

        let config = Self {
            bind_addr,
            ocr_engine,
            tesseract_bin: get("TESSERACT_BIN", "tesseract"),
            ocr_sidecar_url: get("OCR_SIDECAR_URL", DEFAULT_SIDECAR_URL),
            ocr_language: get("OCR_LANGUAGE", DEFAULT_LANGUAGE),
        };
        info!(
            "Config: bind={} ocr_engine={:?} language={}",
            config.bind_addr, config.ocr_engine, config.ocr_language
        );
        Ok(config)
    }
}
