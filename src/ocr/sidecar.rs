//! HTTP sidecar OCR engine.

use serde::Deserialize;
use tracing::info;

use super::{OcrEngine, OcrInput, OcrOutput};

/// Sidecar response (private deserialization type).
#[derive(Debug, Deserialize)]
struct SidecarResponse {
    text: String,
    #[serde(default)]
    confidence: f64,
}

pub struct SidecarEngine {
    url: String,
    client: reqwest::Client,
}

impl SidecarEngine {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/recognize", self.url)
    }
}

#[async_trait::async_trait]
impl OcrEngine for SidecarEngine {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn recognize(&self, input: &OcrInput<'_>) -> anyhow::Result<OcrOutput> {
        use reqwest::multipart::{Form, Part};

        info!(
            "SidecarEngine: uploading {} ({} bytes) to {}",
            input.image.filename,
            input.image.len(),
            self.url
        );

        let part = Part::bytes(input.image.bytes.clone())
            .file_name(input.image.filename.clone())
            .mime_str(&input.image.mime)?;

        let form = Form::new()
            .part("file", part)
            .text("language", input.language.to_string());

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OCR sidecar error ({}): {}", status, error_text);
        }

        let result: SidecarResponse = response.json().await?;

        Ok(OcrOutput {
            text: result.text,
            confidence: result.confidence,
        })
    }
}
