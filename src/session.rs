//! Scan session state machine.
//!
//! [`ScanSession`] holds the state and exposes pure transitions.
//! [`Scanner`] drives a session and owns the side effects: the OCR engine
//! and the preview handle for the current image.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::ScanError;
use crate::matcher::AnalysisResult;
use crate::ocr::OcrEngine;
use crate::parser::LabelParser;
use crate::pipeline::{self, ScanReport};
use crate::preview::{PreviewHandle, PreviewStore};
use crate::scan_image::ScanImage;
use crate::scorer::RiskCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    #[default]
    Upload,
    Processing,
    Results,
}

/// State of one scan interaction.
#[derive(Debug, Default)]
pub struct ScanSession {
    image: Option<ScanImage>,
    preview: Option<String>,
    ocr_text: Option<String>,
    confidence: Option<f64>,
    tokens: Vec<String>,
    results: Vec<AnalysisResult>,
    safety_score: Option<f64>,
    counts: Option<RiskCounts>,
    phase: ScanPhase,
    error: Option<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn image(&self) -> Option<&ScanImage> {
        self.image.as_ref()
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn clear_derived(&mut self) {
        self.ocr_text = None;
        self.confidence = None;
        self.tokens.clear();
        self.results.clear();
        self.safety_score = None;
        self.counts = None;
        self.error = None;
    }

    /// Replace the image, drop everything derived from the previous one and
    /// return to `upload`.
    pub fn set_image(&mut self, image: Option<ScanImage>, preview: Option<String>) {
        self.image = image;
        self.preview = preview;
        self.clear_derived();
        self.phase = ScanPhase::Upload;
    }

    /// Enter `processing`. Fails without an image, leaving the phase unchanged.
    pub fn begin_processing(&mut self) -> Result<&ScanImage, ScanError> {
        if self.image.is_none() {
            self.error = Some(ScanError::MissingInput.to_string());
            return Err(ScanError::MissingInput);
        }
        self.clear_derived();
        self.phase = ScanPhase::Processing;
        self.image.as_ref().ok_or(ScanError::MissingInput)
    }

    /// Record a finished pipeline run and enter `results`.
    pub fn complete(&mut self, report: ScanReport) {
        self.ocr_text = Some(report.ocr.text);
        self.confidence = Some(report.ocr.confidence);
        self.tokens = report.tokens;
        self.results = report.results;
        self.safety_score = Some(report.safety_score);
        self.counts = Some(report.counts);
        self.error = None;
        self.phase = ScanPhase::Results;
    }

    /// Record a failed run. The session leaves `processing` with no results.
    pub fn fail(&mut self, error: &ScanError) {
        self.clear_derived();
        self.error = Some(error.to_string());
        self.phase = ScanPhase::Upload;
    }

    /// Clear every field and return to `upload`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            phase: self.phase,
            image: self.image.as_ref().map(|img| ImageSummary {
                filename: img.filename.clone(),
                mime: img.mime.clone(),
                bytes: img.len(),
                content_hash: img.content_hash.clone(),
            }),
            preview: self.preview.clone(),
            ocr_text: self.ocr_text.clone(),
            confidence: self.confidence,
            extracted_ingredients: self.tokens.clone(),
            analysis_results: self.results.clone(),
            safety_score: self.safety_score,
            ingredient_counts: self.counts,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub filename: String,
    pub mime: String,
    pub bytes: usize,
    pub content_hash: String,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub phase: ScanPhase,
    pub image: Option<ImageSummary>,
    pub preview: Option<String>,
    pub ocr_text: Option<String>,
    pub confidence: Option<f64>,
    pub extracted_ingredients: Vec<String>,
    pub analysis_results: Vec<AnalysisResult>,
    pub safety_score: Option<f64>,
    pub ingredient_counts: Option<RiskCounts>,
    pub error: Option<String>,
}

/// Orchestrates a session: image → OCR → parse → match → score.
pub struct Scanner {
    engine: Arc<dyn OcrEngine>,
    catalog: Arc<Catalog>,
    parser: LabelParser,
    previews: PreviewStore,
    language: String,
    session: ScanSession,
    preview: Option<PreviewHandle>,
}

impl Scanner {
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        catalog: Arc<Catalog>,
        previews: PreviewStore,
        language: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            catalog,
            parser: LabelParser::new(),
            previews,
            language: language.into(),
            session: ScanSession::new(),
            preview: None,
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.session.snapshot()
    }

    /// Data URL for the current image preview, if any.
    pub fn preview_data_url(&self) -> Option<String> {
        self.preview.as_ref().and_then(PreviewHandle::data_url)
    }

    /// Set (or clear) the image. The previous preview is revoked.
    pub fn set_image(&mut self, image: Option<ScanImage>) {
        let handle = image.as_ref().map(|img| self.previews.create(img));
        let uri = handle.as_ref().map(|h| h.uri().to_string());
        // Replacing the handle drops, and so revokes, the superseded preview.
        self.preview = handle;
        if let Some(img) = &image {
            info!("Scan image set: {} ({} bytes, {})", img.filename, img.len(), img.mime);
        }
        self.session.set_image(image, uri);
    }

    /// Run the pipeline on the current image.
    ///
    /// Returns `MissingInput` when no image is set. Stage failures are
    /// recorded on the session and reported through the returned phase.
    pub async fn start_processing(&mut self) -> Result<ScanPhase, ScanError> {
        let image = self.session.begin_processing()?;

        let outcome = pipeline::run(
            self.engine.as_ref(),
            &self.parser,
            &self.catalog,
            image,
            &self.language,
        )
        .await;

        match outcome {
            Ok(report) => self.session.complete(report),
            Err(e) => {
                warn!("Scan failed: {} ({})", e, e.detail().unwrap_or("no detail"));
                self.session.fail(&e);
            }
        }
        Ok(self.session.phase())
    }

    /// Clear the session and release the preview.
    pub fn reset_scan(&mut self) {
        self.preview = None;
        self.session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrInput, OcrOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeEngine {
        text: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeEngine {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: text.to_string(),
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                text: String::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl OcrEngine for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        async fn recognize(&self, input: &OcrInput<'_>) -> anyhow::Result<OcrOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(input.language, "eng");
            if self.fail {
                anyhow::bail!("engine threw");
            }
            Ok(OcrOutput {
                text: self.text.clone(),
                confidence: 91.0,
            })
        }
    }

    const LABEL: &str = "Ingredients: Water, Fragrance, Methylisothiazolinone.";

    fn scanner(engine: Arc<FakeEngine>, previews: &PreviewStore) -> Scanner {
        Scanner::new(engine, Arc::new(Catalog::builtin()), previews.clone(), "eng")
    }

    fn image(name: &str) -> ScanImage {
        ScanImage::from_bytes(name, vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[tokio::test]
    async fn test_successful_scan() {
        let previews = PreviewStore::new();
        let mut scanner = scanner(FakeEngine::ok(LABEL), &previews);

        scanner.set_image(Some(image("label.jpg")));
        assert_eq!(scanner.session().phase(), ScanPhase::Upload);
        assert!(scanner.preview_data_url().unwrap().starts_with("data:image/jpeg;base64,"));

        let phase = scanner.start_processing().await.unwrap();
        assert_eq!(phase, ScanPhase::Results);

        let snap = scanner.snapshot();
        assert_eq!(snap.ocr_text.as_deref(), Some(LABEL));
        assert_eq!(snap.confidence, Some(91.0));
        assert_eq!(
            snap.extracted_ingredients,
            vec!["Water", "Fragrance", "Methylisothiazolinone"]
        );
        assert_eq!(snap.analysis_results.len(), 3);
        let score = snap.safety_score.unwrap();
        assert!(score > 0.0 && score < 10.0);
        assert_eq!(snap.ingredient_counts.unwrap().total(), 3);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_missing_image() {
        let previews = PreviewStore::new();
        let engine = FakeEngine::ok(LABEL);
        let mut scanner = scanner(engine.clone(), &previews);

        let err = scanner.start_processing().await.unwrap_err();
        assert!(matches!(err, ScanError::MissingInput));
        assert_eq!(scanner.session().phase(), ScanPhase::Upload);
        assert_eq!(scanner.session().error(), Some("No image selected"));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ocr_failure_leaves_no_results() {
        let previews = PreviewStore::new();
        let mut scanner = scanner(FakeEngine::failing(), &previews);

        scanner.set_image(Some(image("label.jpg")));
        let phase = scanner.start_processing().await.unwrap();

        assert_eq!(phase, ScanPhase::Upload);
        let snap = scanner.snapshot();
        assert!(snap.analysis_results.is_empty());
        assert!(snap.safety_score.is_none());
        assert!(snap.ingredient_counts.is_none());
        assert_eq!(snap.error.as_deref(), Some("Failed to extract text from image"));
        // The image is kept so the user can retry.
        assert!(snap.image.is_some());
    }

    #[tokio::test]
    async fn test_clearing_image_after_scan() {
        let previews = PreviewStore::new();
        let mut scanner = scanner(FakeEngine::ok(LABEL), &previews);

        scanner.set_image(Some(image("label.jpg")));
        scanner.start_processing().await.unwrap();
        scanner.set_image(None);

        let snap = scanner.snapshot();
        assert!(snap.image.is_none());
        assert!(snap.preview.is_none());
        assert!(snap.ocr_text.is_none());
        assert!(snap.confidence.is_none());
        assert!(snap.extracted_ingredients.is_empty());
        assert!(snap.analysis_results.is_empty());
        assert!(snap.error.is_none());
        assert_eq!(snap.phase, ScanPhase::Upload);
        assert!(previews.is_empty());

        let err = scanner.start_processing().await.unwrap_err();
        assert!(matches!(err, ScanError::MissingInput));
        assert_eq!(scanner.session().phase(), ScanPhase::Upload);
        assert_eq!(scanner.session().error(), Some("No image selected"));
    }

    #[tokio::test]
    async fn test_new_image_after_results_returns_to_upload() {
        let previews = PreviewStore::new();
        let mut scanner = scanner(FakeEngine::ok(LABEL), &previews);

        scanner.set_image(Some(image("first.jpg")));
        assert_eq!(scanner.start_processing().await.unwrap(), ScanPhase::Results);
        scanner.set_image(Some(image("second.jpg")));

        let snap = scanner.snapshot();
        assert_eq!(snap.phase, ScanPhase::Upload);
        assert!(snap.analysis_results.is_empty());
        assert!(snap.safety_score.is_none());
        assert_eq!(snap.image.unwrap().filename, "second.jpg");
    }

    #[tokio::test]
    async fn test_superseding_image_revokes_preview() {
        let previews = PreviewStore::new();
        let mut scanner = scanner(FakeEngine::ok(LABEL), &previews);

        scanner.set_image(Some(image("first.jpg")));
        let first = scanner.snapshot().preview.unwrap();
        scanner.set_image(Some(image("second.jpg")));
        let second = scanner.snapshot().preview.unwrap();

        assert_ne!(first, second);
        assert!(!previews.contains(&first));
        assert!(previews.contains(&second));
        assert_eq!(previews.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_from_results() {
        let previews = PreviewStore::new();
        let mut scanner = scanner(FakeEngine::ok(LABEL), &previews);

        scanner.set_image(Some(image("label.jpg")));
        scanner.start_processing().await.unwrap();
        scanner.reset_scan();

        assert_eq!(scanner.snapshot(), ScanSession::new().snapshot());
        assert!(previews.is_empty());
        assert!(scanner.preview_data_url().is_none());
    }

    #[test]
    fn test_session_transitions() {
        let mut session = ScanSession::new();
        assert!(session.begin_processing().is_err());
        assert_eq!(session.phase(), ScanPhase::Upload);

        session.set_image(Some(image("a.jpg")), None);
        assert!(session.error().is_none());
        session.begin_processing().unwrap();
        assert_eq!(session.phase(), ScanPhase::Processing);

        session.fail(&ScanError::OcrFailure {
            detail: "boom".to_string(),
        });
        assert_eq!(session.phase(), ScanPhase::Upload);
        assert!(session.results().is_empty());
        assert!(session.image().is_some());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let session = ScanSession::new();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["phase"], "upload");
        assert!(json["extractedIngredients"].as_array().unwrap().is_empty());
        assert!(json["safetyScore"].is_null());
    }
}
