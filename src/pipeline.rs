//! Linear scan pipeline: recognize → parse → match → score.
//!
//! Each stage consumes the typed output of the previous one, so stages can
//! only run in order. Only recognition touches the outside world.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{ScanError, Stage};
use crate::matcher::{analyze_ingredients, AnalysisResult};
use crate::ocr::{OcrEngine, OcrInput, OcrOutput};
use crate::parser::LabelParser;
use crate::scan_image::ScanImage;
use crate::scorer::{calculate_safety_score, counts_by_risk_level, RiskCounts};

/// Output of the parse stage.
#[derive(Debug, Clone)]
pub struct ParsedLabel {
    pub ocr: OcrOutput,
    pub tokens: Vec<String>,
}

/// Output of the match stage.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ocr: OcrOutput,
    pub tokens: Vec<String>,
    pub results: Vec<AnalysisResult>,
}

/// Final pipeline output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub ocr: OcrOutput,
    pub tokens: Vec<String>,
    pub results: Vec<AnalysisResult>,
    pub safety_score: f64,
    pub counts: RiskCounts,
}

/// Run OCR on the image. Engine errors become [`ScanError::OcrFailure`].
pub async fn recognize(
    engine: &dyn OcrEngine,
    image: &ScanImage,
    language: &str,
) -> Result<OcrOutput, ScanError> {
    debug!(stage = %Stage::Recognize, engine = engine.name(), "Starting stage");
    let input = OcrInput { image, language };
    let ocr = engine.recognize(&input).await.map_err(|e| {
        warn!("OCR engine '{}' failed: {:#}", engine.name(), e);
        ScanError::OcrFailure {
            detail: format!("{:#}", e),
        }
    })?;

    if !ocr.confidence.is_finite() {
        return Err(ScanError::Stage {
            stage: Stage::Recognize,
            message: format!("engine '{}' reported invalid confidence", engine.name()),
        });
    }
    Ok(ocr)
}

pub fn parse(parser: &LabelParser, ocr: OcrOutput) -> ParsedLabel {
    debug!(stage = %Stage::Parse, chars = ocr.text.len(), "Starting stage");
    let tokens = parser.parse_ingredients(&ocr.text);
    ParsedLabel { ocr, tokens }
}

pub fn analyze(catalog: &Catalog, parsed: ParsedLabel) -> Analysis {
    debug!(stage = %Stage::Match, tokens = parsed.tokens.len(), "Starting stage");
    let results = analyze_ingredients(catalog, &parsed.tokens);
    Analysis {
        ocr: parsed.ocr,
        tokens: parsed.tokens,
        results,
    }
}

pub fn score(analysis: Analysis) -> ScanReport {
    debug!(stage = %Stage::Score, results = analysis.results.len(), "Starting stage");
    let safety_score = calculate_safety_score(&analysis.results);
    let counts = counts_by_risk_level(&analysis.results);
    ScanReport {
        ocr: analysis.ocr,
        tokens: analysis.tokens,
        results: analysis.results,
        safety_score,
        counts,
    }
}

/// Run every stage in order.
pub async fn run(
    engine: &dyn OcrEngine,
    parser: &LabelParser,
    catalog: &Catalog,
    image: &ScanImage,
    language: &str,
) -> Result<ScanReport, ScanError> {
    let ocr = recognize(engine, image, language).await?;
    let report = score(analyze(catalog, parse(parser, ocr)));
    info!(
        "Scan of {} complete: {} tokens, {} matched, score {:.1}",
        image.filename,
        report.tokens.len(),
        report.counts.total(),
        report.safety_score
    );
    Ok(report)
}
