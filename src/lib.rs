//! Ingredient Scanner - label OCR, ingredient risk matching and a read-only catalog API.
//!
//! The scan side (OCR, parsing, matching, scoring, session state) runs
//! locally; the HTTP side only serves the static catalog.

pub mod api;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod preview;
pub mod scan_image;
pub mod scorer;
pub mod session;

pub use catalog::{Catalog, Ingredient, RiskLevel};
pub use error::ScanError;
pub use matcher::{analyze_ingredients, AnalysisResult};
pub use scorer::{calculate_safety_score, counts_by_risk_level, RiskCounts};
pub use session::{ScanPhase, ScanSession, Scanner};
