//! Resolves scanned tokens against the catalog.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Ingredient, MatchTier};

pub const CANONICAL_CONFIDENCE: f64 = 1.0;
pub const ALTERNATIVE_CONFIDENCE: f64 = 0.9;
pub const PARTIAL_CONFIDENCE: f64 = 0.7;

/// Outcome of matching one scanned token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Token as it appeared in the scanned text.
    pub ingredient: String,
    pub matched_ingredient: Option<Ingredient>,
    /// 0.0 exactly when `matched_ingredient` is `None`.
    pub confidence: f64,
}

impl AnalysisResult {
    pub fn is_match(&self) -> bool {
        self.matched_ingredient.is_some()
    }
}

/// Match every token, preserving order. One result per token.
pub fn analyze_ingredients<S: AsRef<str>>(catalog: &Catalog, tokens: &[S]) -> Vec<AnalysisResult> {
    tokens
        .iter()
        .map(|token| analyze_token(catalog, token.as_ref()))
        .collect()
}

fn analyze_token(catalog: &Catalog, token: &str) -> AnalysisResult {
    let clean = token.trim().to_lowercase();

    match catalog.find_with_tier(&clean) {
        Some((found, tier)) => {
            let confidence = match tier {
                MatchTier::Exact if found.name == clean => CANONICAL_CONFIDENCE,
                MatchTier::Exact => ALTERNATIVE_CONFIDENCE,
                MatchTier::TokenContainsTerm | MatchTier::TermContainsToken => PARTIAL_CONFIDENCE,
            };
            AnalysisResult {
                ingredient: token.to_string(),
                matched_ingredient: Some(found.clone()),
                confidence,
            }
        }
        None => AnalysisResult {
            ingredient: token.to_string(),
            matched_ingredient: None,
            confidence: 0.0,
        },
    }
}
