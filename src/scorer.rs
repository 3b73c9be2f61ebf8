//! Aggregate safety scoring over analysis results.

use serde::{Deserialize, Serialize};

use crate::catalog::RiskLevel;
use crate::matcher::AnalysisResult;

/// Score reported when nothing matched the catalog.
pub const NEUTRAL_SCORE: f64 = 5.0;
pub const MAX_SCORE: f64 = 10.0;

/// Safety score in [0, 10], 10 being safest.
///
/// Normalized against the worst case where every matched ingredient is
/// high risk. Unmatched tokens do not contribute.
pub fn calculate_safety_score(results: &[AnalysisResult]) -> f64 {
    let (total_risk, matched) = results
        .iter()
        .filter_map(|r| r.matched_ingredient.as_ref())
        .fold((0u32, 0u32), |(total, count), ing| {
            (total + ing.risk_level.weight(), count + 1)
        });

    if matched == 0 {
        return NEUTRAL_SCORE;
    }

    let max_risk = matched * RiskLevel::High.weight();
    MAX_SCORE - (f64::from(total_risk) / f64::from(max_risk)) * MAX_SCORE
}

/// Matched-ingredient counts for every risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub safe: usize,
}

impl RiskCounts {
    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Low => self.low,
            RiskLevel::Safe => self.safe,
        }
    }

    fn bump(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Moderate => self.moderate += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::Safe => self.safe += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.moderate + self.low + self.safe
    }

    /// Ingredients of high or moderate concern.
    pub fn harmful(&self) -> usize {
        self.high + self.moderate
    }

    pub fn low_or_safe(&self) -> usize {
        self.low + self.safe
    }
}

/// Count matched results per risk level. Unmatched results are ignored.
pub fn counts_by_risk_level(results: &[AnalysisResult]) -> RiskCounts {
    let mut counts = RiskCounts::default();
    for ing in results.iter().filter_map(|r| r.matched_ingredient.as_ref()) {
        counts.bump(ing.risk_level);
    }
    counts
}

/// Display band for a safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyBand {
    Good,
    Fair,
    Poor,
}

impl SafetyBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::Good
        } else if score >= 6.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}
