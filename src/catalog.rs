//! Curated ingredient catalog with risk classifications.
//!
//! The catalog is an immutable value built once at startup and shared via
//! `Arc`. Entries are kept in a fixed order (harmful first, then safe) and
//! every lookup walks them in that order, so the first entry to satisfy a
//! tier wins.

use serde::{Deserialize, Serialize};

/// Coarse health-concern severity of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
    Safe,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [Self::High, Self::Moderate, Self::Low, Self::Safe];

    /// Weight used by the safety score. `High` is the worst case.
    pub fn weight(self) -> u32 {
        match self {
            Self::High => 3,
            Self::Moderate => 2,
            Self::Low => 1,
            Self::Safe => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::Safe => "safe",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Moderate => "Moderate Risk",
            Self::Low => "Low Risk",
            Self::Safe => "Safe",
        }
    }

    /// Parse a query-parameter string into a risk level.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "moderate" => Some(Self::Moderate),
            "low" => Some(Self::Low),
            "safe" => Some(Self::Safe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConcern {
    pub name: String,
    pub description: String,
}

/// A catalog entry. Identity is the canonical `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Canonical name, always lowercase.
    pub name: String,
    pub alternative_names: Vec<String>,
    pub risk_level: RiskLevel,
    pub description: String,
    pub health_concerns: Vec<HealthConcern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ingredient {
    /// True when `normalized` equals one of the alternative names, ignoring case.
    pub fn has_alternative(&self, normalized: &str) -> bool {
        self.alternative_names
            .iter()
            .any(|alt| alt.to_lowercase() == normalized)
    }
}

/// Which lookup tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Token equals the canonical name or an alternative name.
    Exact,
    /// Token contains a catalog term.
    TokenContainsTerm,
    /// A catalog term contains the token.
    TermContainsToken,
}

/// Immutable ingredient table.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<Ingredient>,
    harmful_len: usize,
}

impl Catalog {
    /// Build a catalog from harmful and safe entries, preserving order.
    pub fn new(harmful: Vec<Ingredient>, safe: Vec<Ingredient>) -> Self {
        let harmful_len = harmful.len();
        let mut entries = harmful;
        entries.extend(safe);
        Self {
            entries,
            harmful_len,
        }
    }

    /// The built-in table of known ingredients.
    pub fn builtin() -> Self {
        Self::new(builtin_harmful(), builtin_safe())
    }

    /// All entries, harmful first.
    pub fn entries(&self) -> &[Ingredient] {
        &self.entries
    }

    pub fn harmful(&self) -> &[Ingredient] {
        &self.entries[..self.harmful_len]
    }

    pub fn safe(&self) -> &[Ingredient] {
        &self.entries[self.harmful_len..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a free-text token to a catalog entry.
    pub fn find(&self, token: &str) -> Option<&Ingredient> {
        self.find_with_tier(token).map(|(ingredient, _)| ingredient)
    }

    /// Resolve a token, also reporting which tier matched.
    ///
    /// Tiers are tried in order and the first hit wins:
    /// exact name/alternative, token contains a term, term contains the token.
    /// Substring tiers compare alternative names as stored, so uppercase
    /// acronyms (`MIT`, `DBP`) only ever match a whole token.
    pub fn find_with_tier(&self, token: &str) -> Option<(&Ingredient, MatchTier)> {
        let clean = token.trim().to_lowercase();
        if clean.is_empty() {
            return None;
        }

        if let Some(found) = self
            .entries
            .iter()
            .find(|ing| ing.name == clean || ing.has_alternative(&clean))
        {
            return Some((found, MatchTier::Exact));
        }

        if let Some(found) = self.entries.iter().find(|ing| {
            clean.contains(ing.name.as_str())
                || ing
                    .alternative_names
                    .iter()
                    .any(|alt| clean.contains(alt.as_str()))
        }) {
            return Some((found, MatchTier::TokenContainsTerm));
        }

        self.entries
            .iter()
            .find(|ing| {
                ing.name.contains(clean.as_str())
                    || ing
                        .alternative_names
                        .iter()
                        .any(|alt| alt.contains(clean.as_str()))
            })
            .map(|found| (found, MatchTier::TermContainsToken))
    }

    /// Harmful entries, optionally restricted to one risk level.
    pub fn harmful_by_risk(&self, risk: Option<RiskLevel>) -> Vec<&Ingredient> {
        self.harmful()
            .iter()
            .filter(|ing| risk.map_or(true, |r| ing.risk_level == r))
            .collect()
    }

    /// Exact, case-insensitive lookup by name or alternative name among harmful entries.
    pub fn lookup_harmful(&self, name: &str) -> Option<&Ingredient> {
        let wanted = name.to_lowercase();
        self.harmful()
            .iter()
            .find(|ing| ing.name == wanted || ing.has_alternative(&wanted))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Built-in data
// ============================================================================

fn entry(
    name: &str,
    alternative_names: &[&str],
    risk_level: RiskLevel,
    description: &str,
    health_concerns: &[(&str, &str)],
    category: &str,
) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        alternative_names: alternative_names.iter().map(|s| s.to_string()).collect(),
        risk_level,
        description: description.to_string(),
        health_concerns: health_concerns
            .iter()
            .map(|(name, description)| HealthConcern {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect(),
        category: Some(category.to_string()),
    }
}

fn builtin_harmful() -> Vec<Ingredient> {
    vec![
        entry(
            "methylisothiazolinone",
            &["MIT", "MI", "2-methyl-4-isothiazolin-3-one"],
            RiskLevel::High,
            "A synthetic preservative that can cause allergic reactions and skin irritation. May be neurotoxic at certain concentrations.",
            &[
                ("Allergic Reactions", "Can cause skin rashes and allergic contact dermatitis"),
                ("Skin Irritation", "May cause redness, itching, and inflammation"),
                ("Potential Neurotoxicity", "Studies suggest possible neurotoxic effects at high concentrations"),
            ],
            "Preservative",
        ),
        entry(
            "sodium laureth sulfate",
            &["SLES", "sodium lauryl ether sulfate"],
            RiskLevel::High,
            "A surfactant and detergent that can cause skin irritation and is often contaminated with ethylene oxide and 1,4-dioxane, which are carcinogens.",
            &[
                ("Skin Irritation", "Can cause dryness and irritation, especially with prolonged exposure"),
                ("Contamination Risks", "Often contaminated with ethylene oxide and 1,4-dioxane (carcinogens)"),
                ("Environmental Toxicity", "Harmful to aquatic organisms and can cause long-term adverse effects"),
            ],
            "Surfactant",
        ),
        entry(
            "fragrance",
            &["parfum", "aroma", "essential oil blend"],
            RiskLevel::Moderate,
            "A blanket term that can include dozens or hundreds of chemicals, many of which can trigger allergies and asthma. Companies aren't required to disclose specific fragrance ingredients.",
            &[
                ("Allergic Reactions", "Common trigger for skin allergies and contact dermatitis"),
                ("Hormone Disruption", "Some fragrance compounds may disrupt hormonal balance"),
                ("Asthma Triggers", "Can exacerbate respiratory conditions like asthma"),
            ],
            "Fragrance",
        ),
        entry(
            "parabens",
            &["methylparaben", "propylparaben", "butylparaben", "ethylparaben"],
            RiskLevel::Moderate,
            "Preservatives that can mimic estrogen and may disrupt hormone function.",
            &[
                ("Endocrine Disruption", "May interfere with normal hormone function"),
                ("Potential Cancer Link", "Some studies suggest a possible link to certain cancers"),
                ("Reproductive Concerns", "May affect reproductive system development"),
            ],
            "Preservative",
        ),
        entry(
            "formaldehyde",
            &[
                "formalin",
                "methanal",
                "quaternium-15",
                "DMDM hydantoin",
                "imidazolidinyl urea",
                "diazolidinyl urea",
            ],
            RiskLevel::High,
            "A known human carcinogen used as a preservative in many products.",
            &[
                ("Carcinogen", "Classified as a known human carcinogen"),
                ("Respiratory Issues", "Can irritate the respiratory system and trigger asthma"),
                ("Skin Irritation", "May cause contact dermatitis and skin sensitivity"),
            ],
            "Preservative",
        ),
        entry(
            "phthalates",
            &["DBP", "DEHP", "DEP", "dibutyl phthalate", "diethyl phthalate"],
            RiskLevel::High,
            "Plasticizers that are endocrine disruptors and may affect reproductive development.",
            &[
                ("Endocrine Disruption", "Interferes with hormone production and function"),
                ("Reproductive Toxicity", "May cause reproductive and developmental issues"),
                ("Respiratory Issues", "Associated with increased risk of asthma and allergies"),
            ],
            "Plasticizer",
        ),
        entry(
            "triclosan",
            &["5-chloro-2-(2,4-dichlorophenoxy)phenol"],
            RiskLevel::High,
            "An antibacterial agent that may disrupt hormone function and contribute to antibiotic resistance.",
            &[
                ("Antibiotic Resistance", "May contribute to the development of antibiotic-resistant bacteria"),
                ("Endocrine Disruption", "Can interfere with thyroid hormone and other hormonal processes"),
                ("Environmental Concerns", "Toxic to aquatic organisms and persists in the environment"),
            ],
            "Antimicrobial",
        ),
    ]
}

fn builtin_safe() -> Vec<Ingredient> {
    vec![
        entry(
            "water",
            &["aqua", "eau"],
            RiskLevel::Safe,
            "The most common base for most products.",
            &[],
            "Base/Solvent",
        ),
        entry(
            "glycerin",
            &["glycerol", "glycerine"],
            RiskLevel::Safe,
            "A humectant that attracts and retains moisture.",
            &[],
            "Humectant",
        ),
        entry(
            "aloe vera",
            &["aloe barbadensis leaf juice", "aloe barbadensis"],
            RiskLevel::Safe,
            "Plant extract with soothing properties.",
            &[],
            "Plant Extract",
        ),
        entry(
            "sodium chloride",
            &["salt", "sea salt"],
            RiskLevel::Safe,
            "Thickening agent and preservative.",
            &[],
            "Thickening Agent",
        ),
        entry(
            "citric acid",
            &[],
            RiskLevel::Safe,
            "pH adjuster derived from citrus fruits.",
            &[],
            "pH Adjuster",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layout() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.harmful().len(), 7);
        assert_eq!(catalog.safe().len(), 5);
        assert_eq!(catalog.entries()[0].name, "methylisothiazolinone");
        assert_eq!(catalog.entries()[7].name, "water");
        assert!(catalog
            .entries()
            .iter()
            .all(|ing| ing.name == ing.name.to_lowercase()));
    }

    #[test]
    fn test_exact_canonical_match() {
        let catalog = Catalog::builtin();
        let (found, tier) = catalog.find_with_tier("  Fragrance ").unwrap();
        assert_eq!(found.name, "fragrance");
        assert_eq!(tier, MatchTier::Exact);
    }

    #[test]
    fn test_exact_alternative_match_ignores_case() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find("MIT").unwrap().name, "methylisothiazolinone");
        assert_eq!(catalog.find("parfum").unwrap().name, "fragrance");
        assert_eq!(catalog.find("DMDM Hydantoin").unwrap().name, "formaldehyde");
    }

    #[test]
    fn test_token_contains_term() {
        let catalog = Catalog::builtin();
        let (found, tier) = catalog.find_with_tier("purified water").unwrap();
        assert_eq!(found.name, "water");
        assert_eq!(tier, MatchTier::TokenContainsTerm);
    }

    #[test]
    fn test_term_contains_token() {
        let catalog = Catalog::builtin();
        let (found, tier) = catalog.find_with_tier("laureth").unwrap();
        assert_eq!(found.name, "sodium laureth sulfate");
        assert_eq!(tier, MatchTier::TermContainsToken);
    }

    #[test]
    fn test_first_entry_wins_within_tier() {
        let catalog = Catalog::builtin();
        // "sodium" is contained in both sodium laureth sulfate and sodium chloride.
        assert_eq!(catalog.find("sodium").unwrap().name, "sodium laureth sulfate");
    }

    #[test]
    fn test_acronyms_do_not_match_substrings() {
        let catalog = Catalog::builtin();
        assert!(catalog.find("vitamin e").is_none());
    }

    #[test]
    fn test_no_match() {
        let catalog = Catalog::builtin();
        assert!(catalog.find("tocopherol").is_none());
        assert!(catalog.find("   ").is_none());
    }

    #[test]
    fn test_harmful_by_risk() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.harmful_by_risk(None).len(), 7);
        let moderate = catalog.harmful_by_risk(Some(RiskLevel::Moderate));
        assert_eq!(moderate.len(), 2);
        assert!(moderate.iter().all(|ing| ing.risk_level == RiskLevel::Moderate));
        assert!(catalog.harmful_by_risk(Some(RiskLevel::Safe)).is_empty());
    }

    #[test]
    fn test_lookup_harmful() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup_harmful("Triclosan").unwrap().name, "triclosan");
        assert_eq!(catalog.lookup_harmful("sles").unwrap().name, "sodium laureth sulfate");
        assert!(catalog.lookup_harmful("water").is_none());
        assert!(catalog.lookup_harmful("tric").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_value(&catalog.entries()[0]).unwrap();
        assert_eq!(json["riskLevel"], "high");
        assert_eq!(json["alternativeNames"][0], "MIT");
        assert_eq!(json["healthConcerns"][0]["name"], "Allergic Reactions");
        assert_eq!(json["category"], "Preservative");
    }

    #[test]
    fn test_risk_level_from_str() {
        assert_eq!(RiskLevel::from_str("moderate"), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::from_str("HIGH"), None);
        assert_eq!(RiskLevel::from_str("unknown"), None);
    }
}
