//! Ingredient list extraction from raw OCR text.
//!
//! Pure functions, no async. Looks for a labelled section ("Ingredients:",
//! "Contains:", "Composed of:") and splits it into candidate tokens.

use regex::Regex;
use tracing::{debug, warn};

/// Section headers tried in order. Each captures up to the next period or end of text.
const SECTION_PATTERNS: [&str; 3] = [
    r"(?i)ingredients:(.+?)(?:\.|$)",
    r"(?i)contains:(.+?)(?:\.|$)",
    r"(?i)composed of:(.+?)(?:\.|$)",
];

/// Removed from user-typed names: parenthesized notes, then footnote markers.
const CLEANUP_PATTERNS: [&str; 2] = [r"\([^)]*\)", r"[*†‡]"];

const TOKEN_DELIMITERS: [char; 4] = [',', '.', ';', '\n'];

/// Tokens at or above this many characters are treated as OCR noise.
pub const MAX_TOKEN_CHARS: usize = 50;

/// Pre-compiled section patterns ready for matching.
#[derive(Debug, Clone)]
pub struct LabelParser {
    sections: Vec<Regex>,
    cleanup: Vec<Regex>,
}

impl LabelParser {
    pub fn new() -> Self {
        Self {
            sections: compile_patterns(&SECTION_PATTERNS),
            cleanup: compile_patterns(&CLEANUP_PATTERNS),
        }
    }

    /// Text of the first labelled section found, or the whole text.
    pub fn ingredient_section<'t>(&self, text: &'t str) -> &'t str {
        let section = self.sections.iter().find_map(|regex| {
            let found = regex.captures(text)?.get(1)?;
            debug!("Found ingredient section via /{}/", regex.as_str());
            Some(found.as_str().trim())
        });
        // A header followed only by whitespace falls back to the whole text.
        match section {
            Some(s) if !s.is_empty() => s,
            _ => text.trim(),
        }
    }

    /// Split raw OCR text into candidate ingredient tokens.
    ///
    /// Order is preserved and duplicates are kept.
    pub fn parse_ingredients(&self, text: &str) -> Vec<String> {
        self.ingredient_section(text)
            .split(&TOKEN_DELIMITERS[..])
            .map(str::trim)
            .filter(|item| {
                let len = item.chars().count();
                len > 0 && len < MAX_TOKEN_CHARS
            })
            .map(str::to_string)
            .collect()
    }

    /// Normalize a user-typed ingredient name: lowercase, drop parenthesized
    /// notes and footnote markers.
    pub fn clean_ingredient_name(&self, raw: &str) -> String {
        let mut cleaned = raw.to_lowercase();
        for regex in &self.cleanup {
            cleaned = regex.replace_all(&cleaned, "").into_owned();
        }
        cleaned.trim().to_string()
    }
}

impl Default for LabelParser {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match Regex::new(pattern) {
            Ok(regex) => compiled.push(regex),
            Err(e) => warn!("Skipping invalid pattern '{}': {}", pattern, e),
        }
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_section() {
        let parser = LabelParser::new();
        let tokens = parser.parse_ingredients("Ingredients: Water, Fragrance, Methylisothiazolinone.");
        assert_eq!(tokens, vec!["Water", "Fragrance", "Methylisothiazolinone"]);
    }

    #[test]
    fn test_section_ignores_surrounding_text() {
        let parser = LabelParser::new();
        let text = "GENTLE HAND SOAP\nINGREDIENTS: aqua; glycerin, parfum. Made in France";
        assert_eq!(parser.parse_ingredients(text), vec!["aqua", "glycerin", "parfum"]);
    }

    #[test]
    fn test_pattern_order() {
        let parser = LabelParser::new();
        let text = "Contains: salt. Ingredients: water, citric acid";
        assert_eq!(parser.parse_ingredients(text), vec!["water", "citric acid"]);
        assert_eq!(parser.parse_ingredients("Composed of: aloe vera"), vec!["aloe vera"]);
    }

    #[test]
    fn test_blank_section_falls_back_to_whole_text() {
        let parser = LabelParser::new();
        let text = "Ingredients:   . Contains: salt";
        assert_eq!(parser.parse_ingredients(text), vec!["Ingredients:", "Contains: salt"]);
    }

    #[test]
    fn test_no_section_uses_whole_text() {
        let parser = LabelParser::new();
        let text = "water\nglycerin;; fragrance,\n";
        assert_eq!(parser.parse_ingredients(text), vec!["water", "glycerin", "fragrance"]);
    }

    #[test]
    fn test_empty_input() {
        let parser = LabelParser::new();
        assert!(parser.parse_ingredients("").is_empty());
        assert!(parser.parse_ingredients(" ,.;\n ").is_empty());
    }

    #[test]
    fn test_long_fragments_dropped() {
        let parser = LabelParser::new();
        let noise = "x".repeat(60);
        let text = format!("water, {}, glycerin", noise);
        assert_eq!(parser.parse_ingredients(&text), vec!["water", "glycerin"]);

        let boundary = "y".repeat(MAX_TOKEN_CHARS - 1);
        assert_eq!(parser.parse_ingredients(&boundary), vec![boundary.clone()]);
        assert!(parser.parse_ingredients(&"z".repeat(MAX_TOKEN_CHARS)).is_empty());
    }

    #[test]
    fn test_duplicates_kept() {
        let parser = LabelParser::new();
        assert_eq!(parser.parse_ingredients("water, water"), vec!["water", "water"]);
    }

    #[test]
    fn test_clean_ingredient_name() {
        let parser = LabelParser::new();
        assert_eq!(parser.clean_ingredient_name(" Aqua (Water)* "), "aqua");
        assert_eq!(parser.clean_ingredient_name("Parfum†"), "parfum");
        assert_eq!(parser.clean_ingredient_name("GLYCERIN‡"), "glycerin");
        assert_eq!(parser.clean_ingredient_name("Tocopherol (Vit. E) (Natural)"), "tocopherol");
    }

    #[test]
    fn test_clean_keeps_unclosed_parenthesis() {
        let parser = LabelParser::new();
        assert_eq!(parser.clean_ingredient_name("aqua (water"), "aqua (water");
        assert_eq!(parser.clean_ingredient_name("Aqua (Water*"), "aqua (water");
    }
}
