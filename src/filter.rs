use anyhow::{Context, Result};
use regex::RegexSet;

use crate::types::{CompanyProfile, Taxonomy};

// ============================================
// Travel Taxonomy
// ============================================

/// Crunchbase's own industry group label for the sector
pub const TRAVEL_LABEL: &str = "hospitality, travel and tourism";

/// Keywords that mark a company as travel/hospitality
pub const TRAVEL_KEYWORDS: &[&str] = &[
    // Core sectors
    "hospitality",
    "travel",
    "tourism",
    // Lodging & stays
    "hotel",
    "lodging",
    "resort",
    "vacation rental",
    "short term rental",
    "hostel",
    "bnb",
    "bed and breakfast",
    // Booking & platforms
    "ota", // online travel agency; also matches "total", "iota" etc. under substring matching
    "booking",
    "expedia",
    "tripadvisor",
    // Transport modes (traveler-facing only)
    "airline",
    "airport",
    "cruise",
    "ferry",
    "rideshare",
    // Travel services
    "tour operator",
    "tourism board",
    "travel agency",
];

/// Separator between collected fields in the search blob
const BLOB_SEPARATOR: &str = " | ";

impl Taxonomy {
    /// The built-in travel/hospitality taxonomy
    pub fn travel() -> Self {
        Self {
            label: TRAVEL_LABEL.to_string(),
            keywords: TRAVEL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::travel()
    }
}

// ============================================
// Matching Policies
// ============================================

/// Checks a lower-cased blob against a fixed set of lower-cased terms
pub trait KeywordMatcher {
    /// Whether any term occurs in `blob`
    fn is_match(&self, blob: &str) -> bool;
}

/// Plain substring containment.
///
/// Cheap and permissive: "ota" matches "total" and "toyota".
#[derive(Debug, Clone, Default)]
pub struct SubstringMatcher {
    terms: Vec<String>,
}

impl SubstringMatcher {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: terms.to_vec(),
        }
    }
}

impl KeywordMatcher for SubstringMatcher {
    fn is_match(&self, blob: &str) -> bool {
        self.terms.iter().any(|term| blob.contains(term.as_str()))
    }
}

/// Terms must start and end on a word boundary; patterns are compiled once
#[derive(Debug, Clone)]
pub struct WordBoundaryMatcher {
    patterns: RegexSet,
}

impl WordBoundaryMatcher {
    pub fn new(terms: &[String]) -> Result<Self, regex::Error> {
        let patterns = RegexSet::new(terms.iter().map(|t| format!(r"\b{}\b", regex::escape(t))))?;
        Ok(Self { patterns })
    }
}

impl KeywordMatcher for WordBoundaryMatcher {
    fn is_match(&self, blob: &str) -> bool {
        self.patterns.is_match(blob)
    }
}

/// Which matcher to build, as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Substring,
    WordBoundary,
}

impl std::str::FromStr for MatchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" | "" => Ok(MatchMode::Substring),
            "word" | "word_boundary" => Ok(MatchMode::WordBoundary),
            other => Err(anyhow::anyhow!(
                "unknown keyword matching mode '{}' (expected 'substring' or 'word')",
                other
            )),
        }
    }
}

// ============================================
// Classifier
// ============================================

/// Travel/hospitality classifier: reference label plus keyword set, checked
/// against a company's categories, industries, tags and descriptions.
pub struct Classifier {
    keywords: Vec<String>,
    matcher: Box<dyn KeywordMatcher>,
}

impl Classifier {
    /// Build with one of the built-in matching modes
    pub fn new(taxonomy: Taxonomy, mode: MatchMode) -> Result<Self> {
        let terms = taxonomy_terms(&taxonomy);
        let matcher: Box<dyn KeywordMatcher> = match mode {
            MatchMode::Substring => Box::new(SubstringMatcher::new(&terms)),
            MatchMode::WordBoundary => Box::new(
                WordBoundaryMatcher::new(&terms).context("Failed to compile keyword patterns")?,
            ),
        };
        Ok(Self::with_matcher(taxonomy, matcher))
    }

    /// Build around a custom matcher, already loaded with the taxonomy's terms
    pub fn with_matcher(taxonomy: Taxonomy, matcher: Box<dyn KeywordMatcher>) -> Self {
        Self {
            keywords: normalized_keywords(&taxonomy.keywords),
            matcher,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether the company belongs to the taxonomy
    pub fn is_travel_related(&self, company: &CompanyProfile) -> bool {
        let blob = search_blob(company);
        !blob.is_empty() && self.matcher.is_match(&blob)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let taxonomy = Taxonomy::travel();
        let matcher = SubstringMatcher::new(&taxonomy_terms(&taxonomy));
        Self::with_matcher(taxonomy, Box::new(matcher))
    }
}

fn normalized_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Label first, then keywords, all lower-cased
pub fn taxonomy_terms(taxonomy: &Taxonomy) -> Vec<String> {
    let mut terms = normalized_keywords(std::slice::from_ref(&taxonomy.label));
    terms.extend(normalized_keywords(&taxonomy.keywords));
    terms
}

/// Lower-cased categories, industries, tags and description texts joined into one string
pub fn search_blob(company: &CompanyProfile) -> String {
    let lists = company
        .categories
        .iter()
        .chain(company.industries.iter())
        .chain(company.tags.iter());

    let texts = company
        .short_description
        .iter()
        .chain(company.description.iter());

    lists
        .chain(texts)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(BLOB_SEPARATOR)
}
