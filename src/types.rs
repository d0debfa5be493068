use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A funding event as announced upstream, resolved from the raw JSON once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundingRound {
    pub announced_on: Option<NaiveDate>,
    /// Announcement date as sent upstream, shown when it does not parse
    pub announced_text: Option<String>,
    pub investment_type: Option<String>,
    /// Amount raised in USD
    pub money_raised: Option<f64>,
    pub company_id: Option<String>,
}

/// Company metadata returned by the lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyProfile {
    pub name: String,
    pub website: Option<String>,
    pub location: Option<String>,
    pub categories: Vec<String>,
    pub industries: Vec<String>,
    pub tags: Vec<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub profile_url: Option<String>,
}

/// One accepted round joined with its company, in CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// Parsed date, used for ranking only
    #[serde(skip)]
    pub announced_date: Option<NaiveDate>,
    /// Date as written to the CSV: ISO when parsed, else the upstream text
    pub announced_on: String,
    pub investment_type: String,
    pub amount_usd: String,
    pub company_name: String,
    pub website: String,
    pub location: String,
    pub categories: String,
    #[serde(rename = "crunchbase_url")]
    pub profile_url: String,
    pub description: String,
}

impl SelectionRecord {
    pub fn from_match(round: &FundingRound, company: &CompanyProfile) -> Self {
        let categories = if company.categories.is_empty() {
            &company.industries
        } else {
            &company.categories
        };

        Self {
            announced_date: round.announced_on,
            announced_on: round
                .announced_on
                .map(|d| d.format("%Y-%m-%d").to_string())
                .or_else(|| round.announced_text.clone())
                .unwrap_or_default(),
            investment_type: round.investment_type.clone().unwrap_or_default(),
            amount_usd: crate::normalize::format_usd(round.money_raised),
            company_name: company.name.clone(),
            website: company.website.clone().unwrap_or_default(),
            location: company.location.clone().unwrap_or_default(),
            categories: categories.join(", "),
            profile_url: company.profile_url.clone().unwrap_or_default(),
            description: company
                .short_description
                .clone()
                .or_else(|| company.description.clone())
                .unwrap_or_default(),
        }
    }
}

/// Why the selection loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    LookupCapReached,
    Exhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target reached"),
            StopReason::LookupCapReached => write!(f, "lookup cap reached"),
            StopReason::Exhausted => write!(f, "input exhausted"),
        }
    }
}

/// Counters for a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub rounds: usize,
    pub lookups: usize,
    pub skipped_no_id: usize,
    pub skipped_duplicate: usize,
    pub skipped_empty: usize,
    pub skipped_not_travel: usize,
    pub accepted: usize,
    pub stop_reason: StopReason,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            rounds: 0,
            lookups: 0,
            skipped_no_id: 0,
            skipped_duplicate: 0,
            skipped_empty: 0,
            skipped_not_travel: 0,
            accepted: 0,
            stop_reason: StopReason::Exhausted,
        }
    }
}

/// Output of one run: ranked records plus the counters that produced them.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub records: Vec<SelectionRecord>,
    pub stats: RunStats,
}

/// Label plus keyword list used to recognise travel companies.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Taxonomy {
    pub label: String,
    pub keywords: Vec<String>,
}
