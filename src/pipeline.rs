//! Selection pipeline
//!
//! Fetches a batch of rounds, walks them newest first and enriches each
//! unseen company until enough travel matches are found or the lookup
//! budget runs out.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use log::info;

use crate::client::{ApiError, CompanyQuery, FundingApi};
use crate::config::Config;
use crate::filter::Classifier;
use crate::report::or_dash;
use crate::sorter::{rank_records, sort_rounds};
use crate::types::{RunStats, Selection, SelectionRecord, StopReason};

/// Limits for one selection run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub days_since: u32,
    pub round_limit: u32,
    pub max_lookups: usize,
    pub target: usize,
    pub pause: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            days_since: 1,
            round_limit: 50,
            max_lookups: 20,
            target: 2,
            pause: Duration::from_millis(200),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            days_since: config.days_since,
            round_limit: config.round_limit,
            max_lookups: config.max_company_lookups,
            target: config.target_matches,
            pause: config.sleep,
        }
    }
}

pub struct Pipeline<'a, A: FundingApi> {
    api: &'a A,
    classifier: &'a Classifier,
    settings: PipelineSettings,
}

impl<'a, A: FundingApi> Pipeline<'a, A> {
    pub fn new(api: &'a A, classifier: &'a Classifier, settings: PipelineSettings) -> Self {
        Self {
            api,
            classifier,
            settings,
        }
    }

    /// Select the newest travel/hospitality rounds.
    ///
    /// Transport errors abort the run; missing or non-travel companies are skipped.
    pub fn run(&self) -> Result<Selection, ApiError> {
        let settings = &self.settings;
        info!(
            "Fetching funding rounds: last {} day(s), limit={}",
            settings.days_since, settings.round_limit
        );
        let mut rounds = self.api.fetch_rounds(settings.days_since, settings.round_limit)?;
        sort_rounds(&mut rounds);
        info!("Retrieved {} rounds (all industries)", rounds.len());

        let mut stats = RunStats {
            rounds: rounds.len(),
            ..Default::default()
        };
        let mut picked: Vec<SelectionRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let total = rounds.len();

        for (idx, round) in rounds.iter().enumerate() {
            if picked.len() >= settings.target {
                stats.stop_reason = StopReason::TargetReached;
                break;
            }
            if stats.lookups >= settings.max_lookups {
                stats.stop_reason = StopReason::LookupCapReached;
                break;
            }

            let Some(company_id) = round.company_id.as_deref() else {
                stats.skipped_no_id += 1;
                continue;
            };
            if !seen.insert(company_id.to_string()) {
                stats.skipped_duplicate += 1;
                continue;
            }

            info!("({}/{}) Checking company uuid={} ...", idx + 1, total, company_id);
            let company = self.api.fetch_company(&CompanyQuery::Query(company_id.to_string()))?;
            stats.lookups += 1;

            let Some(company) = company else {
                info!("  -> no company data returned, skipping.");
                stats.skipped_empty += 1;
                continue;
            };

            if !self.classifier.is_travel_related(&company) {
                info!("  -> {} is not travel/hospitality, skipping.", display_name(&company.name));
                stats.skipped_not_travel += 1;
                continue;
            }

            let record = SelectionRecord::from_match(round, &company);
            info!(
                "  -> travel match: {} ({}, {})",
                display_name(&record.company_name),
                or_dash(&record.investment_type),
                record.amount_usd
            );
            picked.push(record);

            if !settings.pause.is_zero() {
                thread::sleep(settings.pause);
            }
        }

        // Loop may end on the last round right as a limit is hit
        if stats.stop_reason == StopReason::Exhausted {
            if picked.len() >= settings.target {
                stats.stop_reason = StopReason::TargetReached;
            } else if stats.lookups >= settings.max_lookups && stats.lookups > 0 {
                stats.stop_reason = StopReason::LookupCapReached;
            }
        }

        rank_records(&mut picked);
        stats.accepted = picked.len();
        info!(
            "Selection done ({}): {} accepted after {} lookups",
            stats.stop_reason, stats.accepted, stats.lookups
        );

        Ok(Selection {
            records: picked,
            stats,
        })
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed company)"
    } else {
        name
    }
}
