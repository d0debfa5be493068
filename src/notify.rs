use std::time::Duration;

use anyhow::{Context, Result};

use crate::report::{or_dash, or_none};
use crate::types::SelectionRecord;

/// Posted when a run selects nothing
pub const NO_RESULTS_MESSAGE: &str = ":no_entry: No travel/hospitality fundings found today.";

const HEADLINE: &str = "*Latest Travel/Hospitality Investments:*";

/// Slack mrkdwn block for one record
pub fn format_record(record: &SelectionRecord) -> String {
    format!(
        "*Company:* {}\n*Categories:* {}\n*Announced:* {}\n*Type:* {}\n*Amount:* {}\n*Website:* {}\n*Description:* {}\n*Crunchbase:* {}",
        record.company_name,
        or_dash(&record.categories),
        or_none(&record.announced_on),
        or_dash(&record.investment_type),
        record.amount_usd,
        or_dash(&record.website),
        or_dash(&record.description),
        or_dash(&record.profile_url),
    )
}

/// Full notification text, or the no-results message
pub fn format_message(records: &[SelectionRecord]) -> String {
    if records.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let blocks: Vec<String> = records.iter().map(format_record).collect();
    format!("{}\n\n{}", HEADLINE, blocks.join("\n\n"))
}

/// Post `text` to a Slack incoming webhook
pub fn send_slack(webhook_url: &str, text: &str) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    client
        .post(webhook_url)
        .json(&serde_json::json!({ "text": text }))
        .send()
        .context("Slack webhook request failed")?
        .error_for_status()
        .context("Slack webhook rejected the message")?;
    Ok(())
}
