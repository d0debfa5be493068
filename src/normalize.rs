//! Response Normalization Module
//!
//! Provides functions to:
//! - Coerce loosely-typed API values (string, list of strings, list of objects) into `Vec<String>`
//! - Resolve raw funding-round and company JSON into typed records
//! - Pick the company identifier out of the candidate round fields
//! - Parse and format money amounts

use chrono::NaiveDate;
use serde_json::Value;

use crate::types::{CompanyProfile, FundingRound};

/// Round fields that may carry the funded company's identifier, highest priority first
pub const COMPANY_ID_FIELDS: &[&str] = &[
    "funded_organization_identifier",
    "funded_organization_uuid",
    "organization_uuid",
    "company_uuid",
];

/// Marker rendered when a round has no usable amount
pub const UNDISCLOSED: &str = "Undisclosed";

/// True for values that carry no content: null, false, 0, "", [] and {}
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Textual form of a value; strings are returned without quotes
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a loosely-typed value into a list of strings.
///
/// - blank values yield an empty list
/// - a bare string yields a single element
/// - list items: strings pass through, objects yield `name` or `value`
///   (falling back to their JSON text), anything else its textual form
/// - any other value is wrapped as a single textual element
pub fn to_string_list(value: &Value) -> Vec<String> {
    if is_blank(value) {
        return vec![];
    }

    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Object(obj) => ["name", "value"]
                    .iter()
                    .filter_map(|k| obj.get(*k))
                    .find(|v| !is_blank(v))
                    .map(value_text)
                    .unwrap_or_else(|| item.to_string()),
                other => value_text(other),
            })
            .collect(),
        other => vec![value_text(other)],
    }
}

/// First non-blank field among `keys`, rendered as text
fn first_text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !is_blank(v))
        .map(|v| match v {
            Value::Array(_) | Value::Object(_) => to_string_list(v).join(", "),
            other => value_text(other),
        })
}

/// Extract the funded company's identifier from a raw round.
///
/// The first candidate field holding a non-empty string wins; an object
/// field contributes its inner `uuid`.
pub fn extract_company_id(round: &Value) -> Option<String> {
    for key in COMPANY_ID_FIELDS {
        match round.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Object(obj)) => {
                if let Some(Value::String(uuid)) = obj.get("uuid") {
                    if !uuid.is_empty() {
                        return Some(uuid.clone());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Extract the raised amount, preferring the USD-normalized field
pub fn extract_amount(round: &Value) -> Option<f64> {
    let money = ["money_raised_usd", "money_raised"]
        .iter()
        .filter_map(|k| round.get(*k))
        .find(|v| !is_blank(v))?;

    match money {
        Value::Object(obj) => ["value_usd", "value"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !is_blank(v))
            .and_then(number_of),
        other => number_of(other),
    }
}

/// Parse `YYYY-MM-DD`, or the date prefix of a full timestamp
pub fn parse_announced_on(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            text.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Resolve a raw round object into a `FundingRound`
pub fn round_from_value(raw: &Value) -> FundingRound {
    FundingRound {
        announced_on: raw.get("announced_on").and_then(parse_announced_on),
        announced_text: first_text(raw, &["announced_on"]),
        investment_type: first_text(raw, &["investment_type"]),
        money_raised: extract_amount(raw),
        company_id: extract_company_id(raw),
    }
}

/// Resolve a raw company object into a `CompanyProfile`.
///
/// Returns `None` for anything that is not a non-empty object.
pub fn profile_from_value(raw: &Value) -> Option<CompanyProfile> {
    if !raw.is_object() || is_blank(raw) {
        return None;
    }

    let list = |key: &str| raw.get(key).map(to_string_list).unwrap_or_default();

    Some(CompanyProfile {
        name: first_text(raw, &["name"]).unwrap_or_default(),
        website: first_text(raw, &["website", "homepage_url"]),
        location: first_text(raw, &["location", "country", "country_code"]),
        categories: list("categories"),
        industries: list("industries"),
        tags: list("tags"),
        short_description: first_text(raw, &["short_description"]),
        description: first_text(raw, &["description"]),
        profile_url: first_text(raw, &["permalink", "cb_url"]),
    })
}

/// Format a USD amount as `$1,234,567`, rounded to the nearest dollar
pub fn format_usd(amount: Option<f64>) -> String {
    let Some(value) = amount.filter(|v| v.is_finite()) else {
        return UNDISCLOSED.to_string();
    };

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
