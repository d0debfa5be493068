use crate::types::SelectionRecord;

pub const NO_RESULTS_LINE: &str = "No travel or hospitality rounds found in the current window.";

/// Placeholder for empty text fields
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}

/// Placeholder for a missing announcement date
pub fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "None"
    } else {
        value
    }
}

/// Plain-text console report of the selected rounds
pub fn render(records: &[SelectionRecord]) -> String {
    if records.is_empty() {
        return NO_RESULTS_LINE.to_string();
    }

    let mut out = format!("Top {} latest travel/hospitality fundings:\n", records.len());
    for r in records {
        out.push_str(&format!(
            "Company: {}\nCategories: {}\nAnnounced: {}\nType: {}\nAmount: {}\nWebsite: {}\nDescription: {}\nCrunchbase: {}\n—\n",
            r.company_name,
            or_dash(&r.categories),
            or_none(&r.announced_on),
            or_dash(&r.investment_type),
            r.amount_usd,
            or_dash(&r.website),
            or_dash(&r.description),
            or_dash(&r.profile_url),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), NO_RESULTS_LINE);
    }

    #[test]
    fn test_render_record() {
        let record = SelectionRecord {
            announced_date: None,
            announced_on: String::new(),
            investment_type: String::new(),
            amount_usd: "Undisclosed".to_string(),
            company_name: "Harbor Ferries".to_string(),
            website: "https://ferries.example".to_string(),
            location: String::new(),
            categories: "Transportation".to_string(),
            profile_url: String::new(),
            description: "Island ferry service".to_string(),
        };
        let text = render(&[record]);
        assert!(text.starts_with("Top 1 latest travel/hospitality fundings:\nCompany: Harbor Ferries\n"));
        assert!(text.contains("Announced: None\nType: —\nAmount: Undisclosed\n"));
        assert!(text.contains("Website: https://ferries.example\nDescription: Island ferry service\n"));
        assert!(!text.contains("Location:"));
        assert!(text.ends_with("Crunchbase: —\n—\n"));
    }
}
