use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The fixed choices offered by the poll. The last entry is the open-ended
/// category; voters are expected to put its detail in the comments field.
pub const POLL_OPTIONS: [&str; 5] = [
    "Cursor AI",
    "GitHub Copilot",
    "Replit",
    "Claude",
    "Other (Please specify in comments)",
];

/// Timestamp layout used in the sheet, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded poll submission. Immutable once written - the app has no
/// update or delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    pub name: String,
    pub selected_option: String,
    pub comments: String,
    pub timestamp: String,
}

/// Vote count for a single option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub option: String,
    pub votes: u64,
}

/// Tallies responses by selected option, most votes first. Ties are broken
/// by option name so the chart ordering is stable between refreshes.
pub fn tally_votes(responses: &[PollResponse]) -> Vec<VoteCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for response in responses {
        *counts.entry(response.selected_option.as_str()).or_insert(0) += 1;
    }

    let mut tally: Vec<VoteCount> = counts
        .into_iter()
        .map(|(option, votes)| VoteCount {
            option: option.to_string(),
            votes,
        })
        .collect();
    tally.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.option.cmp(&b.option)));
    tally
}
