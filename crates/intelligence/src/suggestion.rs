//! Improvement hints for a local skill that only partly fits a task.

use crate::keywords::{extract_keywords, keyword_matches};
use crate::types::{Candidate, MatchScoreDetails, SuggestionReason, UpdateSuggestion};

/// Builds the suggestion attached to `IMPROVE_EXISTING`.
///
/// The reason is picked from the weakest sub-score: description first, then
/// tags (only when the skill has some), then name and description together.
pub fn suggest_update(
    task_keywords: &[String],
    candidate: &Candidate,
    details: &MatchScoreDetails,
) -> UpdateSuggestion {
    let own = extract_keywords(&format!("{} {}", candidate.name, candidate.description));
    let (matched, unmatched): (Vec<String>, Vec<String>) = task_keywords
        .iter()
        .cloned()
        .partition(|k| own.iter().any(|o| keyword_matches(k, o)));

    let reason = if details.description_score < 0.3 {
        SuggestionReason::LowDescriptionMatch
    } else if details.tag_score < 0.2 && !candidate.tags.is_empty() {
        SuggestionReason::LowTagMatch
    } else if details.name_score < 0.5 && details.description_score < 0.5 {
        SuggestionReason::MissingFeature
    } else {
        SuggestionReason::PartialMatch
    };

    let missing = unmatched.join(", ");
    let mut changes = Vec::new();
    match reason {
        SuggestionReason::LowDescriptionMatch => {
            changes.push(format!(
                "Expand the description of '{}' to mention: {missing}",
                candidate.name
            ));
            changes.push("Add usage examples that cover this kind of task".to_string());
        }
        SuggestionReason::LowTagMatch => {
            changes.push(format!("Add tags for: {missing}"));
        }
        SuggestionReason::MissingFeature => {
            changes.push(format!(
                "Add instructions to '{}' covering: {missing}",
                candidate.name
            ));
            changes.push("Update name or description once the new capability exists".to_string());
        }
        SuggestionReason::PartialMatch => {
            changes.push(format!(
                "Clarify how '{}' handles: {missing}",
                candidate.name
            ));
        }
    }
    if !details.matched_domains.is_empty() {
        changes.push(format!(
            "Keep the focus on: {}",
            details.matched_domains.join(", ")
        ));
    }

    UpdateSuggestion {
        skill: candidate.name.clone(),
        reason,
        suggested_changes: changes,
        matched_keywords: matched,
        unmatched_keywords: unmatched,
    }
}
