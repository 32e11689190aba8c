//! Candidate, score and dispatch result types.

use serde::{Deserialize, Serialize};
use skillix_discovery::{LocalSkill, SkillScope};
use std::fmt;

/// Where a candidate skill comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateScope {
    Global,
    Project,
    /// A synced catalogue entry that is not installed.
    Market,
}

impl CandidateScope {
    pub fn is_local(&self) -> bool {
        !matches!(self, CandidateScope::Market)
    }
}

impl fmt::Display for CandidateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            CandidateScope::Global => "global",
            CandidateScope::Project => "project",
            CandidateScope::Market => "market",
        })
    }
}

impl From<SkillScope> for CandidateScope {
    fn from(scope: SkillScope) -> Self {
        match scope {
            SkillScope::Global => CandidateScope::Global,
            SkillScope::Project => CandidateScope::Project,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub scope: CandidateScope,
    /// Skill directory for local candidates, source name for market ones.
    pub source: String,
}

impl From<LocalSkill> for Candidate {
    fn from(skill: LocalSkill) -> Self {
        Self {
            name: skill.name,
            description: skill.description,
            tags: skill.tags,
            scope: skill.scope.into(),
            source: skill.dir.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScoreDetails {
    pub name_score: f64,
    pub description_score: f64,
    pub tag_score: f64,
    pub domain_score: f64,
    pub total: f64,
    pub matched_keywords: Vec<String>,
    pub matched_domains: Vec<String>,
}

/// One candidate with its score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub name: String,
    pub scope: CandidateScope,
    pub source: String,
    #[serde(flatten)]
    pub details: MatchScoreDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchAction {
    UseExisting,
    ImproveExisting,
    Install,
    CreateNew,
}

impl fmt::Display for DispatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchAction::UseExisting => "USE_EXISTING",
            DispatchAction::ImproveExisting => "IMPROVE_EXISTING",
            DispatchAction::Install => "INSTALL",
            DispatchAction::CreateNew => "CREATE_NEW",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    LowDescriptionMatch,
    LowTagMatch,
    MissingFeature,
    PartialMatch,
}

impl fmt::Display for SuggestionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SuggestionReason::LowDescriptionMatch => "low_description_match",
            SuggestionReason::LowTagMatch => "low_tag_match",
            SuggestionReason::MissingFeature => "missing_feature",
            SuggestionReason::PartialMatch => "partial_match",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSuggestion {
    pub skill: String,
    pub reason: SuggestionReason,
    pub suggested_changes: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub unmatched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub action: DispatchAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<CandidateScope>,
    pub confidence: f64,
    pub reason: String,
    pub match_details: Vec<ScoredCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_suggestion: Option<UpdateSuggestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_screaming_snake() {
        let json = serde_json::to_string(&DispatchAction::ImproveExisting).unwrap();
        assert_eq!(json, "\"IMPROVE_EXISTING\"");
        assert_eq!(DispatchAction::CreateNew.to_string(), "CREATE_NEW");
    }

    #[test]
    fn reason_serializes_snake_case() {
        let json = serde_json::to_string(&SuggestionReason::LowTagMatch).unwrap();
        assert_eq!(json, "\"low_tag_match\"");
        assert_eq!(SuggestionReason::LowTagMatch.to_string(), "low_tag_match");
    }

    #[test]
    fn market_is_not_local() {
        assert!(!CandidateScope::Market.is_local());
        assert!(CandidateScope::from(SkillScope::Project).is_local());
    }
}
