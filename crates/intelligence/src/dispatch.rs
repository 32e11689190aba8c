//! Decides what to do with a task: use, improve, install, or create a skill.

use crate::collector::Collector;
use crate::lexicon::DomainLexicon;
use crate::scorer::MatchScorer;
use crate::suggestion::suggest_update;
use crate::types::{
    Candidate, CandidateScope, DispatchAction, DispatchResult, MatchScoreDetails, ScoredCandidate,
};
use serde::{Deserialize, Serialize};
use skillix_state::DispatchSettings;
use std::cmp::Ordering;

/// How many scored candidates are reported in `matchDetails`.
pub const MATCH_DETAILS_LIMIT: usize = 5;

/// Below the match threshold a local skill at least this close is worth improving.
pub const IMPROVE_THRESHOLD: f64 = 0.3;

const NO_CANDIDATES_CONFIDENCE: f64 = 0.7;
const WEAK_MATCH_CONFIDENCE: f64 = 0.5;
const NO_MATCH_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub task: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl AnalyzeRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Task, context and hints joined into the text that gets scored.
    pub fn scoring_text(&self) -> String {
        let mut parts = vec![self.task.as_str()];
        if let Some(ctx) = self.context.as_deref() {
            parts.push(ctx);
        }
        parts.extend(self.hints.iter().map(String::as_str));
        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct DispatchAnalyzer {
    lexicon: DomainLexicon,
    settings: DispatchSettings,
}

impl DispatchAnalyzer {
    pub fn new(lexicon: DomainLexicon, settings: DispatchSettings) -> Self {
        Self { lexicon, settings }
    }

    /// Collects candidates and decides.
    pub fn analyze(&self, collector: &Collector<'_>, request: &AnalyzeRequest) -> DispatchResult {
        let candidates = collector.collect(&request.task);
        self.decide(request, &candidates)
    }

    /// Scores `candidates` against the request and applies the decision table.
    ///
    /// Candidates with equal totals keep their input order, so local skills
    /// win ties against market entries.
    pub fn decide(&self, request: &AnalyzeRequest, candidates: &[Candidate]) -> DispatchResult {
        if candidates.is_empty() {
            return create_new(
                NO_CANDIDATES_CONFIDENCE,
                "No skills are available locally or in the catalogue".to_string(),
                Vec::new(),
            );
        }

        let scorer = MatchScorer::new(&self.lexicon);
        let profile = scorer.profile(&request.scoring_text());

        let mut scored: Vec<(&Candidate, MatchScoreDetails)> = candidates
            .iter()
            .map(|c| (c, scorer.score(&profile, c)))
            .collect();
        scored.sort_by(|a, b| b.1.total.partial_cmp(&a.1.total).unwrap_or(Ordering::Equal));

        let match_details: Vec<ScoredCandidate> = scored
            .iter()
            .take(MATCH_DETAILS_LIMIT)
            .map(|(c, d)| ScoredCandidate {
                name: c.name.clone(),
                scope: c.scope,
                source: c.source.clone(),
                details: d.clone(),
            })
            .collect();

        let (best, details) = &scored[0];
        let total = details.total;
        tracing::debug!(
            best = %best.name,
            scope = %best.scope,
            total,
            keywords = ?profile.keywords,
            domains = ?profile.domains,
            "scored dispatch candidates"
        );

        if total >= self.settings.confidence_threshold {
            return pick(best, total, true, match_details);
        }
        if total >= self.settings.match_threshold {
            return pick(best, total, false, match_details);
        }
        if total >= IMPROVE_THRESHOLD && best.scope.is_local() {
            let suggestion = suggest_update(&profile.keywords, best, details);
            return DispatchResult {
                action: DispatchAction::ImproveExisting,
                skill: Some(best.name.clone()),
                source: Some(best.source.clone()),
                scope: Some(best.scope),
                confidence: total,
                reason: format!(
                    "Local skill '{}' partly matches the task ({:.2}); improving it is cheaper than starting over",
                    best.name, total
                ),
                match_details,
                update_suggestion: Some(suggestion),
            };
        }
        if scored.iter().any(|(_, d)| d.total > 0.0) {
            return create_new(
                WEAK_MATCH_CONFIDENCE,
                format!(
                    "Best candidate '{}' only scored {:.2}; a new skill fits better",
                    best.name, total
                ),
                match_details,
            );
        }
        create_new(
            NO_MATCH_CONFIDENCE,
            "No existing skill relates to this task".to_string(),
            match_details,
        )
    }
}

fn pick(
    best: &Candidate,
    total: f64,
    confident: bool,
    match_details: Vec<ScoredCandidate>,
) -> DispatchResult {
    let market = best.scope == CandidateScope::Market;
    let (action, confidence) = match (market, confident) {
        (false, true) => (DispatchAction::UseExisting, (total + 0.1).min(0.95)),
        (true, true) => (DispatchAction::Install, total.min(0.9)),
        (_, false) => (
            if market {
                DispatchAction::Install
            } else {
                DispatchAction::UseExisting
            },
            total,
        ),
    };
    let reason = if market {
        format!(
            "Catalogue skill '{}' from '{}' matches the task ({:.2})",
            best.name, best.source, total
        )
    } else {
        format!(
            "{} skill '{}' matches the task ({:.2})",
            capitalize(best.scope.to_string()),
            best.name,
            total
        )
    };
    DispatchResult {
        action,
        skill: Some(best.name.clone()),
        source: Some(best.source.clone()),
        scope: Some(best.scope),
        confidence,
        reason,
        match_details,
        update_suggestion: None,
    }
}

fn create_new(confidence: f64, reason: String, match_details: Vec<ScoredCandidate>) -> DispatchResult {
    DispatchResult {
        action: DispatchAction::CreateNew,
        skill: None,
        source: None,
        scope: None,
        confidence,
        reason,
        match_details,
        update_suggestion: None,
    }
}

fn capitalize(s: String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> DispatchAnalyzer {
        DispatchAnalyzer::new(DomainLexicon::builtin().unwrap(), DispatchSettings::default())
    }

    fn candidate(name: &str, description: &str, tags: &[&str], scope: CandidateScope) -> Candidate {
        Candidate {
            name: name.into(),
            description: description.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            scope,
            source: "here".into(),
        }
    }

    #[test]
    fn no_candidates_creates_new() {
        let result = analyzer().decide(&AnalyzeRequest::new("anything"), &[]);
        assert_eq!(result.action, DispatchAction::CreateNew);
        assert_eq!(result.confidence, 0.7);
        assert!(result.match_details.is_empty());
    }

    #[test]
    fn pdf_task_uses_local_converter() {
        let candidates = vec![
            candidate("git-helper", "Commit and branch helpers", &["git"], CandidateScope::Global),
            candidate(
                "pdf-converter",
                "Convert PDF documents to image files",
                &["pdf", "image"],
                CandidateScope::Global,
            ),
        ];
        let result = analyzer().decide(&AnalyzeRequest::new("convert PDF to image"), &candidates);

        assert_eq!(result.match_details[0].name, "pdf-converter");
        assert!(result.match_details[0].details.domain_score > 0.0);
        assert!(matches!(
            result.action,
            DispatchAction::UseExisting | DispatchAction::ImproveExisting
        ));
        assert_eq!(result.skill.as_deref(), Some("pdf-converter"));
    }

    #[test]
    fn strong_local_match_confidence_is_capped() {
        let candidates = vec![candidate(
            "pdf-converter",
            "Convert PDF documents to image files",
            &["pdf", "image"],
            CandidateScope::Project,
        )];
        let result = analyzer().decide(&AnalyzeRequest::new("convert PDF to image"), &candidates);
        let total = result.match_details[0].details.total;

        assert!(total >= 0.7);
        assert_eq!(result.action, DispatchAction::UseExisting);
        assert_eq!(result.confidence, (total + 0.1).min(0.95));
        assert!(result.update_suggestion.is_none());
    }

    #[test]
    fn strong_market_match_installs() {
        let candidates = vec![candidate(
            "pdf-converter",
            "Convert PDF documents to image files",
            &["pdf", "image"],
            CandidateScope::Market,
        )];
        let result = analyzer().decide(&AnalyzeRequest::new("convert PDF to image"), &candidates);
        let total = result.match_details[0].details.total;

        assert_eq!(result.action, DispatchAction::Install);
        assert_eq!(result.confidence, total.min(0.9));
        assert_eq!(result.scope, Some(CandidateScope::Market));
    }

    #[test]
    fn threshold_band_reports_raw_total() {
        let settings = DispatchSettings {
            confidence_threshold: 0.99,
            match_threshold: 0.1,
            ..DispatchSettings::default()
        };
        let analyzer = DispatchAnalyzer::new(DomainLexicon::builtin().unwrap(), settings);
        let candidates = vec![candidate(
            "pdf-converter",
            "Convert PDF documents to image files",
            &["pdf"],
            CandidateScope::Global,
        )];
        let result = analyzer.decide(&AnalyzeRequest::new("convert PDF to image"), &candidates);

        assert_eq!(result.action, DispatchAction::UseExisting);
        assert_eq!(result.confidence, result.match_details[0].details.total);
    }

    #[test]
    fn partial_local_match_is_improved() {
        let settings = DispatchSettings {
            confidence_threshold: 0.99,
            match_threshold: 0.98,
            ..DispatchSettings::default()
        };
        let analyzer = DispatchAnalyzer::new(DomainLexicon::builtin().unwrap(), settings);
        let candidates = vec![candidate(
            "pdf-converter",
            "Convert PDF documents to image files",
            &["pdf", "image"],
            CandidateScope::Global,
        )];
        let result = analyzer.decide(&AnalyzeRequest::new("convert PDF to image"), &candidates);

        assert_eq!(result.action, DispatchAction::ImproveExisting);
        assert_eq!(result.confidence, result.match_details[0].details.total);
        let suggestion = result.update_suggestion.unwrap();
        assert_eq!(suggestion.skill, "pdf-converter");
        assert!(!suggestion.suggested_changes.is_empty());
    }

    #[test]
    fn weak_market_match_is_not_improved() {
        let settings = DispatchSettings {
            confidence_threshold: 0.99,
            match_threshold: 0.98,
            ..DispatchSettings::default()
        };
        let analyzer = DispatchAnalyzer::new(DomainLexicon::builtin().unwrap(), settings);
        let candidates = vec![candidate(
            "pdf-converter",
            "Convert PDF documents to image files",
            &["pdf", "image"],
            CandidateScope::Market,
        )];
        let result = analyzer.decide(&AnalyzeRequest::new("convert PDF to image"), &candidates);

        assert_eq!(result.action, DispatchAction::CreateNew);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn unrelated_candidates_create_new() {
        let candidates = vec![candidate(
            "kubernetes-deploy",
            "Roll out clusters",
            &[],
            CandidateScope::Global,
        )];
        let result = analyzer().decide(&AnalyzeRequest::new("translate poetry"), &candidates);

        assert_eq!(result.action, DispatchAction::CreateNew);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.match_details.len(), 1);
        assert_eq!(result.match_details[0].details.total, 0.0);
    }

    #[test]
    fn match_details_keep_top_five() {
        let candidates: Vec<_> = (0..8)
            .map(|i| candidate(&format!("pdf-tool-{i}"), "pdf helper", &[], CandidateScope::Global))
            .collect();
        let result = analyzer().decide(&AnalyzeRequest::new("pdf"), &candidates);

        assert_eq!(result.match_details.len(), MATCH_DETAILS_LIMIT);
        assert_eq!(result.match_details[0].name, "pdf-tool-0");
    }

    #[test]
    fn scoring_text_joins_context_and_hints() {
        let request = AnalyzeRequest::new("merge files")
            .with_context("  ")
            .with_hint("pdf")
            .with_hint("fast");
        assert_eq!(request.scoring_text(), "merge files pdf fast");
    }
}
