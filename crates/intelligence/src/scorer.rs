//! Multi-dimensional similarity between a task and one candidate.

use crate::keywords::{extract_keywords, keyword_matches, tokenize};
use crate::lexicon::DomainLexicon;
use crate::types::{Candidate, MatchScoreDetails};

const NAME_WEIGHT: f64 = 0.30;
const DESCRIPTION_WEIGHT: f64 = 0.30;
const TAG_WEIGHT: f64 = 0.15;
const DOMAIN_WEIGHT: f64 = 0.25;

/// Keywords and domains of the text being matched.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProfile {
    pub text: String,
    pub keywords: Vec<String>,
    pub domains: Vec<String>,
}

impl TaskProfile {
    pub fn new(text: &str, lexicon: &DomainLexicon) -> Self {
        let keywords = extract_keywords(text);
        let domains = lexicon.detect(&keywords, text);
        Self {
            text: text.to_string(),
            keywords,
            domains,
        }
    }
}

pub struct MatchScorer<'a> {
    lexicon: &'a DomainLexicon,
}

impl<'a> MatchScorer<'a> {
    pub fn new(lexicon: &'a DomainLexicon) -> Self {
        Self { lexicon }
    }

    pub fn profile(&self, text: &str) -> TaskProfile {
        TaskProfile::new(text, self.lexicon)
    }

    pub fn score(&self, task: &TaskProfile, candidate: &Candidate) -> MatchScoreDetails {
        let segments = name_segments(&candidate.name);
        let description_tokens = tokenize(&candidate.description);
        let tag_tokens: Vec<String> = candidate.tags.iter().flat_map(|t| tokenize(t)).collect();

        let name_score = if segments.is_empty() {
            0.0
        } else {
            let hit = segments
                .iter()
                .filter(|seg| task.keywords.iter().any(|k| keyword_matches(k, seg)))
                .count();
            hit as f64 / segments.len() as f64
        };

        let description_score = keyword_fraction(&task.keywords, &description_tokens);
        let tag_score = if candidate.tags.is_empty() {
            0.0
        } else {
            keyword_fraction(&task.keywords, &tag_tokens)
        };

        let candidate_text = format!(
            "{} {} {}",
            candidate.name,
            candidate.description,
            candidate.tags.join(" ")
        );
        let candidate_domains = self
            .lexicon
            .detect(&extract_keywords(&candidate_text), &candidate_text);
        let matched_domains: Vec<String> = task
            .domains
            .iter()
            .filter(|d| candidate_domains.contains(d))
            .cloned()
            .collect();
        let domain_score = if task.domains.is_empty() {
            0.0
        } else {
            matched_domains.len() as f64 / task.domains.len() as f64
        };

        let matched_keywords = task
            .keywords
            .iter()
            .filter(|k| {
                segments
                    .iter()
                    .chain(&description_tokens)
                    .chain(&tag_tokens)
                    .any(|t| keyword_matches(k, t))
            })
            .cloned()
            .collect();

        let total = (NAME_WEIGHT * name_score
            + DESCRIPTION_WEIGHT * description_score
            + TAG_WEIGHT * tag_score
            + DOMAIN_WEIGHT * domain_score)
            .clamp(0.0, 1.0);

        MatchScoreDetails {
            name_score,
            description_score,
            tag_score,
            domain_score,
            total,
            matched_keywords,
            matched_domains,
        }
    }
}

/// Lowercased name parts split on `-`, `_` and whitespace.
pub fn name_segments(name: &str) -> Vec<String> {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn keyword_fraction(keywords: &[String], tokens: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let hit = keywords
        .iter()
        .filter(|k| tokens.iter().any(|t| keyword_matches(k, t)))
        .count();
    hit as f64 / keywords.len() as f64
}
