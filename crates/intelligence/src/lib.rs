//! Task analysis and dispatch decisions.
//!
//! This crate provides:
//! - Keyword extraction and a multilingual domain lexicon
//! - Candidate collection from local skills and the synced catalogue
//! - Per-candidate match scoring with an explainable breakdown
//! - The dispatch decision (use, improve, install or create) with update hints

pub mod collector;
pub mod dispatch;
pub mod keywords;
pub mod lexicon;
pub mod scorer;
pub mod suggestion;
pub mod types;

pub use collector::{CatalogMarket, Collector, Marketplace};
pub use dispatch::{AnalyzeRequest, DispatchAnalyzer, IMPROVE_THRESHOLD, MATCH_DETAILS_LIMIT};
pub use keywords::{extract_keywords, keyword_matches, tokenize};
pub use lexicon::{Domain, DomainLexicon, LexiconError};
pub use scorer::{MatchScorer, TaskProfile};
pub use suggestion::suggest_update;
pub use types::{
    Candidate, CandidateScope, DispatchAction, DispatchResult, MatchScoreDetails, ScoredCandidate,
    SuggestionReason, UpdateSuggestion,
};
