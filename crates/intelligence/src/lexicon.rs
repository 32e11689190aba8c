//! Domain lexicon: canonical domains and their multilingual synonyms.
//!
//! The built-in table is `data/domains.json`; `[dispatch] lexicon_path`
//! replaces it with a file in the same format.

use crate::keywords::tokenize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const BUILTIN: &str = include_str!("../data/domains.json");

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid lexicon {origin}: {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainLexicon {
    #[serde(default)]
    pub version: Option<String>,
    pub domains: Vec<Domain>,
}

impl DomainLexicon {
    /// The embedded default table.
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::parse(BUILTIN, "built-in")
    }

    pub fn parse(raw: &str, origin: &str) -> Result<Self, LexiconError> {
        let mut lexicon: Self = serde_json::from_str(raw).map_err(|source| LexiconError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        for domain in &mut lexicon.domains {
            for synonym in &mut domain.synonyms {
                *synonym = synonym.trim().to_lowercase();
            }
            domain.synonyms.retain(|s| !s.is_empty());
        }
        Ok(lexicon)
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LexiconError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon = Self::parse(&raw, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), domains = lexicon.domains.len(), "loaded lexicon");
        Ok(lexicon)
    }

    /// `path` if given, otherwise the built-in table.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, LexiconError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    /// Canonical domains mentioned by `keywords` or, for phrases and
    /// non-ASCII synonyms, by `text`. Lexicon order.
    pub fn detect(&self, keywords: &[String], text: &str) -> Vec<String> {
        let text_lc = tokenize(text).join(" ");
        self.domains
            .iter()
            .filter(|domain| {
                domain.synonyms.iter().any(|syn| {
                    if syn.is_ascii() && !syn.contains(' ') {
                        keywords.iter().any(|k| k == syn)
                    } else if syn.is_ascii() {
                        contains_phrase(&text_lc, syn)
                    } else {
                        text_lc.contains(syn.as_str())
                    }
                })
            })
            .map(|domain| domain.name.clone())
            .collect()
    }
}

/// Whole-word phrase match within space-joined tokens.
fn contains_phrase(tokens_joined: &str, phrase: &str) -> bool {
    let padded = format!(" {tokens_joined} ");
    padded.contains(&format!(" {phrase} "))
}
