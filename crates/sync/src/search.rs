//! Ranked search across every synced source's index.

use crate::error::{CatalogError, Result};
use crate::indexer::{SkillIndexItem, SourceIndex};
use crate::locator::parse_url;
use crate::manifest::{Manifest, ManifestEntry, ManifestStore, SyncStatus};
use serde::Serialize;
use skillix_state::{read_json, Config, SkillixPaths, Source};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

const NAME_HIT: f64 = 0.5;
const EXACT_NAME_BONUS: f64 = 0.3;
const DESCRIPTION_HIT: f64 = 0.3;
const TAG_HIT: f64 = 0.2;
const TAG_FILTER_BONUS: f64 = 0.1;
const EMPTY_QUERY_BASE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict to one source, by name or canonical id.
    pub source: Option<String>,
    /// Skills must carry at least one of these tags.
    pub tags: Vec<String>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            source: None,
            tags: Vec::new(),
            limit: skillix_state::config::DEFAULT_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub skill: SkillIndexItem,
    pub source_id: String,
    pub source_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub id: String,
    pub name: String,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ManifestEntry> for SourceStatus {
    fn from(entry: &ManifestEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            status: entry.status,
            skill_count: entry.skill_count,
            error: entry.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    /// Matches before truncation to `limit`.
    pub total: usize,
    pub results: Vec<SearchHit>,
    pub source_status: Vec<SourceStatus>,
}

/// A catalogue skill together with the source entry that provides it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMatch {
    pub skill: SkillIndexItem,
    pub source: ManifestEntry,
    pub commit: String,
}

pub struct SearchEngine {
    indexes_dir: PathBuf,
    manifest: Arc<ManifestStore>,
    sources: Vec<Source>,
    default_source: Option<Source>,
}

impl SearchEngine {
    /// The configured sources supply the default for name lookups and let a
    /// not-yet-synced source be named in a filter.
    pub fn new(paths: &SkillixPaths, manifest: Arc<ManifestStore>, config: &Config) -> Self {
        Self {
            indexes_dir: paths.indexes_dir(),
            manifest,
            sources: config.sources.clone(),
            default_source: config.default_source().cloned(),
        }
    }

    fn load_index(&self, entry: &ManifestEntry) -> Option<SourceIndex> {
        let path = self.indexes_dir.join(&entry.index_file);
        match read_json::<SourceIndex>(&path) {
            Ok(Some(index)) => Some(index),
            Ok(None) => {
                tracing::warn!(source = %entry.id, path = %path.display(), "index file missing");
                None
            }
            Err(e) => {
                tracing::warn!(source = %entry.id, error = %e, "index file unreadable");
                None
            }
        }
    }

    /// Manifest entries plus `not_synced` placeholders for configured
    /// sources the manifest has never seen.
    fn statuses(&self, manifest: &Manifest) -> Vec<SourceStatus> {
        let mut out: Vec<SourceStatus> = manifest.sources.iter().map(SourceStatus::from).collect();
        for source in &self.sources {
            let id = parse_url(&source.url)
                .map(|i| i.canonical_id)
                .unwrap_or_else(|_| source.name.clone());
            if manifest.get(&id).is_none() {
                out.push(SourceStatus {
                    id,
                    name: source.name.clone(),
                    status: SyncStatus::NotSynced,
                    skill_count: None,
                    error: None,
                });
            }
        }
        out
    }

    /// Resolves a source name or id to its canonical id.
    fn resolve_source(&self, manifest: &Manifest, key: &str) -> Result<String> {
        if let Some(entry) = manifest.find(key) {
            return Ok(entry.id.clone());
        }
        self.sources
            .iter()
            .find(|s| s.name == key)
            .and_then(|s| parse_url(&s.url).ok())
            .map(|i| i.canonical_id)
            .ok_or_else(|| CatalogError::not_found("source", key))
    }

    pub fn search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResults> {
        let manifest = self.manifest.load()?;
        let only = match &opts.source {
            Some(key) => Some(self.resolve_source(&manifest, key)?),
            None => None,
        };

        let query_lc = query.trim().to_lowercase();
        let tags_lc: Vec<String> = opts
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let mut hits = Vec::new();
        for entry in manifest.synced() {
            if only.as_deref().is_some_and(|id| id != entry.id) {
                continue;
            }
            let Some(index) = self.load_index(entry) else {
                continue;
            };
            for skill in index.skills {
                let score = score_skill(&query_lc, &tags_lc, &skill);
                if score > 0.0 {
                    hits.push(SearchHit {
                        skill,
                        source_id: entry.id.clone(),
                        source_name: entry.name.clone(),
                        score,
                    });
                }
            }
        }

        // `sort_by` is stable, so ties keep manifest then index order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        let total = hits.len();
        hits.truncate(opts.limit);

        let source_status = self
            .statuses(&manifest)
            .into_iter()
            .filter(|s| only.as_deref().map_or(true, |id| id == s.id))
            .collect();

        Ok(SearchResults {
            query: query.to_string(),
            total,
            results: hits,
            source_status,
        })
    }

    /// Finds a skill by exact name.
    ///
    /// With `source_hint` only that source is consulted; it must be synced
    /// and hold the skill, otherwise the lookup fails with `NotFound`.
    /// Without a hint the default source is tried first, then the remaining
    /// synced sources in manifest order.
    pub fn find_by_name(&self, name: &str, source_hint: Option<&str>) -> Result<Option<CatalogMatch>> {
        let manifest = self.manifest.load()?;
        if let Some(hint) = source_hint {
            let id = self.resolve_source(&manifest, hint)?;
            let entry = manifest
                .get(&id)
                .filter(|e| e.status == SyncStatus::Synced)
                .ok_or_else(|| CatalogError::not_found("synced source", hint))?;
            return self
                .load_index(entry)
                .and_then(|index| catalog_match(entry, &index, name))
                .map(Some)
                .ok_or_else(|| {
                    CatalogError::not_found("skill", format!("{name} in source {}", entry.name))
                });
        }

        let mut order: Vec<String> = Vec::new();
        if let Some(default) = self
            .default_source
            .as_ref()
            .and_then(|s| parse_url(&s.url).ok())
        {
            order.push(default.canonical_id);
        }
        order.extend(manifest.synced().map(|e| e.id.clone()));

        let mut seen = std::collections::HashSet::new();
        for id in order {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(entry) = manifest.get(&id).filter(|e| e.status == SyncStatus::Synced) else {
                continue;
            };
            let Some(index) = self.load_index(entry) else {
                continue;
            };
            if let Some(found) = catalog_match(entry, &index, name) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

fn catalog_match(entry: &ManifestEntry, index: &SourceIndex, name: &str) -> Option<CatalogMatch> {
    index.get(name).map(|skill| CatalogMatch {
        skill: skill.clone(),
        source: entry.clone(),
        commit: index.source.commit.clone(),
    })
}

/// Case-insensitive relevance of one skill. `query_lc` and `tags_lc` are
/// already lowercased.
pub fn score_skill(query_lc: &str, tags_lc: &[String], skill: &SkillIndexItem) -> f64 {
    let skill_tags: Vec<String> = skill.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut score = if query_lc.is_empty() {
        EMPTY_QUERY_BASE
    } else {
        let name = skill.name.to_lowercase();
        let mut s = 0.0;
        if name.contains(query_lc) {
            s += NAME_HIT;
            if name == query_lc {
                s += EXACT_NAME_BONUS;
            }
        }
        if skill.description.to_lowercase().contains(query_lc) {
            s += DESCRIPTION_HIT;
        }
        if skill_tags.iter().any(|t| t.contains(query_lc)) {
            s += TAG_HIT;
        }
        s
    };
    if score == 0.0 {
        return 0.0;
    }

    if !tags_lc.is_empty() {
        if !tags_lc.iter().any(|f| skill_tags.contains(f)) {
            return 0.0;
        }
        score += TAG_FILTER_BONUS;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, description: &str, tags: &[&str]) -> SkillIndexItem {
        SkillIndexItem {
            name: name.into(),
            description: description.into(),
            version: "0.0.0".into(),
            author: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            relative_path: format!("skills/{name}"),
            has_scripts: false,
            has_references: false,
            has_assets: false,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn exact_name_scores_highest() {
        let s = item("pdf", "Work with PDF files", &["pdf"]);
        assert!(approx(score_skill("pdf", &[], &s), 0.5 + 0.3 + 0.3 + 0.2));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let s = item("PDF-Tools", "Misc", &[]);
        assert!(approx(score_skill("pdf", &[], &s), 0.5));
    }

    #[test]
    fn description_only_match() {
        let s = item("converter", "Turns images into PDF", &[]);
        assert!(approx(score_skill("pdf", &[], &s), 0.3));
    }

    #[test]
    fn no_match_scores_zero() {
        let s = item("csv", "Spreadsheets", &["data"]);
        assert_eq!(score_skill("pdf", &[], &s), 0.0);
    }

    #[test]
    fn tag_filter_excludes_or_boosts() {
        let tagged = item("pdf", "x", &["Docs"]);
        let untagged = item("pdf-two", "x", &[]);
        let filter = vec!["docs".to_string()];
        assert!(approx(score_skill("pdf", &filter, &tagged), 0.8 + 0.1));
        assert_eq!(score_skill("pdf", &filter, &untagged), 0.0);
    }

    #[test]
    fn empty_query_matches_everything() {
        let s = item("anything", "at all", &["t"]);
        assert!(approx(score_skill("", &[], &s), 0.1));
        assert!(approx(score_skill("", &["t".to_string()], &s), 0.2));
    }
}
