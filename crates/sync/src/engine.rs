//! Orchestrates repo cache, indexer and manifest for one or all sources.

use crate::error::{CatalogError, Result};
use crate::git::GitClient;
use crate::indexer::{build_index, SourceIndex};
use crate::locator::{parse_url, SourceIdentity};
use crate::manifest::{needs_sync, ManifestEntry, ManifestStore, SyncStatus};
use crate::repo_cache::{RepoCache, RepoSyncOptions};
use rayon::prelude::*;
use serde::Serialize;
use skillix_state::{read_json, write_json_atomic, SkillixPaths, Source, SyncSettings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedSource {
    pub id: String,
    pub name: String,
    pub commit: String,
    pub skill_count: usize,
    pub has_updates: bool,
    pub cloned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub id: String,
    pub name: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSource {
    pub id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: Vec<SyncedSource>,
    pub failed: Vec<SyncFailure>,
    pub skipped: Vec<SkippedSource>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SyncEngine {
    cache: RepoCache,
    indexes_dir: PathBuf,
    manifest: Arc<ManifestStore>,
    settings: SyncSettings,
}

impl SyncEngine {
    pub fn new(
        paths: &SkillixPaths,
        git: Arc<dyn GitClient>,
        manifest: Arc<ManifestStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            cache: RepoCache::new(paths.repos_dir(), git),
            indexes_dir: paths.indexes_dir(),
            manifest,
            settings,
        }
    }

    pub fn manifest(&self) -> &Arc<ManifestStore> {
        &self.manifest
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.settings.ttl_seconds)
    }

    fn index_path(&self, identity: &SourceIdentity) -> PathBuf {
        self.indexes_dir
            .join(SkillixPaths::index_file_name(&identity.cache_dir_name))
    }

    /// Whether the source with canonical id `id` is due for sync.
    pub fn needs_sync(&self, id: &str) -> Result<bool> {
        let entry = self.manifest.entry(id)?;
        Ok(needs_sync(entry.as_ref(), self.ttl(), OffsetDateTime::now_utc()))
    }

    /// Syncs one source and records the outcome in the manifest.
    ///
    /// On failure the manifest entry is set to `error` (keeping the last good
    /// commit) before the error is returned. A URL that cannot be parsed has
    /// no id and leaves the manifest untouched.
    pub fn sync_one(&self, source: &Source) -> Result<SyncedSource> {
        let identity = parse_url(&source.url)?;
        match self.try_sync(source, &identity) {
            Ok(synced) => Ok(synced),
            Err(err) => {
                tracing::warn!(source = %identity.canonical_id, code = err.code(), error = %err, "sync failed");
                let message = err.to_string();
                let entry = self.entry_template(source, &identity);
                self.manifest.update(|m| {
                    let mut next = m.get(&identity.canonical_id).cloned().unwrap_or(entry);
                    next.name = source.name.clone();
                    next.url = source.url.clone();
                    next.branch = source.branch.clone();
                    next.status = SyncStatus::Error;
                    next.error = Some(message);
                    m.upsert(next);
                })?;
                Err(err)
            }
        }
    }

    fn try_sync(&self, source: &Source, identity: &SourceIdentity) -> Result<SyncedSource> {
        let opts = RepoSyncOptions {
            depth: self.settings.depth,
            ..RepoSyncOptions::default()
        };
        let outcome = self.cache.sync(source, identity, &opts)?;
        let index_path = self.index_path(identity);

        let existing: Option<SourceIndex> = if outcome.has_updates {
            None
        } else {
            match read_json(&index_path) {
                Ok(index) => index,
                Err(e) => {
                    tracing::debug!(path = %index_path.display(), error = %e, "unreadable index, rebuilding");
                    None
                }
            }
        };

        let skill_count = match existing {
            Some(index) => index.skills.len(),
            None => {
                let index = match build_index(source, identity, &outcome.path, &outcome.commit) {
                    Ok(index) => index,
                    Err(CatalogError::MissingSkillsDir { path }) => {
                        tracing::warn!(
                            source = %identity.canonical_id,
                            path = %path.display(),
                            "repository has no skills/ directory; indexing zero skills"
                        );
                        SourceIndex::empty(source, identity, &outcome.commit)
                    }
                    Err(e) => return Err(e),
                };
                write_json_atomic(&index_path, &index)?;
                index.skills.len()
            }
        };

        let mut entry = self.entry_template(source, identity);
        entry.commit = Some(outcome.commit.clone());
        entry.synced_at = Some(OffsetDateTime::now_utc());
        entry.skill_count = Some(skill_count);
        entry.status = SyncStatus::Synced;
        self.manifest.upsert(entry)?;

        tracing::info!(
            source = %identity.canonical_id,
            commit = %outcome.commit,
            count = skill_count,
            updated = outcome.has_updates,
            "source synced"
        );
        Ok(SyncedSource {
            id: identity.canonical_id.clone(),
            name: source.name.clone(),
            commit: outcome.commit,
            skill_count,
            has_updates: outcome.has_updates,
            cloned: outcome.cloned,
        })
    }

    fn entry_template(&self, source: &Source, identity: &SourceIdentity) -> ManifestEntry {
        ManifestEntry {
            id: identity.canonical_id.clone(),
            name: source.name.clone(),
            url: source.url.clone(),
            branch: source.branch.clone(),
            commit: None,
            synced_at: None,
            skill_count: None,
            status: SyncStatus::NotSynced,
            error: None,
            index_file: SkillixPaths::index_file_name(&identity.cache_dir_name),
        }
    }

    /// Syncs every source, partitioning outcomes. One failure never stops the rest.
    pub fn sync_all(&self, sources: &[Source], force: bool) -> SyncReport {
        let mut report = SyncReport::default();
        let mut due = Vec::new();

        for source in sources {
            if !force {
                if let Ok(identity) = parse_url(&source.url) {
                    match self.needs_sync(&identity.canonical_id) {
                        Ok(false) => {
                            report.skipped.push(SkippedSource {
                                id: identity.canonical_id,
                                name: source.name.clone(),
                                reason: "synced within ttl".to_string(),
                            });
                            continue;
                        }
                        Ok(true) => {}
                        Err(e) => {
                            tracing::debug!(source = %source.name, error = %e, "manifest unreadable, syncing");
                        }
                    }
                }
            }
            due.push(source);
        }

        let outcomes: Vec<(&Source, Result<SyncedSource>)> = if self.settings.parallel {
            due.par_iter().map(|s| (*s, self.sync_one(s))).collect()
        } else {
            due.iter().map(|s| (*s, self.sync_one(s))).collect()
        };

        for (source, outcome) in outcomes {
            match outcome {
                Ok(synced) => report.synced.push(synced),
                Err(err) => report.failed.push(SyncFailure {
                    id: parse_url(&source.url)
                        .map(|i| i.canonical_id)
                        .unwrap_or_else(|_| source.name.clone()),
                    name: source.name.clone(),
                    code: err.code().to_string(),
                    message: err.to_string(),
                }),
            }
        }
        report
    }
}
