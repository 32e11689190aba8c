//! The shared manifest of every source's sync state.

use crate::error::Result;
use crate::indexer::INDEX_VERSION;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use skillix_state::{read_json_or_default, write_json_atomic};
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    NotSynced,
    Synced,
    Error,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::NotSynced => "not_synced",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub name: String,
    pub url: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub synced_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_count: Option<usize>,
    #[serde(default)]
    pub status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Index path relative to `cache/indexes/`.
    pub index_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub sources: Vec<ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION.to_string(),
            updated_at: OffsetDateTime::UNIX_EPOCH,
            sources: Vec::new(),
        }
    }
}

impl Manifest {
    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.sources.iter().find(|e| e.id == id)
    }

    /// Finds an entry by canonical id or source name.
    pub fn find(&self, key: &str) -> Option<&ManifestEntry> {
        self.get(key)
            .or_else(|| self.sources.iter().find(|e| e.name == key))
    }

    /// Replaces the entry with the same id in place, or appends it.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.sources.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.sources.push(entry),
        }
    }

    pub fn synced(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.sources
            .iter()
            .filter(|e| e.status == SyncStatus::Synced)
    }
}

/// Whether a source is due for sync: never synced, last attempt failed, or
/// older than `ttl`.
pub fn needs_sync(entry: Option<&ManifestEntry>, ttl: Duration, now: OffsetDateTime) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    if entry.status != SyncStatus::Synced {
        return true;
    }
    match entry.synced_at {
        Some(at) => now - at > ttl,
        None => true,
    }
}

/// Serializes read-modify-write access to `manifest.json`.
///
/// Every writer goes through [`ManifestStore::update`]; the in-process lock
/// keeps parallel per-source syncs from losing each other's entries.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current manifest; an absent file reads as empty.
    pub fn load(&self) -> Result<Manifest> {
        let _guard = self.lock.lock();
        Ok(read_json_or_default(&self.path)?)
    }

    pub fn entry(&self, id: &str) -> Result<Option<ManifestEntry>> {
        Ok(self.load()?.get(id).cloned())
    }

    /// Loads, applies `f`, stamps `updatedAt` and writes back atomically.
    pub fn update<R>(&self, f: impl FnOnce(&mut Manifest) -> R) -> Result<R> {
        let _guard = self.lock.lock();
        let mut manifest: Manifest = read_json_or_default(&self.path)?;
        let out = f(&mut manifest);
        manifest.version = INDEX_VERSION.to_string();
        manifest.updated_at = OffsetDateTime::now_utc();
        write_json_atomic(&self.path, &manifest)?;
        Ok(out)
    }

    pub fn upsert(&self, entry: ManifestEntry) -> Result<()> {
        self.update(|m| m.upsert(entry))
    }
}
