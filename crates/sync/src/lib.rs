//! Git-backed skill catalogue synchronization, search and install.
//!
//! The write path is `locator -> repo_cache -> indexer -> manifest`, driven
//! by [`SyncEngine`]. [`SearchEngine`] reads the manifest and per-source
//! indexes; [`InstallManager`] copies cached skills into local storage.
//!
//! # Examples
//!
//! ```
//! use skillix_sync::parse_url;
//!
//! let id = parse_url("git@github.com:anthropics/skills.git").unwrap();
//! assert_eq!(id.canonical_id, "github.com/anthropics/skills");
//! assert_eq!(id.cache_dir_name, "github.com_anthropics_skills");
//! ```

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
mod fsutil;
pub mod git;
pub mod indexer;
pub mod install;
pub mod locator;
pub mod manifest;
pub mod repo_cache;
pub mod search;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use engine::{SkippedSource, SyncEngine, SyncFailure, SyncReport, SyncedSource};
pub use error::{CatalogError, Result};
pub use fsutil::dir_size;
pub use git::{GitClient, ProcessGit, DEFAULT_GIT_TIMEOUT};
pub use indexer::{build_index, IndexedSource, SkillIndexItem, SourceIndex, INDEX_VERSION};
pub use install::{
    validate_skill_name, InstallManager, InstallOptions, InstallOutcome, InstalledRecord,
    InstalledSkill, ScopedInstall, UninstallOutcome, UninstallScope,
};
pub use locator::{from_dir_name, parse_url, to_dir_name, SourceIdentity};
pub use manifest::{needs_sync, Manifest, ManifestEntry, ManifestStore, SyncStatus};
pub use repo_cache::{RepoCache, RepoSyncOptions, RepoSyncOutcome};
pub use search::{
    score_skill, CatalogMatch, SearchEngine, SearchHit, SearchOptions, SearchResults,
    SourceStatus,
};
