//! Per-source sparse clones under `cache/repos/`.

use crate::error::{CatalogError, Result};
use crate::git::GitClient;
use crate::locator::SourceIdentity;
use serde::Serialize;
use skillix_state::Source;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RepoSyncOptions {
    pub depth: u32,
    pub sparse_paths: Vec<String>,
}

impl Default for RepoSyncOptions {
    fn default() -> Self {
        Self {
            depth: 1,
            sparse_paths: vec!["skills".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSyncOutcome {
    pub commit: String,
    pub has_updates: bool,
    pub cloned: bool,
    pub path: PathBuf,
}

/// Owns `cache/repos/`. Directories under it can be deleted at any time and
/// will be re-cloned on the next sync.
pub struct RepoCache {
    repos_dir: PathBuf,
    git: Arc<dyn GitClient>,
}

impl RepoCache {
    pub fn new(repos_dir: impl Into<PathBuf>, git: Arc<dyn GitClient>) -> Self {
        Self {
            repos_dir: repos_dir.into(),
            git,
        }
    }

    pub fn repo_dir(&self, identity: &SourceIdentity) -> PathBuf {
        self.repos_dir.join(&identity.cache_dir_name)
    }

    /// Clones the source if it has no cached checkout, otherwise fetches and
    /// fast-forwards it when the remote moved.
    pub fn sync(
        &self,
        source: &Source,
        identity: &SourceIdentity,
        opts: &RepoSyncOptions,
    ) -> Result<RepoSyncOutcome> {
        let dir = self.repo_dir(identity);
        if dir.join(".git").exists() {
            self.update(source, &dir)
        } else {
            self.clone_fresh(source, &dir, opts)
        }
    }

    /// Any failure removes `dir` again, so a half-finished clone is never
    /// mistaken for a checkout on the next sync.
    fn clone_fresh(&self, source: &Source, dir: &Path, opts: &RepoSyncOptions) -> Result<RepoSyncOutcome> {
        if dir.exists() {
            tracing::debug!(path = %dir.display(), "removing partial clone");
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(&self.repos_dir)?;

        tracing::info!(source = %source.name, url = %source.url, branch = %source.branch, "cloning");
        let cloned = self
            .git
            .clone_sparse(&source.url, &source.branch, opts.depth, dir)
            .and_then(|()| self.git.sparse_checkout(dir, &opts.sparse_paths))
            .and_then(|()| self.git.rev_parse(dir, "HEAD"));
        let commit = match cloned {
            Ok(commit) => commit,
            Err(err) => {
                if dir.exists() {
                    if let Err(e) = fs::remove_dir_all(dir) {
                        tracing::warn!(path = %dir.display(), error = %e, "failed to remove partial clone");
                    }
                }
                return Err(err);
            }
        };

        Ok(RepoSyncOutcome {
            commit,
            has_updates: true,
            cloned: true,
            path: dir.to_path_buf(),
        })
    }

    fn update(&self, source: &Source, dir: &Path) -> Result<RepoSyncOutcome> {
        self.git.fetch(dir, &source.branch)?;
        let local = self.git.rev_parse(dir, "HEAD")?;
        let remote = self.git.rev_parse(dir, "FETCH_HEAD")?;

        if local == remote {
            tracing::debug!(source = %source.name, commit = %local, "already up to date");
            return Ok(RepoSyncOutcome {
                commit: local,
                has_updates: false,
                cloned: false,
                path: dir.to_path_buf(),
            });
        }

        tracing::info!(source = %source.name, from = %local, to = %remote, "fast-forwarding");
        self.git
            .fast_forward(dir)
            .map_err(|err| match err {
                CatalogError::Git { command, message } => CatalogError::Git {
                    command,
                    message: format!(
                        "{message} (history diverged; delete {} to re-clone)",
                        dir.display()
                    ),
                },
                other => other,
            })?;
        let commit = self.git.rev_parse(dir, "HEAD")?;

        Ok(RepoSyncOutcome {
            commit,
            has_updates: true,
            cloned: false,
            path: dir.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGitClient;
    use crate::locator::parse_url;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn source() -> (Source, SourceIdentity) {
        let source = Source::new("team", "https://github.com/org/skills");
        let identity = parse_url(&source.url).unwrap();
        (source, identity)
    }

    #[test]
    fn fresh_clone_runs_clone_then_sparse_checkout() {
        let tmp = tempfile::tempdir().unwrap();
        let (source, identity) = source();
        let partial = tmp.path().join("github.com_org_skills");
        fs::create_dir_all(&partial).unwrap();
        fs::write(partial.join("leftover"), "x").unwrap();

        let mut git = MockGitClient::new();
        let expected_dest = partial.clone();
        git.expect_clone_sparse()
            .withf(move |url, branch, depth, dest| {
                url == "https://github.com/org/skills"
                    && branch == "main"
                    && *depth == 1
                    && dest == expected_dest.as_path()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        git.expect_sparse_checkout()
            .withf(|_, paths| paths == ["skills".to_string()])
            .times(1)
            .returning(|_, _| Ok(()));
        git.expect_rev_parse()
            .withf(|_, rev| rev == "HEAD")
            .returning(|_, _| Ok("abc123".into()));

        let cache = RepoCache::new(tmp.path(), Arc::new(git));
        let outcome = cache
            .sync(&source, &identity, &RepoSyncOptions::default())
            .unwrap();
        assert_eq!(outcome.commit, "abc123");
        assert!(outcome.cloned);
        assert!(outcome.has_updates);
        assert!(!partial.join("leftover").exists());
    }

    #[test]
    fn unchanged_remote_skips_fast_forward() {
        let tmp = tempfile::tempdir().unwrap();
        let (source, identity) = source();
        fs::create_dir_all(tmp.path().join("github.com_org_skills/.git")).unwrap();

        let mut git = MockGitClient::new();
        git.expect_fetch().times(1).returning(|_, _| Ok(()));
        git.expect_rev_parse().returning(|_, _| Ok("same".into()));
        git.expect_fast_forward().never();

        let cache = RepoCache::new(tmp.path(), Arc::new(git));
        let outcome = cache
            .sync(&source, &identity, &RepoSyncOptions::default())
            .unwrap();
        assert!(!outcome.has_updates);
        assert!(!outcome.cloned);
        assert_eq!(outcome.commit, "same");
    }

    #[test]
    fn diverged_history_is_git_error_with_hint() {
        let tmp = tempfile::tempdir().unwrap();
        let (source, identity) = source();
        fs::create_dir_all(tmp.path().join("github.com_org_skills/.git")).unwrap();

        let mut git = MockGitClient::new();
        git.expect_fetch().returning(|_, _| Ok(()));
        git.expect_rev_parse()
            .returning(|_, rev| Ok(if rev == "HEAD" { "old" } else { "new" }.into()));
        git.expect_fast_forward().times(1).returning(|_| {
            Err(CatalogError::Git {
                command: "merge".into(),
                message: "Not possible to fast-forward".into(),
            })
        });

        let cache = RepoCache::new(tmp.path(), Arc::new(git));
        let err = cache
            .sync(&source, &identity, &RepoSyncOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "GIT_ERROR");
        assert!(err.to_string().contains("re-clone"));
    }

    #[test]
    fn failed_sparse_checkout_removes_clone_and_next_sync_reclones() {
        let tmp = tempfile::tempdir().unwrap();
        let (source, identity) = source();
        let dir = tmp.path().join("github.com_org_skills");

        let mut git = MockGitClient::new();
        git.expect_clone_sparse()
            .times(2)
            .returning(|_, _, _, dest| Ok(fs::create_dir_all(dest.join(".git"))?));
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        git.expect_sparse_checkout().times(2).returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CatalogError::GitTimeout {
                    command: "sparse-checkout".into(),
                    seconds: 1,
                })
            } else {
                Ok(())
            }
        });
        git.expect_rev_parse().returning(|_, _| Ok("abc123".into()));
        git.expect_fetch().never();

        let cache = RepoCache::new(tmp.path(), Arc::new(git));
        let err = cache
            .sync(&source, &identity, &RepoSyncOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "GIT_TIMEOUT");
        assert!(!dir.exists());

        let outcome = cache
            .sync(&source, &identity, &RepoSyncOptions::default())
            .unwrap();
        assert!(outcome.cloned);
        assert_eq!(outcome.commit, "abc123");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn timeout_is_not_retried() {
        let tmp = tempfile::tempdir().unwrap();
        let (source, identity) = source();

        let mut git = MockGitClient::new();
        git.expect_clone_sparse().times(1).returning(|_, _, _, _| {
            Err(CatalogError::GitTimeout {
                command: "clone".into(),
                seconds: 1,
            })
        });
        git.expect_sparse_checkout().never();

        let cache = RepoCache::new(tmp.path(), Arc::new(git));
        let err = cache
            .sync(&source, &identity, &RepoSyncOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "GIT_TIMEOUT");
    }
}
