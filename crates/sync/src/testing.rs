//! An in-process [`GitClient`] that "clones" from local directories.
//!
//! Enabled for downstream tests with the `test-support` feature.

use crate::error::{CatalogError, Result};
use crate::fsutil::copy_dir_all;
use crate::git::GitClient;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct Remote {
    dir: PathBuf,
    commit: String,
    diverged: bool,
}

/// Remote URLs map to local directories; the "commit" of each remote is a
/// label the test controls.
#[derive(Debug, Default)]
pub struct FakeGit {
    remotes: Mutex<HashMap<String, Remote>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_remote(&self, url: &str, dir: impl Into<PathBuf>, commit: &str) {
        self.remotes.lock().insert(
            url.to_string(),
            Remote {
                dir: dir.into(),
                commit: commit.to_string(),
                diverged: false,
            },
        );
    }

    /// Moves the remote to a new commit; its directory is re-read on fast-forward.
    pub fn set_commit(&self, url: &str, commit: &str) {
        if let Some(remote) = self.remotes.lock().get_mut(url) {
            remote.commit = commit.to_string();
        }
    }

    /// Makes later fast-forwards from `url` fail.
    pub fn diverge(&self, url: &str) {
        if let Some(remote) = self.remotes.lock().get_mut(url) {
            remote.diverged = true;
        }
    }

    /// Git subcommands invoked so far, e.g. `["clone", "sparse-checkout", "rev-parse"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, command: &str) {
        self.calls.lock().push(command.to_string());
    }

    fn remote(&self, url: &str, command: &str) -> Result<Remote> {
        self.remotes
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::Git {
                command: command.to_string(),
                message: format!("repository '{url}' not found"),
            })
    }

    fn origin(repo: &Path, command: &str) -> Result<String> {
        fs::read_to_string(repo.join(".git/origin"))
            .map(|s| s.trim().to_string())
            .map_err(|_| CatalogError::Git {
                command: command.to_string(),
                message: "not a git repository".to_string(),
            })
    }

    fn clear_worktree(repo: &Path, keep: &[String]) -> Result<()> {
        for entry in fs::read_dir(repo)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == ".git" || keep.iter().any(|k| k == &name) {
                continue;
            }
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn checkout(repo: &Path, remote: &Remote) -> Result<()> {
        Self::clear_worktree(repo, &[])?;
        copy_dir_all(&remote.dir, repo)?;
        if let Ok(paths) = fs::read_to_string(repo.join(".git/sparse")) {
            let keep: Vec<String> = paths.lines().map(str::to_string).collect();
            Self::clear_worktree(repo, &keep)?;
        }
        fs::write(repo.join(".git/HEAD"), &remote.commit)?;
        Ok(())
    }
}

impl GitClient for FakeGit {
    fn clone_sparse(&self, url: &str, _branch: &str, _depth: u32, dest: &Path) -> Result<()> {
        self.record("clone");
        let remote = self.remote(url, "clone")?;
        fs::create_dir_all(dest.join(".git"))?;
        fs::write(dest.join(".git/origin"), url)?;
        Self::checkout(dest, &remote)
    }

    fn sparse_checkout(&self, repo: &Path, paths: &[String]) -> Result<()> {
        self.record("sparse-checkout");
        fs::write(repo.join(".git/sparse"), paths.join("\n"))?;
        Self::clear_worktree(repo, paths)
    }

    fn fetch(&self, repo: &Path, _branch: &str) -> Result<()> {
        self.record("fetch");
        let url = Self::origin(repo, "fetch")?;
        let remote = self.remote(&url, "fetch")?;
        fs::write(repo.join(".git/FETCH_HEAD"), &remote.commit)?;
        Ok(())
    }

    fn fast_forward(&self, repo: &Path) -> Result<()> {
        self.record("merge");
        let url = Self::origin(repo, "merge")?;
        let remote = self.remote(&url, "merge")?;
        if remote.diverged {
            return Err(CatalogError::Git {
                command: "merge".to_string(),
                message: "fatal: Not possible to fast-forward, aborting.".to_string(),
            });
        }
        Self::checkout(repo, &remote)
    }

    fn rev_parse(&self, repo: &Path, rev: &str) -> Result<String> {
        self.record("rev-parse");
        if rev != "HEAD" && rev != "FETCH_HEAD" {
            return Err(CatalogError::Git {
                command: "rev-parse".to_string(),
                message: format!("unknown revision '{rev}'"),
            });
        }
        fs::read_to_string(repo.join(".git").join(rev))
            .map(|s| s.trim().to_string())
            .map_err(|_| CatalogError::Git {
                command: "rev-parse".to_string(),
                message: format!("ambiguous argument '{rev}'"),
            })
    }
}
