//! Git access behind a trait so sync can run against fakes and mocks.

use crate::error::{CatalogError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// The git operations the repository cache needs.
#[cfg_attr(test, automock)]
pub trait GitClient: Send + Sync {
    /// Shallow, single-branch, blob-filtered sparse clone of `url` into `dest`.
    fn clone_sparse(&self, url: &str, branch: &str, depth: u32, dest: &Path) -> Result<()>;

    /// Restricts the working tree of `repo` to `paths`.
    fn sparse_checkout(&self, repo: &Path, paths: &[String]) -> Result<()>;

    /// Fetches `branch` from `origin` into `FETCH_HEAD`.
    ///
    /// No `--depth` is passed: new commits must stay connected to the local
    /// shallow history or they cannot be fast-forwarded onto.
    fn fetch(&self, repo: &Path, branch: &str) -> Result<()>;

    /// Moves `HEAD` to `FETCH_HEAD` if that is a fast-forward; fails otherwise.
    fn fast_forward(&self, repo: &Path) -> Result<()>;

    /// Resolves `rev` (e.g. `HEAD`, `FETCH_HEAD`) to a commit id.
    fn rev_parse(&self, repo: &Path, rev: &str) -> Result<String>;
}

pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the `git` binary, each invocation bounded by a timeout.
#[derive(Debug, Clone)]
pub struct ProcessGit {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for ProcessGit {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_TIMEOUT)
    }
}

impl ProcessGit {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binary: PathBuf::from("git"),
            timeout,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn run(&self, cwd: Option<&Path>, args: &[&str]) -> Result<String> {
        let command = args.first().copied().unwrap_or("git").to_string();
        tracing::debug!(command = %args.join(" "), cwd = ?cwd, "running git");

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let output = rt.block_on(async {
            let mut cmd = tokio::process::Command::new(&self.binary);
            cmd.args(args)
                .env("GIT_TERMINAL_PROMPT", "0")
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if let Some(dir) = cwd {
                cmd.current_dir(dir);
            }
            tokio::time::timeout(self.timeout, cmd.output()).await
        });

        match output {
            Err(_) => Err(CatalogError::GitTimeout {
                command,
                seconds: self.timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(CatalogError::Git {
                command,
                message: format!("failed to spawn {}: {e}", self.binary.display()),
            }),
            Ok(Ok(out)) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                Err(CatalogError::Git {
                    command,
                    message: if stderr.is_empty() {
                        format!("exited with {}", out.status)
                    } else {
                        stderr
                    },
                })
            }
            Ok(Ok(out)) => Ok(String::from_utf8_lossy(&out.stdout).trim().to_string()),
        }
    }
}

impl GitClient for ProcessGit {
    fn clone_sparse(&self, url: &str, branch: &str, depth: u32, dest: &Path) -> Result<()> {
        let depth = depth.to_string();
        let dest = dest.to_string_lossy();
        self.run(
            None,
            &[
                "clone",
                "--depth",
                &depth,
                "--single-branch",
                "--branch",
                branch,
                "--filter=blob:none",
                "--sparse",
                url,
                &dest,
            ],
        )
        .map(drop)
    }

    fn sparse_checkout(&self, repo: &Path, paths: &[String]) -> Result<()> {
        let mut args = vec!["sparse-checkout", "set"];
        args.extend(paths.iter().map(String::as_str));
        self.run(Some(repo), &args).map(drop)
    }

    fn fetch(&self, repo: &Path, branch: &str) -> Result<()> {
        self.run(Some(repo), &["fetch", "origin", branch]).map(drop)
    }

    fn fast_forward(&self, repo: &Path) -> Result<()> {
        self.run(Some(repo), &["merge", "--ff-only", "FETCH_HEAD"])
            .map(drop)
    }

    fn rev_parse(&self, repo: &Path, rev: &str) -> Result<String> {
        self.run(Some(repo), &["rev-parse", rev])
    }
}
