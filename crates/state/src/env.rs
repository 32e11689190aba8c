use serde::Serialize;
use skillix_discovery::SkillScope;
use std::path::{Path, PathBuf};

/// Directory name used for both the global root and per-project state.
pub const STATE_DIR_NAME: &str = ".skillix";

/// Returns the user's home directory.
pub fn home_dir() -> std::io::Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
    })
}

/// Global root: `SKILLIX_HOME` if set, otherwise `~/.skillix`.
pub fn global_root() -> std::io::Result<PathBuf> {
    if let Ok(custom) = std::env::var("SKILLIX_HOME") {
        if !custom.trim().is_empty() {
            return Ok(PathBuf::from(custom));
        }
    }
    Ok(home_dir()?.join(STATE_DIR_NAME))
}

/// Project root from `SKILLIX_PROJECT_ROOT`, if set.
pub fn project_root_from_env() -> Option<PathBuf> {
    std::env::var("SKILLIX_PROJECT_ROOT")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Walks up from `start` looking for a directory holding `.skillix/`.
///
/// The directory whose `.skillix` *is* the global root is never reported as
/// a project.
pub fn find_project_root(start: &Path, global_root: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            let candidate = dir.join(STATE_DIR_NAME);
            candidate.is_dir() && candidate != global_root
        })
        .map(Path::to_path_buf)
}

/// Sync TTL override from `SKILLIX_SYNC_TTL_SECS`.
pub fn env_sync_ttl_secs() -> Option<u64> {
    std::env::var("SKILLIX_SYNC_TTL_SECS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Git timeout override from `SKILLIX_GIT_TIMEOUT_SECS`.
pub fn env_git_timeout_secs() -> Option<u64> {
    std::env::var("SKILLIX_GIT_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Checks if `SKILLIX_NO_MARKET` is set to true.
pub fn env_no_market() -> bool {
    std::env::var("SKILLIX_NO_MARKET")
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Resolved on-disk layout for one invocation.
///
/// ```text
/// <global>/cache/repos/<cacheDirName>/
/// <global>/cache/indexes/sources/<cacheDirName>.json
/// <global>/cache/indexes/manifest.json
/// <global>/installed.json
/// <global>/skills/<name>/SKILL.md
/// <project>/.skillix/{installed.json,skills/,config.toml}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SkillixPaths {
    pub global_root: PathBuf,
    /// The project checkout (parent of its `.skillix` directory).
    pub project_root: Option<PathBuf>,
}

impl SkillixPaths {
    pub fn new(global_root: impl Into<PathBuf>, project_root: Option<PathBuf>) -> Self {
        Self {
            global_root: global_root.into(),
            project_root,
        }
    }

    /// Layout from the environment, with `project_root` taking precedence
    /// over `SKILLIX_PROJECT_ROOT`.
    pub fn from_env(project_root: Option<PathBuf>) -> std::io::Result<Self> {
        Ok(Self::new(
            global_root()?,
            project_root.or_else(project_root_from_env),
        ))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.global_root.join("cache")
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.cache_dir().join("repos")
    }

    pub fn repo_dir(&self, cache_dir_name: &str) -> PathBuf {
        self.repos_dir().join(cache_dir_name)
    }

    pub fn indexes_dir(&self) -> PathBuf {
        self.cache_dir().join("indexes")
    }

    /// Index path relative to [`SkillixPaths::indexes_dir`], as stored in the manifest.
    pub fn index_file_name(cache_dir_name: &str) -> String {
        format!("sources/{cache_dir_name}.json")
    }

    pub fn source_index_file(&self, cache_dir_name: &str) -> PathBuf {
        self.indexes_dir()
            .join(Self::index_file_name(cache_dir_name))
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.indexes_dir().join("manifest.json")
    }

    /// The project's `.skillix` directory, if a project is set.
    pub fn project_dir(&self) -> Option<PathBuf> {
        self.project_root
            .as_ref()
            .map(|root| root.join(STATE_DIR_NAME))
    }

    /// Base directory holding `skills/` and `installed.json` for a scope.
    pub fn scope_base(&self, scope: SkillScope) -> Option<PathBuf> {
        match scope {
            SkillScope::Global => Some(self.global_root.clone()),
            SkillScope::Project => self.project_dir(),
        }
    }

    pub fn skills_dir(&self, scope: SkillScope) -> Option<PathBuf> {
        self.scope_base(scope).map(|base| base.join("skills"))
    }

    pub fn installed_file(&self, scope: SkillScope) -> Option<PathBuf> {
        self.scope_base(scope).map(|base| base.join("installed.json"))
    }

    pub fn global_config_file(&self) -> PathBuf {
        self.global_root.join("config.toml")
    }

    pub fn project_config_file(&self) -> Option<PathBuf> {
        self.project_dir().map(|dir| dir.join("config.toml"))
    }
}
