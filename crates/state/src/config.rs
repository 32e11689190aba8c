//! Configuration file support for skillix.
//!
//! Settings are read from `~/.skillix/config.toml` and
//! `<project>/.skillix/config.toml` with the following precedence:
//! CLI arguments > environment variables > project file > global file >
//! built-in defaults.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [[sources]]
//! name = "anthropic"
//! url = "https://github.com/anthropics/skills"
//! branch = "main"
//! default = true
//!
//! [sync]
//! ttl_seconds = 86400
//! timeout_seconds = 120
//! depth = 1
//! parallel = false
//!
//! [dispatch]
//! enable_market_search = true
//! match_threshold = 0.5
//! confidence_threshold = 0.7
//! market_limit = 5
//! # lexicon_path = "/path/to/domains.json"
//!
//! [search]
//! limit = 20
//! ```
//!
//! Each file is parsed into a [`RawConfig`] whose fields are all optional;
//! [`Config::resolve`] fills them in one field at a time.

use crate::env::{env_git_timeout_secs, env_no_market, env_sync_ttl_secs, SkillixPaths};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_NAME: &str = "anthropic";
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/anthropics/skills";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_SYNC_TTL_SECS: u64 = 86_400;
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CLONE_DEPTH: u32 = 1;
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MARKET_LIMIT: usize = 5;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A configured remote catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub name: String,
    pub url: String,
    pub branch: String,
    pub is_default: bool,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            branch: DEFAULT_BRANCH.to_string(),
            is_default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// The built-in catalogue used when no file configures `[[sources]]`.
pub fn default_source() -> Source {
    Source::new(DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL).as_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSettings {
    pub ttl_seconds: u64,
    pub timeout_seconds: u64,
    pub depth: u32,
    pub parallel: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SYNC_TTL_SECS,
            timeout_seconds: DEFAULT_GIT_TIMEOUT_SECS,
            depth: DEFAULT_CLONE_DEPTH,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSettings {
    pub enable_market_search: bool,
    pub match_threshold: f64,
    pub confidence_threshold: f64,
    pub market_limit: usize,
    pub lexicon_path: Option<PathBuf>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            enable_market_search: true,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            market_limit: DEFAULT_MARKET_LIMIT,
            lexicon_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSettings {
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub sources: Vec<Source>,
    pub sync: SyncSettings,
    pub dispatch: DispatchSettings,
    pub search: SearchSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![default_source()],
            sync: SyncSettings::default(),
            dispatch: DispatchSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

/// One `[[sources]]` table as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    pub name: String,
    pub url: String,
    pub branch: Option<String>,
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSync {
    pub ttl_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub depth: Option<u32>,
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDispatch {
    pub enable_market_search: Option<bool>,
    pub match_threshold: Option<f64>,
    pub confidence_threshold: Option<f64>,
    pub market_limit: Option<usize>,
    pub lexicon_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearch {
    pub limit: Option<usize>,
}

/// A single config file with every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub sources: Option<Vec<RawSource>>,
    #[serde(default)]
    pub sync: RawSync,
    #[serde(default)]
    pub dispatch: RawDispatch,
    #[serde(default)]
    pub search: RawSearch,
}

impl RawConfig {
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a config file. Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(Some(config))
    }
}

fn pick<T: Clone>(project: Option<&T>, global: Option<&T>, fallback: T) -> T {
    project.or(global).cloned().unwrap_or(fallback)
}

impl Config {
    /// Merges a global and a project file over the built-in defaults.
    ///
    /// Scalars: project wins, then global, then default. Sources: project
    /// entries first, then global entries whose name the project does not
    /// already use. When neither file has `[[sources]]` the built-in
    /// default source is used.
    pub fn resolve(global: Option<&RawConfig>, project: Option<&RawConfig>) -> Self {
        let defaults_sync = SyncSettings::default();
        let defaults_dispatch = DispatchSettings::default();
        let defaults_search = SearchSettings::default();

        let gs = global.map(|g| &g.sync);
        let ps = project.map(|p| &p.sync);
        let sync = SyncSettings {
            ttl_seconds: pick(
                ps.and_then(|s| s.ttl_seconds.as_ref()),
                gs.and_then(|s| s.ttl_seconds.as_ref()),
                defaults_sync.ttl_seconds,
            ),
            timeout_seconds: pick(
                ps.and_then(|s| s.timeout_seconds.as_ref()),
                gs.and_then(|s| s.timeout_seconds.as_ref()),
                defaults_sync.timeout_seconds,
            ),
            depth: pick(
                ps.and_then(|s| s.depth.as_ref()),
                gs.and_then(|s| s.depth.as_ref()),
                defaults_sync.depth,
            ),
            parallel: pick(
                ps.and_then(|s| s.parallel.as_ref()),
                gs.and_then(|s| s.parallel.as_ref()),
                defaults_sync.parallel,
            ),
        };

        let gd = global.map(|g| &g.dispatch);
        let pd = project.map(|p| &p.dispatch);
        let dispatch = DispatchSettings {
            enable_market_search: pick(
                pd.and_then(|d| d.enable_market_search.as_ref()),
                gd.and_then(|d| d.enable_market_search.as_ref()),
                defaults_dispatch.enable_market_search,
            ),
            match_threshold: pick(
                pd.and_then(|d| d.match_threshold.as_ref()),
                gd.and_then(|d| d.match_threshold.as_ref()),
                defaults_dispatch.match_threshold,
            ),
            confidence_threshold: pick(
                pd.and_then(|d| d.confidence_threshold.as_ref()),
                gd.and_then(|d| d.confidence_threshold.as_ref()),
                defaults_dispatch.confidence_threshold,
            ),
            market_limit: pick(
                pd.and_then(|d| d.market_limit.as_ref()),
                gd.and_then(|d| d.market_limit.as_ref()),
                defaults_dispatch.market_limit,
            ),
            lexicon_path: pd
                .and_then(|d| d.lexicon_path.clone())
                .or_else(|| gd.and_then(|d| d.lexicon_path.clone())),
        };

        let search = SearchSettings {
            limit: pick(
                project.and_then(|p| p.search.limit.as_ref()),
                global.and_then(|g| g.search.limit.as_ref()),
                defaults_search.limit,
            ),
        };

        Self {
            sources: merge_sources(
                global.and_then(|g| g.sources.as_deref()),
                project.and_then(|p| p.sources.as_deref()),
            ),
            sync,
            dispatch,
            search,
        }
    }

    /// Applies `SKILLIX_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(ttl) = env_sync_ttl_secs() {
            self.sync.ttl_seconds = ttl;
        }
        if let Some(timeout) = env_git_timeout_secs() {
            self.sync.timeout_seconds = timeout;
        }
        if env_no_market() {
            self.dispatch.enable_market_search = false;
        }
    }

    /// Checks value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, value) in [
            ("dispatch.match_threshold", self.dispatch.match_threshold),
            (
                "dispatch.confidence_threshold",
                self.dispatch.confidence_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{label} must be within 0..=1, got {value}"
                )));
            }
        }
        if self.sync.depth == 0 {
            return Err(ConfigError::Invalid("sync.depth must be at least 1".into()));
        }
        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::Invalid("source name must not be empty".into()));
            }
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
        }
        Ok(())
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// The source marked `default`, else the first configured one.
    pub fn default_source(&self) -> Option<&Source> {
        self.sources
            .iter()
            .find(|s| s.is_default)
            .or_else(|| self.sources.first())
    }
}

fn merge_sources(global: Option<&[RawSource]>, project: Option<&[RawSource]>) -> Vec<Source> {
    if global.is_none() && project.is_none() {
        return vec![default_source()];
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for raw in project
        .unwrap_or_default()
        .iter()
        .chain(global.unwrap_or_default())
    {
        if !seen.insert(raw.name.clone()) {
            tracing::debug!(name = %raw.name, "source shadowed by project configuration");
            continue;
        }
        out.push(Source {
            name: raw.name.clone(),
            url: raw.url.clone(),
            branch: raw
                .branch
                .clone()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            is_default: raw.default.unwrap_or(false),
        });
    }
    out
}

/// Loads both config files for `paths`, merges them and applies env overrides.
pub fn load_config(paths: &SkillixPaths) -> Result<Config, ConfigError> {
    let global = RawConfig::load(&paths.global_config_file())?;
    let project = match paths.project_config_file() {
        Some(path) => RawConfig::load(&path)?,
        None => None,
    };
    let mut config = Config::resolve(global.as_ref(), project.as_ref());
    config.apply_env();
    config.validate()?;
    Ok(config)
}
