//! The [`Skillix`] facade: one object wiring config, paths and engines.

use crate::status::{SourceReport, StatusReport, StatusSummary};
use anyhow::{Context, Result};
use serde::Serialize;
use skillix_discovery::{default_roots, SkillScope};
use skillix_intelligence::{
    AnalyzeRequest, CatalogMarket, Collector, DispatchAnalyzer, DispatchResult, DomainLexicon,
};
use skillix_state::{find_project_root, load_config, Config, SkillixPaths, Source};
use skillix_sync::{
    dir_size, parse_url, CatalogError, CatalogMatch, GitClient, InstallManager, InstallOptions,
    InstallOutcome, ManifestStore, ProcessGit, ScopedInstall, SearchEngine, SearchOptions,
    SearchResults, SyncEngine, SyncReport, UninstallOutcome, UninstallScope,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Per-call overrides for [`Skillix::analyze`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOverrides {
    pub no_market: bool,
    pub match_threshold: Option<f64>,
    pub confidence_threshold: Option<f64>,
}

/// A configured source with its derived identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub name: String,
    pub url: String,
    pub branch: String,
    pub is_default: bool,
    /// `None` when the URL cannot be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct Skillix {
    paths: SkillixPaths,
    config: Config,
    engine: Arc<SyncEngine>,
    search: Arc<SearchEngine>,
}

impl Skillix {
    /// Opens the global root from the environment and loads layered config.
    ///
    /// `project` wins over `SKILLIX_PROJECT_ROOT`; without either, the current
    /// directory's nearest ancestor holding `.skillix/` is used.
    pub fn open(project: Option<PathBuf>) -> Result<Self> {
        let mut paths =
            SkillixPaths::from_env(project).context("failed to resolve the skillix home")?;
        if paths.project_root.is_none() {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            paths.project_root = find_project_root(&cwd, &paths.global_root);
        }
        let config = load_config(&paths).context("failed to load configuration")?;
        tracing::debug!(
            target: "skillix::config",
            global_root = %paths.global_root.display(),
            project_root = ?paths.project_root,
            sources = config.sources.len(),
            "configuration loaded"
        );
        let git = ProcessGit::new(Duration::from_secs(config.sync.timeout_seconds));
        Ok(Self::with_git(paths, config, Arc::new(git)))
    }

    /// Builds a facade over explicit paths, config and git client.
    pub fn with_git(paths: SkillixPaths, config: Config, git: Arc<dyn GitClient>) -> Self {
        let manifest = Arc::new(ManifestStore::new(paths.manifest_file()));
        let engine = Arc::new(SyncEngine::new(
            &paths,
            git,
            Arc::clone(&manifest),
            config.sync.clone(),
        ));
        let search = Arc::new(SearchEngine::new(&paths, manifest, &config));
        Self {
            paths,
            config,
            engine,
            search,
        }
    }

    pub fn paths(&self) -> &SkillixPaths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn configured_source(&self, name: &str) -> Result<&Source> {
        self.config.source(name).ok_or_else(|| {
            anyhow::Error::new(CatalogError::NotFound {
                kind: "source",
                name: name.to_string(),
            })
        })
    }

    /// Syncs one named source or every configured source.
    ///
    /// Sources synced within the TTL are skipped unless `force` is set.
    pub fn sync(&self, source: Option<&str>, force: bool) -> Result<SyncReport> {
        let sources = match source {
            Some(name) => vec![self.configured_source(name)?.clone()],
            None => self.config.sources.clone(),
        };
        let report = self.engine.sync_all(&sources, force);
        tracing::info!(
            target: "skillix::sync",
            synced = report.synced.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "sync finished"
        );
        Ok(report)
    }

    pub fn search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResults> {
        self.search
            .search(query, opts)
            .with_context(|| format!("search for '{query}' failed"))
    }

    pub fn install(&self, name: &str, opts: &InstallOptions) -> Result<InstallOutcome> {
        self.installer()
            .install(name, opts)
            .with_context(|| format!("failed to install '{name}'"))
    }

    pub fn uninstall(&self, name: &str, scope: UninstallScope) -> Result<UninstallOutcome> {
        self.installer()
            .uninstall(name, scope)
            .with_context(|| format!("failed to uninstall '{name}'"))
    }

    /// Installed records of one scope, or project then global.
    pub fn list(&self, scope: Option<SkillScope>) -> Result<Vec<ScopedInstall>> {
        self.installer()
            .list(scope)
            .context("failed to read installed skills")
    }

    /// Resolves a catalogue skill by name.
    pub fn info(&self, name: &str, source: Option<&str>) -> Result<CatalogMatch> {
        self.search
            .find_by_name(name, source)
            .with_context(|| format!("failed to look up '{name}'"))?
            .ok_or_else(|| {
                anyhow::Error::new(CatalogError::NotFound {
                    kind: "skill",
                    name: name.to_string(),
                })
            })
    }

    pub fn sources(&self) -> Vec<SourceInfo> {
        self.config
            .sources
            .iter()
            .map(|s| {
                let (id, cache_dir_name, error) = match parse_url(&s.url) {
                    Ok(identity) => (
                        Some(identity.canonical_id),
                        Some(identity.cache_dir_name),
                        None,
                    ),
                    Err(e) => (None, None, Some(e.to_string())),
                };
                SourceInfo {
                    name: s.name.clone(),
                    url: s.url.clone(),
                    branch: s.branch.clone(),
                    is_default: s.is_default,
                    id,
                    cache_dir_name,
                    error,
                }
            })
            .collect()
    }

    /// Sync state and disk usage of configured sources.
    pub fn status(&self, source: Option<&str>) -> Result<StatusReport> {
        let selected: Vec<&Source> = match source {
            Some(name) => vec![self.configured_source(name)?],
            None => self.config.sources.iter().collect(),
        };
        let manifest = self
            .engine
            .manifest()
            .load()
            .context("failed to read the sync manifest")?;

        let mut reports = Vec::with_capacity(selected.len());
        for src in selected {
            let identity = parse_url(&src.url).ok();
            let entry = identity
                .as_ref()
                .and_then(|id| manifest.get(&id.canonical_id))
                .cloned();
            let (cache_size, needs_sync) = match &identity {
                Some(id) => (
                    dir_size(&self.paths.repo_dir(&id.cache_dir_name))
                        + file_size(&self.paths.source_index_file(&id.cache_dir_name)),
                    self.engine.needs_sync(&id.canonical_id)?,
                ),
                None => (0, true),
            };
            reports.push(SourceReport::new(src, identity, entry, cache_size, needs_sync));
        }

        let summary = StatusSummary::from_reports(&reports);
        Ok(StatusReport {
            total_cache_size: dir_size(&self.paths.cache_dir()),
            sources: reports,
            summary,
        })
    }

    /// Recommends using, improving, installing or creating a skill for a task.
    ///
    /// The catalogue is only consulted when market search is enabled; if no
    /// source was ever synced, the configured sources are synced once first.
    pub fn analyze(
        &self,
        request: &AnalyzeRequest,
        overrides: &AnalyzeOverrides,
    ) -> Result<DispatchResult> {
        let mut settings = self.config.dispatch.clone();
        if overrides.no_market {
            settings.enable_market_search = false;
        }
        if let Some(t) = overrides.match_threshold {
            settings.match_threshold = t;
        }
        if let Some(t) = overrides.confidence_threshold {
            settings.confidence_threshold = t;
        }
        for (label, value) in [
            ("match threshold", settings.match_threshold),
            ("confidence threshold", settings.confidence_threshold),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&value),
                "{label} must be between 0 and 1, got {value}"
            );
        }

        let lexicon = DomainLexicon::load_or_builtin(settings.lexicon_path.as_deref())
            .context("failed to load the domain lexicon")?;
        let global_base = self.paths.global_root.clone();
        let project_base = self.paths.project_dir();
        let roots = default_roots(&global_base, project_base.as_deref());

        let market = CatalogMarket::new(
            Arc::clone(&self.search),
            Arc::clone(&self.engine),
            self.config.sources.clone(),
        );
        let mut collector = Collector::new(roots);
        if settings.enable_market_search {
            collector = collector.with_market(&market, settings.market_limit);
        }

        let analyzer = DispatchAnalyzer::new(lexicon, settings);
        let result = analyzer.analyze(&collector, request);
        tracing::info!(
            action = %result.action,
            skill = ?result.skill,
            confidence = result.confidence,
            "dispatch decided"
        );
        Ok(result)
    }

    fn installer(&self) -> InstallManager {
        InstallManager::new(self.paths.clone(), Arc::clone(&self.search))
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
