//! Materializes catalogue skills into global or project storage.

use crate::error::{CatalogError, Result};
use crate::fsutil::copy_dir_all;
use crate::indexer::INDEX_VERSION;
use crate::locator::to_dir_name;
use crate::search::SearchEngine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use skillix_discovery::{SkillScope, SKILL_FILE};
use skillix_state::{read_json_or_default, write_json_atomic, SkillixPaths};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use time::OffsetDateTime;

static SKILL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("SKILL_NAME: compile-time constant")
});

/// Rejects anything that is not a single safe path segment.
pub fn validate_skill_name(name: &str) -> Result<()> {
    if SKILL_NAME.is_match(name) && name != "." && name != ".." {
        Ok(())
    } else {
        Err(CatalogError::InvalidSkillName(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSkill {
    pub name: String,
    pub source_id: String,
    pub source_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub installed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub path: PathBuf,
    pub commit: String,
}

/// `installed.json` for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledRecord {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub skills: Vec<InstalledSkill>,
}

impl Default for InstalledRecord {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION.to_string(),
            updated_at: OffsetDateTime::UNIX_EPOCH,
            skills: Vec::new(),
        }
    }
}

impl InstalledRecord {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_json_or_default(path)?)
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.updated_at = OffsetDateTime::now_utc();
        write_json_atomic(path, self)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&InstalledSkill> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn upsert(&mut self, skill: InstalledSkill) {
        match self.skills.iter_mut().find(|s| s.name == skill.name) {
            Some(existing) => *existing = skill,
            None => self.skills.push(skill),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<InstalledSkill> {
        let pos = self.skills.iter().position(|s| s.name == name)?;
        Some(self.skills.remove(pos))
    }
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Source name or canonical id to install from.
    pub source: Option<String>,
    pub scope: SkillScope,
    pub force: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            source: None,
            scope: SkillScope::Global,
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallOutcome {
    pub name: String,
    pub scope: SkillScope,
    pub path: PathBuf,
    pub source_id: String,
    pub source_name: String,
    pub commit: String,
    /// An existing copy was overwritten.
    pub replaced: bool,
}

/// Which scope `uninstall` looks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UninstallScope {
    /// Project first, then global.
    #[default]
    Auto,
    Global,
    Project,
}

impl FromStr for UninstallScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse::<SkillScope>().map(Self::from)
        }
    }
}

impl From<SkillScope> for UninstallScope {
    fn from(scope: SkillScope) -> Self {
        match scope {
            SkillScope::Global => Self::Global,
            SkillScope::Project => Self::Project,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallOutcome {
    pub name: String,
    pub scope: SkillScope,
    pub path: PathBuf,
}

/// An installed-record entry tagged with its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedInstall {
    pub scope: SkillScope,
    #[serde(flatten)]
    pub skill: InstalledSkill,
}

pub struct InstallManager {
    paths: SkillixPaths,
    search: Arc<SearchEngine>,
}

impl InstallManager {
    pub fn new(paths: SkillixPaths, search: Arc<SearchEngine>) -> Self {
        Self { paths, search }
    }

    fn scope_dirs(&self, scope: SkillScope) -> Result<(PathBuf, PathBuf)> {
        match (
            self.paths.skills_dir(scope),
            self.paths.installed_file(scope),
        ) {
            (Some(skills), Some(record)) => Ok((skills, record)),
            _ => Err(CatalogError::not_found(
                "project root",
                "pass --project or set SKILLIX_PROJECT_ROOT",
            )),
        }
    }

    /// Copies the cached skill into the scope's `skills/` directory and
    /// records it. Never triggers a sync.
    pub fn install(&self, name: &str, opts: &InstallOptions) -> Result<InstallOutcome> {
        validate_skill_name(name)?;
        let (skills_dir, record_path) = self.scope_dirs(opts.scope)?;
        let target = skills_dir.join(name);

        let exists = target.exists();
        if exists && !opts.force {
            return Err(CatalogError::AlreadyExists {
                name: name.to_string(),
                path: target,
            });
        }

        let found = self
            .search
            .find_by_name(name, opts.source.as_deref())?
            .ok_or_else(|| CatalogError::not_found("skill", name))?;

        let repo_dir = self.paths.repo_dir(&to_dir_name(&found.source.id));
        let rel = Path::new(&found.skill.relative_path);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(CatalogError::StaleIndex {
                source_id: found.source.id.clone(),
                path: repo_dir.join(rel),
            });
        }
        let cached = repo_dir.join(rel);
        if !cached.join(SKILL_FILE).is_file() {
            return Err(CatalogError::StaleIndex {
                source_id: found.source.id.clone(),
                path: cached,
            });
        }

        if exists {
            tracing::debug!(path = %target.display(), "removing existing copy");
            fs::remove_dir_all(&target)?;
        }
        copy_dir_all(&cached, &target)?;

        let mut record = InstalledRecord::load(&record_path)?;
        let now = OffsetDateTime::now_utc();
        let installed_at = record.get(name).map(|s| s.installed_at).unwrap_or(now);
        record.upsert(InstalledSkill {
            name: name.to_string(),
            source_id: found.source.id.clone(),
            source_name: found.source.name.clone(),
            installed_at,
            updated_at: now,
            path: target.clone(),
            commit: found.commit.clone(),
        });
        record.save(&record_path)?;

        tracing::info!(
            name,
            scope = %opts.scope,
            source = %found.source.id,
            commit = %found.commit,
            "skill installed"
        );
        Ok(InstallOutcome {
            name: name.to_string(),
            scope: opts.scope,
            path: target,
            source_id: found.source.id,
            source_name: found.source.name,
            commit: found.commit,
            replaced: exists,
        })
    }

    /// Removes the skill directory and its record entry.
    pub fn uninstall(&self, name: &str, scope: UninstallScope) -> Result<UninstallOutcome> {
        validate_skill_name(name)?;
        let candidates: Vec<SkillScope> = match scope {
            UninstallScope::Auto => [SkillScope::Project, SkillScope::Global]
                .into_iter()
                .filter(|s| self.paths.scope_base(*s).is_some())
                .collect(),
            UninstallScope::Global => vec![SkillScope::Global],
            UninstallScope::Project => vec![SkillScope::Project],
        };

        for candidate in candidates {
            let (skills_dir, record_path) = self.scope_dirs(candidate)?;
            let dir = skills_dir.join(name);
            let mut record = InstalledRecord::load(&record_path)?;
            let had_record = record.remove(name).is_some();
            if !dir.exists() && !had_record {
                continue;
            }
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
            if had_record {
                record.save(&record_path)?;
            }
            tracing::info!(name, scope = %candidate, "skill uninstalled");
            return Ok(UninstallOutcome {
                name: name.to_string(),
                scope: candidate,
                path: dir,
            });
        }
        Err(CatalogError::not_found("installed skill", name))
    }

    /// Installed records for one scope, or project then global.
    pub fn list(&self, scope: Option<SkillScope>) -> Result<Vec<ScopedInstall>> {
        let scopes = match scope {
            Some(s) => vec![s],
            None => vec![SkillScope::Project, SkillScope::Global],
        };
        let mut out = Vec::new();
        for scope in scopes {
            let Some(path) = self.paths.installed_file(scope) else {
                continue;
            };
            let record = InstalledRecord::load(&path)?;
            out.extend(
                record
                    .skills
                    .into_iter()
                    .map(|skill| ScopedInstall { scope, skill }),
            );
        }
        Ok(out)
    }
}
