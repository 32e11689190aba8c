//! Builds a per-source index from a cached checkout's `skills/` directory.

use crate::error::{CatalogError, Result};
use crate::locator::SourceIdentity;
use serde::{Deserialize, Serialize};
use skillix_discovery::{parse_frontmatter, SKILL_FILE};
use skillix_state::Source;
use std::fs;
use std::path::{Component, Path};
use time::OffsetDateTime;
use walkdir::WalkDir;

pub const INDEX_VERSION: &str = "1.0";
const DEFAULT_SKILL_VERSION: &str = "0.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedSource {
    pub id: String,
    pub name: String,
    pub url: String,
    pub branch: String,
    pub commit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillIndexItem {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Skill directory relative to the repository root, `/`-separated.
    pub relative_path: String,
    #[serde(default)]
    pub has_scripts: bool,
    #[serde(default)]
    pub has_references: bool,
    #[serde(default)]
    pub has_assets: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceIndex {
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub source: IndexedSource,
    pub skills: Vec<SkillIndexItem>,
}

impl SourceIndex {
    pub fn empty(source: &Source, identity: &SourceIdentity, commit: &str) -> Self {
        Self {
            version: INDEX_VERSION.to_string(),
            generated_at: OffsetDateTime::now_utc(),
            source: IndexedSource {
                id: identity.canonical_id.clone(),
                name: source.name.clone(),
                url: source.url.clone(),
                branch: source.branch.clone(),
                commit: commit.to_string(),
            },
            skills: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SkillIndexItem> {
        self.skills.iter().find(|s| s.name == name)
    }
}

/// Indexes every `skills/<dir>/SKILL.md` in `repo_dir`, in lexical directory order.
///
/// Entries without a descriptor, with unparsable front matter, or lacking a
/// name or description are skipped.
pub fn build_index(
    source: &Source,
    identity: &SourceIdentity,
    repo_dir: &Path,
    commit: &str,
) -> Result<SourceIndex> {
    let skills_root = repo_dir.join("skills");
    if !skills_root.is_dir() {
        return Err(CatalogError::MissingSkillsDir { path: skills_root });
    }

    let mut index = SourceIndex::empty(source, identity, commit);
    let mut dirs: Vec<_> = WalkDir::new(&skills_root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();
    dirs.sort();

    for dir in dirs {
        match index_skill(repo_dir, &dir) {
            Some(item) => index.skills.push(item),
            None => tracing::debug!(path = %dir.display(), "skipping skill without usable descriptor"),
        }
    }

    tracing::debug!(source = %identity.canonical_id, count = index.skills.len(), "built index");
    Ok(index)
}

fn index_skill(repo_dir: &Path, dir: &Path) -> Option<SkillIndexItem> {
    let content = fs::read_to_string(dir.join(SKILL_FILE)).ok()?;
    let parsed = match parse_frontmatter(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "invalid front matter");
            return None;
        }
    };
    let meta = parsed.metadata;
    let name = meta.name()?.to_string();
    let description = meta.description()?.to_string();

    Some(SkillIndexItem {
        name,
        description,
        version: meta
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_SKILL_VERSION)
            .to_string(),
        author: meta.author.as_deref().map(str::trim).unwrap_or("").to_string(),
        tags: meta.tags(),
        relative_path: relative_path(repo_dir, dir),
        has_scripts: dir.join("scripts").exists(),
        has_references: dir.join("references").exists(),
        has_assets: dir.join("assets").exists(),
    })
}

fn relative_path(base: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf());
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
