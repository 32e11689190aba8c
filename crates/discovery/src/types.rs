use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where a locally stored skill lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillScope {
    /// User-wide storage (`~/.skillix/skills`).
    Global,
    /// Repository-local storage (`<project>/.skillix/skills`).
    Project,
}

impl SkillScope {
    /// Returns a stable label for this scope.
    pub fn label(&self) -> &'static str {
        match self {
            SkillScope::Global => "global",
            SkillScope::Project => "project",
        }
    }
}

impl fmt::Display for SkillScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for SkillScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("global") {
            Ok(SkillScope::Global)
        } else if s.eq_ignore_ascii_case("project") {
            Ok(SkillScope::Project)
        } else {
            Err(format!("unknown scope '{s}' (expected global or project)"))
        }
    }
}

/// A skill storage directory together with the scope it represents.
#[derive(Debug, Clone)]
pub struct SkillRoot {
    /// Directory whose immediate children are skill directories.
    pub root: PathBuf,
    pub scope: SkillScope,
}

/// A skill found in local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSkill {
    /// Name from front matter, falling back to the directory name.
    pub name: String,
    /// Description from front matter (may be empty).
    pub description: String,
    pub version: Option<String>,
    pub tags: Vec<String>,
    /// The skill directory (parent of `SKILL.md`).
    pub dir: PathBuf,
    pub scope: SkillScope,
}

impl LocalSkill {
    /// Path to the skill's descriptor file.
    pub fn descriptor_path(&self) -> PathBuf {
        self.dir.join(crate::SKILL_FILE)
    }
}
