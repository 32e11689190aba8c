//! Local skill storage and descriptor parsing.
//!
//! This crate provides:
//! - Parsing of `SKILL.md` YAML front matter.
//! - Listing and lookup of skills stored under project and global roots.
//!
//! # Examples
//!
//! ```
//! use skillix_discovery::{list_all_skills, SkillRoot, SkillScope};
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let skill_dir = temp.path().join("alpha");
//! std::fs::create_dir_all(&skill_dir).unwrap();
//! std::fs::write(
//!     skill_dir.join("SKILL.md"),
//!     "---\nname: alpha\ndescription: First skill\n---\n# Alpha",
//! )
//! .unwrap();
//!
//! let roots = vec![SkillRoot {
//!     root: temp.path().to_path_buf(),
//!     scope: SkillScope::Global,
//! }];
//!
//! let skills = list_all_skills(&roots);
//! assert_eq!(skills.len(), 1);
//! assert_eq!(skills[0].description, "First skill");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Descriptor file name inside every skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Error type for discovery operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading a descriptor failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The descriptor's front matter is not valid YAML.
    #[error(transparent)]
    Frontmatter(#[from] frontmatter::FrontmatterError),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SKILL.md front-matter parsing.
#[allow(missing_docs)]
pub mod frontmatter;
/// Skill storage scanning and lookup.
pub mod scanner;
/// Types for local skills and scopes.
#[allow(missing_docs)]
pub mod types;

pub use frontmatter::{parse as parse_frontmatter, ParsedSkill, SkillFrontmatter, TagList};
pub use scanner::{default_roots, get_skill, list_all_skills, read_skill, skills_dir};
pub use types::{LocalSkill, SkillRoot, SkillScope};
