//! YAML front-matter parsing for SKILL.md files.
//!
//! A skill descriptor starts with a `---` delimited YAML block:
//!
//! ```yaml
//! ---
//! name: pdf-converter
//! description: Convert PDF documents into images
//! version: 1.2.0
//! author: docs-team
//! tags: [pdf, image]
//! ---
//! ```
//!
//! Only the fields above are interpreted; anything else is kept in
//! [`SkillFrontmatter::extra`] and otherwise ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tags may be written as a YAML list or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    /// `tags: [a, b]`
    List(Vec<String>),
    /// `tags: "a, b"`
    Csv(String),
}

impl TagList {
    /// Flatten into trimmed, non-empty tag strings.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TagList::List(items) => items
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagList::Csv(s) => parse_comma_list(s),
        }
    }
}

/// Parsed front matter of a SKILL.md file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<TagList>,
    /// Additional fields that may be present.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl SkillFrontmatter {
    /// Name with surrounding whitespace removed, `None` when blank.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Description with surrounding whitespace removed, `None` when blank.
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.as_ref().map(TagList::to_vec).unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Result of parsing a descriptor: metadata plus the markdown body.
#[derive(Debug, Clone)]
pub struct ParsedSkill {
    /// Parsed front matter; default (all `None`) when the file has none.
    pub metadata: SkillFrontmatter,
    /// The markdown content after the front matter.
    pub body: String,
    /// Whether a front-matter block was present at all.
    pub has_frontmatter: bool,
}

/// Errors raised while parsing a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Split content into front-matter YAML and body.
pub fn split_frontmatter(content: &str) -> (Option<String>, String) {
    let trimmed = content.trim_start();

    if !trimmed.starts_with("---") {
        return (None, content.to_string());
    }

    let after_open = &trimmed[3..];
    let after_open = after_open.trim_start_matches(['\r', '\n']);

    if let Some(end_pos) = after_open.find("\n---") {
        let yaml = after_open[..end_pos].trim_end_matches('\r');
        let rest = &after_open[end_pos + 4..];
        let rest = rest.trim_start_matches(['\r', '\n']);
        (Some(yaml.to_string()), rest.to_string())
    } else {
        // Unclosed block: the whole file is body.
        (None, content.to_string())
    }
}

/// Parse a SKILL.md descriptor into metadata and body.
pub fn parse(content: &str) -> Result<ParsedSkill, FrontmatterError> {
    let (yaml, body) = split_frontmatter(content);
    match yaml {
        Some(yaml) if yaml.trim().is_empty() => Ok(ParsedSkill {
            metadata: SkillFrontmatter::default(),
            body,
            has_frontmatter: true,
        }),
        Some(yaml) => Ok(ParsedSkill {
            metadata: serde_yaml::from_str(&yaml)?,
            body,
            has_frontmatter: true,
        }),
        None => Ok(ParsedSkill {
            metadata: SkillFrontmatter::default(),
            body,
            has_frontmatter: false,
        }),
    }
}

fn parse_comma_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
