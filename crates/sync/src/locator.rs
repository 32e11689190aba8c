//! Repository URL parsing into canonical source identities.
//!
//! `https://github.com/anthropics/skills.git` and
//! `git@github.com:anthropics/skills` both map to the canonical id
//! `github.com/anthropics/skills`, cached under `github.com_anthropics_skills`.

use crate::error::{CatalogError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HTTPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?P<host>[A-Za-z0-9.-]+)/(?P<owner>[A-Za-z0-9._-]+)/(?P<repo>[A-Za-z0-9._-]+)/?$")
        .expect("valid https url regex")
});

static SSH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@(?P<host>[A-Za-z0-9.-]+):(?P<owner>[A-Za-z0-9._-]+)/(?P<repo>[A-Za-z0-9._-]+)/?$")
        .expect("valid ssh url regex")
});

/// Where a catalogue lives and where it is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceIdentity {
    pub host: String,
    pub owner: String,
    pub repo: String,
    /// `host/owner/repo`
    pub canonical_id: String,
    /// `canonical_id` with `/` replaced by `_`.
    pub cache_dir_name: String,
}

impl SourceIdentity {
    /// Whether the cache directory name maps back to the canonical id.
    ///
    /// False when the owner contains `_`.
    pub fn round_trips(&self) -> bool {
        from_dir_name(&self.cache_dir_name) == self.canonical_id
    }
}

pub fn to_dir_name(canonical_id: &str) -> String {
    canonical_id.replace('/', "_")
}

/// Inverse of [`to_dir_name`]. Splits on the first two underscores, so a
/// repository name may keep its own underscores.
pub fn from_dir_name(dir_name: &str) -> String {
    dir_name.splitn(3, '_').collect::<Vec<_>>().join("/")
}

/// Parses a repository URL into a [`SourceIdentity`].
pub fn parse_url(url: &str) -> Result<SourceIdentity> {
    let invalid = |reason: &str| CatalogError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty url"));
    }
    let caps = HTTPS_URL
        .captures(trimmed)
        .or_else(|| SSH_URL.captures(trimmed))
        .ok_or_else(|| {
            invalid("expected https://host/owner/repo[.git] or git@host:owner/repo[.git]")
        })?;

    let host = caps["host"].to_ascii_lowercase();
    let owner = caps["owner"].to_string();
    let repo = caps["repo"]
        .strip_suffix(".git")
        .unwrap_or(&caps["repo"])
        .to_string();

    for segment in [&host, &owner, &repo] {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid("empty or relative path segment"));
        }
    }

    let canonical_id = format!("{host}/{owner}/{repo}");
    let identity = SourceIdentity {
        cache_dir_name: to_dir_name(&canonical_id),
        canonical_id,
        host,
        owner,
        repo,
    };
    if !identity.round_trips() {
        tracing::warn!(
            source = %identity.canonical_id,
            cache_dir = %identity.cache_dir_name,
            "owner contains '_'; cache directory name does not map back to the source id"
        );
    }
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_https_with_and_without_suffix() {
        for url in [
            "https://github.com/anthropics/skills",
            "https://github.com/anthropics/skills.git",
            "https://github.com/anthropics/skills/",
            "http://GitHub.com/anthropics/skills.git/",
        ] {
            let id = parse_url(url).unwrap();
            assert_eq!(id.canonical_id, "github.com/anthropics/skills", "{url}");
            assert_eq!(id.cache_dir_name, "github.com_anthropics_skills");
        }
    }

    #[test]
    fn parses_ssh() {
        let id = parse_url("git@gitlab.example.org:team/tools.git").unwrap();
        assert_eq!(id.host, "gitlab.example.org");
        assert_eq!(id.owner, "team");
        assert_eq!(id.repo, "tools");
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in [
            "",
            "   ",
            "github.com/a/b",
            "ftp://github.com/a/b",
            "https://github.com/a",
            "https://github.com/a/b/c",
            "git@github.com/a/b",
            "https://github.com/a/.git",
            "https://github.com/../b",
        ] {
            let err = parse_url(url).unwrap_err();
            assert_eq!(err.code(), "INVALID_URL", "{url}");
        }
    }

    #[test]
    fn underscore_in_repo_still_round_trips() {
        let id = parse_url("https://github.com/org/my_skills").unwrap();
        assert_eq!(id.cache_dir_name, "github.com_org_my_skills");
        assert!(id.round_trips());
    }

    #[test]
    fn underscore_in_owner_is_flagged() {
        let id = parse_url("https://github.com/my_org/skills").unwrap();
        assert!(!id.round_trips());
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9.-]{0,12}"
    }

    proptest! {
        #[test]
        fn dir_name_round_trips(
            host in "[a-z][a-z0-9-]{0,10}\\.(com|org|io)",
            owner in segment(),
            repo in segment(),
            ssh in any::<bool>(),
            suffix in any::<bool>(),
            slash in any::<bool>(),
        ) {
            let tail = format!(
                "{repo}{}{}",
                if suffix { ".git" } else { "" },
                if slash { "/" } else { "" }
            );
            let url = if ssh {
                format!("git@{host}:{owner}/{tail}")
            } else {
                format!("https://{host}/{owner}/{tail}")
            };
            let id = parse_url(&url).unwrap();
            prop_assert_eq!(from_dir_name(&to_dir_name(&id.canonical_id)), id.canonical_id.clone());
            prop_assert!(id.round_trips());
        }
    }
}
