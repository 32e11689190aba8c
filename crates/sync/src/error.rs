//! Error taxonomy shared by sync, search and install.

use skillix_state::PersistenceError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid repository url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("git {command} timed out after {seconds}s")]
    GitTimeout { command: String, seconds: u64 },

    #[error("repository has no skills/ directory at {}", path.display())]
    MissingSkillsDir { path: PathBuf },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("skill '{name}' already exists at {} (use --force to overwrite)", path.display())]
    AlreadyExists { name: String, path: PathBuf },

    #[error("index for source '{source_id}' references missing files at {}; run sync again", path.display())]
    StaleIndex { source_id: String, path: PathBuf },

    #[error("invalid skill name '{0}': expected a single path segment of letters, digits, '.', '_' or '-'")]
    InvalidSkillName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::Git { .. } => "GIT_ERROR",
            Self::GitTimeout { .. } => "GIT_TIMEOUT",
            Self::MissingSkillsDir { .. } => "MISSING_SKILLS_DIR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::StaleIndex { .. } => "STALE_INDEX",
            Self::InvalidSkillName(_) => "INVALID_SKILL_NAME",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<PersistenceError> for CatalogError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Io(e) => Self::Io(e),
            PersistenceError::Json(e) => Self::Json(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
