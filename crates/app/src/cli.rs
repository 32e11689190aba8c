use clap::{Parser, Subcommand, ValueEnum};
use skillix_discovery::SkillScope;
use skillix_sync::UninstallScope;
use std::path::PathBuf;

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Install target scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ScopeArg {
    #[default]
    Global,
    Project,
}

impl From<ScopeArg> for SkillScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Global => SkillScope::Global,
            ScopeArg::Project => SkillScope::Project,
        }
    }
}

/// Uninstall scope; `auto` tries the project first, then global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum UninstallScopeArg {
    #[default]
    Auto,
    Global,
    Project,
}

impl From<UninstallScopeArg> for UninstallScope {
    fn from(scope: UninstallScopeArg) -> Self {
        match scope {
            UninstallScopeArg::Auto => UninstallScope::Auto,
            UninstallScopeArg::Global => UninstallScope::Global,
            UninstallScopeArg::Project => UninstallScope::Project,
        }
    }
}

/// Command-line interface for `skillix`.
#[derive(Debug, Parser)]
#[command(
    name = "skillix",
    version,
    about = "Sync, search, install and pick agent skills from git catalogues"
)]
pub struct Cli {
    /// Project directory (its `.skillix/` holds project-scoped skills and config).
    #[arg(long, global = true, value_name = "DIR", env = "SKILLIX_PROJECT_ROOT")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clones or updates catalogue sources and rebuilds their indexes.
    Sync {
        /// Only sync this source (default: all configured sources).
        source: Option<String>,
        /// Sync even when the last sync is within the TTL.
        #[arg(long)]
        force: bool,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Searches synced catalogues by name, description and tags.
    Search {
        query: String,
        /// Restrict to one source (name or canonical id).
        #[arg(long)]
        source: Option<String>,
        /// Required tag (repeatable; any match counts).
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Maximum results (default from config).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Copies a catalogue skill into global or project storage.
    Install {
        name: String,
        /// Source to install from (name or canonical id).
        #[arg(long)]
        source: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        scope: ScopeArg,
        /// Overwrite an existing installation.
        #[arg(long)]
        force: bool,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Removes an installed skill.
    Uninstall {
        name: String,
        #[arg(long, value_enum, default_value_t)]
        scope: UninstallScopeArg,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Shows sync state and cache usage of configured sources.
    Status {
        source: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Recommends whether to use, improve, install or create a skill for a task.
    Analyze {
        task: String,
        /// Extra context that is scored with the task.
        #[arg(long)]
        context: Option<String>,
        /// Hint words (repeatable).
        #[arg(long = "hint", value_name = "HINT")]
        hints: Vec<String>,
        /// Only consider installed skills.
        #[arg(long)]
        no_market: bool,
        #[arg(long, value_name = "0..1")]
        match_threshold: Option<f64>,
        #[arg(long, value_name = "0..1")]
        confidence_threshold: Option<f64>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Lists configured sources.
    Sources {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Shows one catalogue skill.
    Info {
        name: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Lists installed skills.
    List {
        /// Only this scope (default: project then global).
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}
