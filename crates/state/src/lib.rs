//! Paths, environment switches, configuration and persistence helpers.
//!
//! This crate provides utilities for:
//! - Resolving the global (`~/.skillix`) and project (`<project>/.skillix`) roots.
//! - Reading `SKILLIX_*` environment variables.
//! - Loading and merging `config.toml` files.
//! - Writing JSON state atomically.

pub mod config;
pub mod env;
pub mod persistence;

pub use config::{
    default_source, load_config, Config, ConfigError, DispatchSettings, RawConfig, SearchSettings,
    Source, SyncSettings,
};
pub use env::{
    env_git_timeout_secs, env_no_market, env_sync_ttl_secs, find_project_root, global_root,
    home_dir, project_root_from_env, SkillixPaths, STATE_DIR_NAME,
};
pub use persistence::{read_json, read_json_or_default, write_json_atomic, PersistenceError};
pub use skillix_discovery::SkillScope;
