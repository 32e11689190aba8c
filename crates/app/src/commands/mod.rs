//! CLI command handlers for the skillix application.

mod analyze;
mod catalog;
mod install;
mod status;
mod sync;

pub(crate) use analyze::handle_analyze_command;
pub(crate) use catalog::{handle_info_command, handle_search_command, handle_sources_command};
pub(crate) use install::{handle_install_command, handle_list_command, handle_uninstall_command};
pub(crate) use status::handle_status_command;
pub(crate) use sync::handle_sync_command;

use crate::cli::OutputFormat;
use anyhow::Result;
use serde::Serialize;

/// Prints `value` as pretty JSON, or the text rendering.
pub(crate) fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}
