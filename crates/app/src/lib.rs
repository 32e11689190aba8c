//! Application layer for `skillix`.
//!
//! [`Skillix`] wires configuration, paths and the sync, search, install and
//! dispatch engines together; [`run`] parses the command line and prints
//! results as text or JSON. Logs go to stderr and are controlled by
//! `RUST_LOG`, so JSON on stdout stays machine-readable.

use anyhow::Result;
use clap::Parser;
use skillix_intelligence::AnalyzeRequest;

pub mod cli;
mod commands;
mod facade;
pub mod status;

use cli::{Cli, Commands};
use commands::{
    handle_analyze_command, handle_info_command, handle_install_command, handle_list_command,
    handle_search_command, handle_sources_command, handle_status_command, handle_sync_command,
    handle_uninstall_command,
};
pub use facade::{AnalyzeOverrides, Skillix, SourceInfo};
pub use status::{SourceReport, StatusReport, StatusSummary};

/// The main entry point for the `skillix` binary.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = Skillix::open(cli.project)?;

    match cli.command {
        Commands::Sync {
            source,
            force,
            format,
        } => handle_sync_command(&app, source, force, format),
        Commands::Search {
            query,
            source,
            tags,
            limit,
            format,
        } => handle_search_command(&app, query, source, tags, limit, format),
        Commands::Install {
            name,
            source,
            scope,
            force,
            format,
        } => handle_install_command(&app, name, source, scope, force, format),
        Commands::Uninstall {
            name,
            scope,
            format,
        } => handle_uninstall_command(&app, name, scope, format),
        Commands::Status { source, format } => handle_status_command(&app, source, format),
        Commands::Analyze {
            task,
            context,
            hints,
            no_market,
            match_threshold,
            confidence_threshold,
            format,
        } => {
            let request = AnalyzeRequest {
                task,
                context,
                hints,
            };
            let overrides = AnalyzeOverrides {
                no_market,
                match_threshold,
                confidence_threshold,
            };
            handle_analyze_command(&app, request, overrides, format)
        }
        Commands::Sources { format } => handle_sources_command(&app, format),
        Commands::Info {
            name,
            source,
            format,
        } => handle_info_command(&app, name, source, format),
        Commands::List { scope, format } => handle_list_command(&app, scope, format),
    }
}
