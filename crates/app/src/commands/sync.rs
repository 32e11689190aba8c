use super::emit;
use crate::cli::OutputFormat;
use crate::Skillix;
use anyhow::{bail, Result};
use skillix_sync::SyncReport;
use std::fmt::Write;

/// Handle the `sync` command. Fails when any source failed.
pub(crate) fn handle_sync_command(
    app: &Skillix,
    source: Option<String>,
    force: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = app.sync(source.as_deref(), force)?;
    emit(format, &report, render_sync)?;
    if !report.is_success() {
        bail!("{} source(s) failed to sync", report.failed.len());
    }
    Ok(())
}

pub(crate) fn render_sync(report: &SyncReport) -> String {
    let mut out = String::new();
    for s in &report.synced {
        let verb = if s.cloned {
            "cloned"
        } else if s.has_updates {
            "updated"
        } else {
            "up to date"
        };
        let _ = writeln!(
            out,
            "synced  {} ({verb}, {} skills, {})",
            s.name,
            s.skill_count,
            short_commit(&s.commit)
        );
    }
    for s in &report.skipped {
        let _ = writeln!(out, "skipped {} ({})", s.name, s.reason);
    }
    for f in &report.failed {
        let _ = writeln!(out, "failed  {} [{}] {}", f.name, f.code, f.message);
    }
    let _ = writeln!(
        out,
        "{} synced, {} skipped, {} failed",
        report.synced.len(),
        report.skipped.len(),
        report.failed.len()
    );
    out
}

pub(crate) fn short_commit(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
