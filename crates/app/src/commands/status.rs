use super::emit;
use super::sync::short_commit;
use crate::cli::OutputFormat;
use crate::status::{format_bytes, StatusReport};
use crate::Skillix;
use anyhow::Result;
use std::fmt::Write;
use time::format_description::well_known::Rfc3339;

/// Handle the `status` command.
pub(crate) fn handle_status_command(
    app: &Skillix,
    source: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let report = app.status(source.as_deref())?;
    emit(format, &report, render_status)
}

pub(crate) fn render_status(report: &StatusReport) -> String {
    let mut out = String::new();
    for s in &report.sources {
        let _ = writeln!(
            out,
            "{}{} [{}] {}",
            s.name,
            if s.is_default { " (default)" } else { "" },
            s.status,
            s.url
        );
        if let Some(commit) = &s.commit {
            let synced = s
                .synced_at
                .and_then(|t| t.format(&Rfc3339).ok())
                .unwrap_or_else(|| "never".to_string());
            let _ = writeln!(
                out,
                "  commit {}  synced {}  {} skills",
                short_commit(commit),
                synced,
                s.skill_count.unwrap_or(0)
            );
        }
        if let Some(err) = &s.error {
            let _ = writeln!(out, "  error: {err}");
        }
        let _ = writeln!(
            out,
            "  cache {}{}",
            format_bytes(s.cache_size),
            if s.needs_sync { "  (sync due)" } else { "" }
        );
    }
    let sum = &report.summary;
    let _ = writeln!(
        out,
        "{} sources: {} synced, {} not synced, {} errored; {} skills; cache {}",
        sum.total,
        sum.synced,
        sum.not_synced,
        sum.error,
        sum.skills,
        format_bytes(report.total_cache_size)
    );
    out
}
