use super::emit;
use crate::cli::OutputFormat;
use crate::{AnalyzeOverrides, Skillix};
use anyhow::Result;
use skillix_intelligence::{AnalyzeRequest, DispatchResult};
use std::fmt::Write;

/// Handle the `analyze` command.
pub(crate) fn handle_analyze_command(
    app: &Skillix,
    request: AnalyzeRequest,
    overrides: AnalyzeOverrides,
    format: OutputFormat,
) -> Result<()> {
    let result = app.analyze(&request, &overrides)?;
    emit(format, &result, render_dispatch)
}

pub(crate) fn render_dispatch(result: &DispatchResult) -> String {
    let mut out = String::new();
    let target = match (&result.skill, result.scope) {
        (Some(skill), Some(scope)) => format!(" {skill} ({scope})"),
        _ => String::new(),
    };
    let _ = writeln!(
        out,
        "{}{target}  confidence {:.2}",
        result.action, result.confidence
    );
    let _ = writeln!(out, "  {}", result.reason);

    if let Some(s) = &result.update_suggestion {
        let _ = writeln!(out, "Suggested changes ({}):", s.reason);
        for change in &s.suggested_changes {
            let _ = writeln!(out, "  - {change}");
        }
    }
    if !result.match_details.is_empty() {
        let _ = writeln!(out, "Candidates:");
        for c in &result.match_details {
            let _ = writeln!(
                out,
                "  {:.2}  {:<28} {:<8} name {:.2} desc {:.2} tags {:.2} domain {:.2}",
                c.details.total,
                c.name,
                c.scope,
                c.details.name_score,
                c.details.description_score,
                c.details.tag_score,
                c.details.domain_score
            );
        }
    }
    out
}
