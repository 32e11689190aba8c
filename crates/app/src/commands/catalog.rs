use super::emit;
use super::sync::short_commit;
use crate::cli::OutputFormat;
use crate::{Skillix, SourceInfo};
use anyhow::Result;
use skillix_sync::{CatalogMatch, SearchOptions, SearchResults, SyncStatus};
use std::fmt::Write;

/// Handle the `search` command.
pub(crate) fn handle_search_command(
    app: &Skillix,
    query: String,
    source: Option<String>,
    tags: Vec<String>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let opts = SearchOptions {
        source,
        tags,
        limit: limit.unwrap_or(app.config().search.limit),
    };
    let results = app.search(&query, &opts)?;
    emit(format, &results, render_search)
}

pub(crate) fn render_search(results: &SearchResults) -> String {
    let mut out = String::new();
    if results.results.is_empty() {
        let _ = writeln!(out, "No skills match '{}'.", results.query);
    }
    for hit in &results.results {
        let _ = writeln!(
            out,
            "{:<28} {:<12} {:.2}  {}",
            hit.skill.name, hit.source_name, hit.score, hit.skill.description
        );
    }
    if results.total > results.results.len() {
        let _ = writeln!(
            out,
            "showing {} of {} matches",
            results.results.len(),
            results.total
        );
    }
    let pending: Vec<&str> = results
        .source_status
        .iter()
        .filter(|s| s.status != SyncStatus::Synced)
        .map(|s| s.name.as_str())
        .collect();
    if !pending.is_empty() {
        let _ = writeln!(
            out,
            "not searched (run `skillix sync`): {}",
            pending.join(", ")
        );
    }
    out
}

/// Handle the `info` command.
pub(crate) fn handle_info_command(
    app: &Skillix,
    name: String,
    source: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let found = app.info(&name, source.as_deref())?;
    emit(format, &found, render_info)
}

pub(crate) fn render_info(found: &CatalogMatch) -> String {
    let skill = &found.skill;
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", skill.name, skill.version);
    let _ = writeln!(out, "  {}", skill.description);
    if !skill.author.is_empty() {
        let _ = writeln!(out, "  author:  {}", skill.author);
    }
    if !skill.tags.is_empty() {
        let _ = writeln!(out, "  tags:    {}", skill.tags.join(", "));
    }
    let _ = writeln!(
        out,
        "  source:  {} ({} @ {})",
        found.source.name,
        found.source.id,
        short_commit(&found.commit)
    );
    let _ = writeln!(out, "  path:    {}", skill.relative_path);
    let extras: Vec<&str> = [
        (skill.has_scripts, "scripts"),
        (skill.has_references, "references"),
        (skill.has_assets, "assets"),
    ]
    .into_iter()
    .filter_map(|(has, label)| has.then_some(label))
    .collect();
    if !extras.is_empty() {
        let _ = writeln!(out, "  bundles: {}", extras.join(", "));
    }
    out
}

/// Handle the `sources` command.
pub(crate) fn handle_sources_command(app: &Skillix, format: OutputFormat) -> Result<()> {
    let sources = app.sources();
    emit(format, &sources, |s| render_sources(s))
}

pub(crate) fn render_sources(sources: &[SourceInfo]) -> String {
    let mut out = String::new();
    for s in sources {
        let marker = if s.is_default { "*" } else { " " };
        let id = match (&s.id, &s.error) {
            (Some(id), _) => id.clone(),
            (None, Some(err)) => format!("invalid: {err}"),
            (None, None) => String::new(),
        };
        let _ = writeln!(out, "{marker} {:<16} {}#{}  {id}", s.name, s.url, s.branch);
    }
    out
}
