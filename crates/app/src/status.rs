//! Status report types.

use serde::Serialize;
use skillix_state::Source;
use skillix_sync::{ManifestEntry, SourceIdentity, SyncStatus};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub name: String,
    pub url: String,
    pub branch: String,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub synced_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Bytes used by the clone and its index.
    pub cache_size: u64,
    pub needs_sync: bool,
}

impl SourceReport {
    pub(crate) fn new(
        source: &Source,
        identity: Option<SourceIdentity>,
        entry: Option<ManifestEntry>,
        cache_size: u64,
        needs_sync: bool,
    ) -> Self {
        let mut report = Self {
            name: source.name.clone(),
            url: source.url.clone(),
            branch: source.branch.clone(),
            is_default: source.is_default,
            id: identity.map(|i| i.canonical_id),
            status: SyncStatus::NotSynced,
            commit: None,
            synced_at: None,
            skill_count: None,
            error: None,
            cache_size,
            needs_sync,
        };
        if let Some(entry) = entry {
            report.status = entry.status;
            report.commit = entry.commit;
            report.synced_at = entry.synced_at;
            report.skill_count = entry.skill_count;
            report.error = entry.error;
        } else if report.id.is_none() {
            report.status = SyncStatus::Error;
            report.error = Some(format!("invalid source url: {}", source.url));
        }
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total: usize,
    pub synced: usize,
    pub not_synced: usize,
    pub error: usize,
    /// Skills across synced sources.
    pub skills: usize,
}

impl StatusSummary {
    pub fn from_reports(reports: &[SourceReport]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for r in reports {
            match r.status {
                SyncStatus::Synced => {
                    summary.synced += 1;
                    summary.skills += r.skill_count.unwrap_or(0);
                }
                SyncStatus::NotSynced => summary.not_synced += 1,
                SyncStatus::Error => summary.error += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub sources: Vec<SourceReport>,
    /// Bytes used by the whole cache directory.
    pub total_cache_size: u64,
    pub summary: StatusSummary,
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
