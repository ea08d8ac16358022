//! Archive of share-set snapshots ("histórico"), one sequence per set kind.

use chrono::{Local, NaiveDate};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use viab_types::ShareSetKind;

use crate::project::ProjectRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Incremental within its kind, starting at 1.
    pub id: u64,
    pub project_name: String,
    pub date: NaiveDate,
    pub kind: ShareSetKind,
    /// `(key, percentage)` in set order.
    pub percentages: Vec<(String, f64)>,
}

#[derive(Debug, Default)]
pub struct ShareHistory {
    entries: DashMap<ShareSetKind, Vec<HistoryEntry>>,
}

impl ShareHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archives the current percentages of one of the project's share sets.
    pub fn archive(&self, project: &ProjectRecord, kind: ShareSetKind, date: NaiveDate) -> HistoryEntry {
        let mut entries = self.entries.entry(kind).or_default();
        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let entry = HistoryEntry {
            id,
            project_name: project.name.clone(),
            date,
            kind,
            percentages: project
                .shares(kind)
                .iter()
                .map(|item| (item.key.clone(), item.percentage))
                .collect(),
        };
        entries.push(entry.clone());
        info!(entry_id = id, project = %project.name, share_set = kind.label(), "Archived share set");
        entry
    }

    /// [`archive`](Self::archive) dated today, local time.
    pub fn archive_today(&self, project: &ProjectRecord, kind: ShareSetKind) -> HistoryEntry {
        self.archive(project, kind, Local::now().date_naive())
    }

    pub fn list(&self, kind: ShareSetKind) -> Vec<HistoryEntry> {
        self.entries.get(&kind).map(|e| e.value().clone()).unwrap_or_default()
    }
}
