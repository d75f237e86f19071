use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tandem_common::error::{TandemError, TandemResult};

use crate::meta::SnapshotMeta;

/// Innermost leaf of the metrics payload. Counters default to 0 when the
/// upstream omits them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionsLanguage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total_code_lines_suggested: u64,
    #[serde(default)]
    pub total_code_lines_accepted: u64,
    #[serde(default)]
    pub total_code_suggestions: u64,
    #[serde(default)]
    pub total_code_acceptances: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionsModel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub languages: Vec<CompletionsLanguage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionsEditor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub models: Vec<CompletionsModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeCompletions {
    #[serde(default)]
    pub editors: Vec<CompletionsEditor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub copilot_ide_code_completions: Option<CodeCompletions>,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub meta: SnapshotMeta,
    pub days: Vec<MetricsDay>,
}

impl MetricsSnapshot {
    /// Every language leaf across all days, editors, and models, in
    /// document order. The nesting is fully flattened so acceptance sums
    /// never miss a branch.
    pub fn language_leaves(&self) -> impl Iterator<Item = &CompletionsLanguage> {
        self.days
            .iter()
            .filter_map(|day| day.copilot_ide_code_completions.as_ref())
            .flat_map(|c| c.editors.iter())
            .flat_map(|e| e.models.iter())
            .flat_map(|m| m.languages.iter())
    }
}

#[derive(Deserialize)]
struct RawMetricsFile {
    #[serde(default)]
    meta: SnapshotMeta,
    #[serde(default)]
    data: Vec<Value>,
}

/// Load an org-metrics snapshot: `{meta, data: [{date, copilot_ide_code_completions: ...}]}`.
///
/// Days with a malformed date or shape are dropped with a warning.
pub fn load_metrics(path: &Path) -> TandemResult<MetricsSnapshot> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| TandemError::NotFound(format!("metrics snapshot {}: {e}", path.display())))?;
    let parsed: RawMetricsFile = serde_json::from_str(&raw)
        .map_err(|e| TandemError::Snapshot(format!("metrics snapshot {}: {e}", path.display())))?;

    let mut days = Vec::new();
    for (row, value) in parsed.data.into_iter().enumerate() {
        match serde_json::from_value::<MetricsDay>(value) {
            Ok(day) => days.push(day),
            Err(e) => {
                tracing::warn!(path = %path.display(), row, error = %e, "skipping malformed metrics day");
            }
        }
    }

    Ok(MetricsSnapshot {
        meta: parsed.meta,
        days,
    })
}
