use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance block written at the top of every snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotMeta {
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}
