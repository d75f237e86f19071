use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of the seat billing API. Seat rows are kept as raw JSON:
/// snapshots capture the upstream shape verbatim and the report-side
/// loaders own all normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatsPage {
    #[serde(default)]
    pub total_seats: u64,
    #[serde(default)]
    pub seats: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMeta {
    pub org: String,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

/// On-disk body of a seat snapshot file.
#[derive(Debug, Clone, Serialize)]
pub struct SeatSnapshotBody {
    pub meta: SnapshotMeta,
    pub seats: Vec<Value>,
}

/// On-disk body of a metrics snapshot file.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshotBody {
    pub meta: SnapshotMeta,
    pub data: Vec<Value>,
}
