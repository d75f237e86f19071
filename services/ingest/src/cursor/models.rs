use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Daily-usage response wrapper. Rows stay raw JSON; the report-side
/// loaders own all normalization (see the copilot models for the same
/// rationale).
#[derive(Debug, Clone, Deserialize)]
pub struct UsageResponse {
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMeta {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// On-disk body of an activity snapshot file (daily/weekly/monthly).
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySnapshotBody {
    pub meta: SnapshotMeta,
    pub data: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn usage_response_defaults_to_empty() {
        let resp: UsageResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn usage_response_preserves_raw_rows() {
        let resp: UsageResponse = serde_json::from_value(json!({
            "data": [{"email": "a@x.com", "mostUsedModel": "unmodeled"}]
        }))
        .unwrap();
        assert_eq!(resp.data[0]["mostUsedModel"], "unmodeled");
    }
}
