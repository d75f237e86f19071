use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tandem_common::error::{TandemError, TandemResult};

use crate::timeparse::parse_day;

/// One user-day of IDE usage, fully normalized: the date resolved to a UTC
/// calendar day, every counter defaulted to 0.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    pub user_id: String,
    pub email: String,
    pub is_active: bool,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub accepted_lines_added: u64,
    pub total_accepts: u64,
    pub total_rejects: u64,
    pub total_tabs_shown: u64,
    pub total_tabs_accepted: u64,
    pub composer_requests: u64,
    pub chat_requests: u64,
    pub agent_requests: u64,
    pub cmdk_usages: u64,
}

#[derive(Deserialize)]
struct RawActivityFile {
    #[serde(default)]
    data: Vec<Value>,
}

fn counter(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn record_from_value(value: &Value) -> Option<ActivityRecord> {
    let date = value.get("date").and_then(parse_day)?;
    let email = value
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();
    // userId arrives as a number from some fetch windows and a string from
    // others; either is accepted.
    let user_id = match value.get("userId")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Some(ActivityRecord {
        date,
        user_id,
        email,
        is_active: value
            .get("isActive")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        lines_added: counter(value, "totalLinesAdded"),
        lines_deleted: counter(value, "totalLinesDeleted"),
        accepted_lines_added: counter(value, "acceptedLinesAdded"),
        total_accepts: counter(value, "totalAccepts"),
        total_rejects: counter(value, "totalRejects"),
        total_tabs_shown: counter(value, "totalTabsShown"),
        total_tabs_accepted: counter(value, "totalTabsAccepted"),
        composer_requests: counter(value, "composerRequests"),
        chat_requests: counter(value, "chatRequests"),
        agent_requests: counter(value, "agentRequests"),
        cmdk_usages: counter(value, "cmdkUsages"),
    })
}

/// Load an activity snapshot: `{meta, data: [{date, userId, email, isActive, ...counters}]}`.
///
/// Rows missing a date, email, or user id are dropped with a warning.
pub fn load_activity(path: &Path) -> TandemResult<Vec<ActivityRecord>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| TandemError::NotFound(format!("activity snapshot {}: {e}", path.display())))?;
    let parsed: RawActivityFile = serde_json::from_str(&raw)
        .map_err(|e| TandemError::Snapshot(format!("activity snapshot {}: {e}", path.display())))?;

    let mut records = Vec::new();
    for (row, value) in parsed.data.iter().enumerate() {
        match record_from_value(value) {
            Some(record) => records.push(record),
            None => {
                tracing::warn!(path = %path.display(), row, "skipping malformed activity row");
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write as _;

    fn write_snapshot(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    #[test]
    fn loads_normalized_records() {
        let file = write_snapshot(&json!({
            "meta": {"source": "cursor"},
            "data": [{
                "date": "2026-08-01",
                "userId": 42,
                "email": "bob@x.com",
                "isActive": true,
                "totalLinesAdded": 120,
                "totalLinesDeleted": 30,
                "acceptedLinesAdded": 80,
                "totalAccepts": 15,
                "totalRejects": 5,
                "composerRequests": 3
            }]
        }));

        let records = load_activity(file.path()).expect("should load");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.user_id, "42");
        assert_eq!(r.email, "bob@x.com");
        assert!(r.is_active);
        assert_eq!(r.lines_added, 120);
        assert_eq!(r.accepted_lines_added, 80);
        // absent counters default to zero
        assert_eq!(r.chat_requests, 0);
        assert_eq!(r.cmdk_usages, 0);
    }

    #[test]
    fn epoch_millis_date_normalizes_to_day() {
        let file = write_snapshot(&json!({
            "data": [{
                "date": 1_785_542_400_000i64,
                "userId": "u1",
                "email": "a@x.com"
            }]
        }));
        let records = load_activity(file.path()).expect("should load");
        assert_eq!(records[0].date.to_string(), "2026-08-01");
        assert!(!records[0].is_active);
    }

    #[test]
    fn rows_missing_required_keys_are_dropped() {
        let file = write_snapshot(&json!({
            "data": [
                {"userId": "u1", "email": "a@x.com"},
                {"date": "2026-08-01", "email": "a@x.com"},
                {"date": "2026-08-01", "userId": "u1"},
                {"date": "2026-08-01", "userId": "u1", "email": "keep@x.com"}
            ]
        }));
        let records = load_activity(file.path()).expect("should load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "keep@x.com");
    }

    #[test]
    fn wholly_unparseable_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "null").unwrap();
        let err = load_activity(file.path()).unwrap_err();
        assert!(matches!(err, TandemError::Snapshot(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_activity(Path::new("/no/such/activity.json")).unwrap_err();
        assert!(matches!(err, TandemError::NotFound(_)));
    }
}
