use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tandem_common::error::{TandemError, TandemResult};

use crate::meta::SnapshotMeta;
use crate::timeparse::parse_instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigningTeam {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One licensed seat, fully normalized: timestamps resolved to UTC instants,
/// missing optional fields resolved to `None`.
#[derive(Debug, Clone)]
pub struct SeatRecord {
    pub login: String,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub last_activity_editor: Option<String>,
    pub enriched_name: Option<String>,
    pub assigning_team: Option<AssigningTeam>,
}

#[derive(Debug, Clone)]
pub struct SeatSnapshot {
    pub meta: SnapshotMeta,
    pub seats: Vec<SeatRecord>,
}

#[derive(Deserialize)]
struct RawSeatFile {
    #[serde(default)]
    meta: SnapshotMeta,
    #[serde(default)]
    seats: Vec<Value>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn seat_from_value(value: &Value) -> Option<SeatRecord> {
    let assignee = value.get("assignee")?;
    let login = string_field(assignee, "login")?;

    // An unparseable activity timestamp keeps the seat; it just classifies
    // as inactive downstream.
    let last_activity_at = value.get("last_activity_at").and_then(parse_instant);

    let assigning_team = value
        .get("assigning_team")
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value::<AssigningTeam>(v.clone()).ok());

    Some(SeatRecord {
        login,
        last_activity_at,
        last_activity_editor: string_field(value, "last_activity_editor"),
        enriched_name: string_field(assignee, "enriched_name"),
        assigning_team,
    })
}

/// Load a seat snapshot: `{meta, seats: [{assignee: {login, ...}, ...}]}`.
///
/// Rows without an assignee login are dropped with a warning; duplicate
/// logins keep the first occurrence. A wholly unparseable file is an error.
pub fn load_seats(path: &Path) -> TandemResult<SeatSnapshot> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| TandemError::NotFound(format!("seat snapshot {}: {e}", path.display())))?;
    let parsed: RawSeatFile = serde_json::from_str(&raw)
        .map_err(|e| TandemError::Snapshot(format!("seat snapshot {}: {e}", path.display())))?;

    let mut seats = Vec::new();
    let mut seen_logins: HashSet<String> = HashSet::new();
    for (row, value) in parsed.seats.iter().enumerate() {
        match seat_from_value(value) {
            Some(seat) => {
                if seen_logins.insert(seat.login.clone()) {
                    seats.push(seat);
                } else {
                    tracing::warn!(path = %path.display(), row, login = %seat.login, "duplicate seat login, keeping first");
                }
            }
            None => {
                tracing::warn!(path = %path.display(), row, "skipping malformed seat row");
            }
        }
    }

    Ok(SeatSnapshot {
        meta: parsed.meta,
        seats,
    })
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
    fn loads_normalized_seats() {
        let file = write_snapshot(&json!({
            "meta": {"org": "acme", "source": "copilot"},
            "seats": [
                {
                    "assignee": {"login": "bchen", "enriched_name": "Bob Chen"},
                    "last_activity_at": "2026-08-05T10:00:00Z",
                    "last_activity_editor": "vscode/1.92",
                    "assigning_team": {"slug": "platform", "name": "Platform"}
                },
                {
                    "assignee": {"login": "mlopez"},
                    "last_activity_at": null
                }
            ]
        }));

        let snapshot = load_seats(file.path()).expect("should load");
        assert_eq!(snapshot.meta.org.as_deref(), Some("acme"));
        assert_eq!(snapshot.seats.len(), 2);

        let bchen = &snapshot.seats[0];
        assert_eq!(bchen.login, "bchen");
        assert!(bchen.last_activity_at.is_some());
        assert_eq!(bchen.enriched_name.as_deref(), Some("Bob Chen"));
        assert_eq!(bchen.assigning_team.as_ref().unwrap().slug, "platform");

        let mlopez = &snapshot.seats[1];
        assert!(mlopez.last_activity_at.is_none());
        assert!(mlopez.assigning_team.is_none());
    }

    #[test]
    fn epoch_second_timestamps_normalize() {
        let file = write_snapshot(&json!({
            "seats": [
                {"assignee": {"login": "a"}, "last_activity_at": 1_785_542_400i64},
                {"assignee": {"login": "b"}, "last_activity_at": 1_785_542_400_000i64}
            ]
        }));

        let snapshot = load_seats(file.path()).expect("should load");
        assert_eq!(
            snapshot.seats[0].last_activity_at,
            snapshot.seats[1].last_activity_at
        );
    }

    #[test]
    fn unparseable_timestamp_keeps_the_seat() {
        let file = write_snapshot(&json!({
            "seats": [
                {"assignee": {"login": "a"}, "last_activity_at": "garbage"}
            ]
        }));

        let snapshot = load_seats(file.path()).expect("should load");
        assert_eq!(snapshot.seats.len(), 1);
        assert!(snapshot.seats[0].last_activity_at.is_none());
    }

    #[test]
    fn rows_without_login_are_dropped() {
        let file = write_snapshot(&json!({
            "seats": [
                {"assignee": {}, "last_activity_at": "2026-08-05T10:00:00Z"},
                {"last_activity_at": "2026-08-05T10:00:00Z"},
                {"assignee": {"login": "keep"}}
            ]
        }));

        let snapshot = load_seats(file.path()).expect("should load");
        assert_eq!(snapshot.seats.len(), 1);
        assert_eq!(snapshot.seats[0].login, "keep");
    }

    #[test]
    fn duplicate_logins_keep_first() {
        let file = write_snapshot(&json!({
            "seats": [
                {"assignee": {"login": "dup"}, "last_activity_editor": "first"},
                {"assignee": {"login": "dup"}, "last_activity_editor": "second"}
            ]
        }));

        let snapshot = load_seats(file.path()).expect("should load");
        assert_eq!(snapshot.seats.len(), 1);
        assert_eq!(snapshot.seats[0].last_activity_editor.as_deref(), Some("first"));
    }

    #[test]
    fn wholly_unparseable_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[[").unwrap();
        let err = load_seats(file.path()).unwrap_err();
        assert!(matches!(err, TandemError::Snapshot(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_seats(Path::new("/no/such/seats.json")).unwrap_err();
        assert!(matches!(err, TandemError::NotFound(_)));
    }
}
