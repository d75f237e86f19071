use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Epoch values below this are seconds; at or above, milliseconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalize a JSON timestamp field to a UTC instant.
///
/// Accepts RFC 3339 strings and numeric epochs in either seconds or
/// milliseconds (detected by magnitude). Anything else is `None`.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            epoch_to_instant(raw)
        }
        _ => None,
    }
}

pub fn epoch_to_instant(raw: i64) -> Option<DateTime<Utc>> {
    if raw <= 0 {
        return None;
    }
    let millis = if raw < MILLIS_THRESHOLD {
        raw.checked_mul(1000)?
    } else {
        raw
    };
    Utc.timestamp_millis_opt(millis).single()
}

/// Normalize a JSON date field to a UTC calendar day.
pub fn parse_day(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).date_naive())
            })
        }
        Value::Number(_) => parse_instant(value).map(|dt| dt.date_naive()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rfc3339_string_parses() {
        let dt = parse_instant(&json!("2026-08-01T12:30:00Z")).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-01T12:30:00+00:00");
    }

    #[test]
    fn rfc3339_with_offset_normalizes_to_utc() {
        let dt = parse_instant(&json!("2026-08-01T14:30:00+02:00")).unwrap();
        assert_eq!(dt.date_naive().to_string(), "2026-08-01");
        assert_eq!(dt.format("%H:%M").to_string(), "12:30");
    }

    #[test]
    fn epoch_seconds_detected_by_magnitude() {
        // 2026-08-01T00:00:00Z
        let dt = parse_instant(&json!(1_785_542_400)).unwrap();
        assert_eq!(dt.date_naive().to_string(), "2026-08-01");
    }

    #[test]
    fn epoch_millis_detected_by_magnitude() {
        let dt = parse_instant(&json!(1_785_542_400_000i64)).unwrap();
        assert_eq!(dt.date_naive().to_string(), "2026-08-01");
    }

    #[test]
    fn seconds_and_millis_agree() {
        let secs = parse_instant(&json!(1_785_542_400)).unwrap();
        let millis = parse_instant(&json!(1_785_542_400_000i64)).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_instant(&json!("not a time")).is_none());
        assert!(parse_instant(&json!(null)).is_none());
        assert!(parse_instant(&json!({"nested": true})).is_none());
        assert!(parse_instant(&json!(0)).is_none());
        assert!(parse_instant(&json!(-5)).is_none());
    }

    #[test]
    fn plain_day_string_parses() {
        assert_eq!(
            parse_day(&json!("2026-08-01")).unwrap().to_string(),
            "2026-08-01"
        );
    }

    #[test]
    fn instant_string_truncates_to_day() {
        assert_eq!(
            parse_day(&json!("2026-08-01T23:59:00Z")).unwrap().to_string(),
            "2026-08-01"
        );
    }

    #[test]
    fn epoch_millis_truncates_to_day() {
        assert_eq!(
            parse_day(&json!(1_785_542_400_000i64)).unwrap().to_string(),
            "2026-08-01"
        );
    }

    #[test]
    fn bad_day_is_none() {
        assert!(parse_day(&json!("08/01/2026")).is_none());
        assert!(parse_day(&json!(true)).is_none());
    }
}
