use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tandem_snapshots::{ActivityRecord, SeatRecord};

/// Start of the lookback window: `now - lookback_days`, normalized to the
/// start of its UTC day so a run at 09:00 and a run at 17:00 classify the
/// same records identically.
pub fn cutoff_for(now: DateTime<Utc>, lookback_days: i64) -> DateTime<Utc> {
    let day = (now - Duration::days(lookback_days)).date_naive();
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

/// Per-person activity classification for one window. Derived, never
/// persisted; recomputed every run.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityClassification {
    pub is_active: bool,
    pub days_since_last_activity: Option<i64>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl ActivityClassification {
    pub fn inactive() -> Self {
        Self {
            is_active: false,
            days_since_last_activity: None,
            last_activity_at: None,
        }
    }
}

/// A seat is active iff it has a last-activity timestamp at or after the
/// cutoff. Seats with absent or unparseable timestamps are inactive, never
/// active, and still count toward totals.
pub fn classify_seat(
    seat: &SeatRecord,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ActivityClassification {
    match seat.last_activity_at {
        Some(ts) => ActivityClassification {
            is_active: ts >= cutoff,
            days_since_last_activity: Some((now - ts).num_days()),
            last_activity_at: Some(ts),
        },
        None => ActivityClassification::inactive(),
    }
}

/// A usage stream is active iff any record in the window is itself marked
/// active; the most recent such record supplies the displayed last
/// activity.
pub fn classify_activity(
    records: &[&ActivityRecord],
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ActivityClassification {
    let last_active_day: Option<NaiveDate> =
        records.iter().filter(|r| r.is_active).map(|r| r.date).max();

    match last_active_day {
        Some(day) => {
            let instant = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight"));
            ActivityClassification {
                is_active: instant >= cutoff,
                days_since_last_activity: Some((now.date_naive() - day).num_days()),
                last_activity_at: Some(instant),
            }
        }
        None => ActivityClassification::inactive(),
    }
}

/// Active/inactive split with a rounded percentage. Percentages round to
/// the nearest integer; a tie at .5 rounds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub active_pct: u32,
}

impl AggregateStats {
    pub fn from_counts(total: usize, active: usize) -> Self {
        Self {
            total,
            active,
            inactive: total.saturating_sub(active),
            active_pct: percent(active, total),
        }
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

pub fn org_stats(classifications: &[ActivityClassification]) -> AggregateStats {
    let active = classifications.iter().filter(|c| c.is_active).count();
    AggregateStats::from_counts(classifications.len(), active)
}

#[derive(Debug, Clone)]
pub struct TeamRollup {
    pub slug: String,
    pub name: Option<String>,
    pub stats: AggregateStats,
}

/// Per-team active/inactive split, keyed by assigning-team slug. Seats
/// without a team stay out of the rollups but remain in org-wide totals.
pub fn team_rollups(seats: &[SeatRecord], cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Vec<TeamRollup> {
    let mut teams: BTreeMap<String, (Option<String>, usize, usize)> = BTreeMap::new();

    for seat in seats {
        let Some(team) = &seat.assigning_team else {
            continue;
        };
        let entry = teams
            .entry(team.slug.clone())
            .or_insert_with(|| (team.name.clone(), 0, 0));
        entry.1 += 1;
        if classify_seat(seat, cutoff, now).is_active {
            entry.2 += 1;
        }
    }

    teams
        .into_iter()
        .map(|(slug, (name, total, active))| TeamRollup {
            slug,
            name,
            stats: AggregateStats::from_counts(total, active),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_snapshots::AssigningTeam;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn seat(login: &str, last_activity: Option<&str>, team: Option<&str>) -> SeatRecord {
        SeatRecord {
            login: login.to_string(),
            last_activity_at: last_activity.map(utc),
            last_activity_editor: None,
            enriched_name: None,
            assigning_team: team.map(|slug| AssigningTeam {
                slug: slug.to_string(),
                name: None,
                description: None,
            }),
        }
    }

    fn record(day: &str, active: bool) -> ActivityRecord {
        ActivityRecord {
            date: day.parse().unwrap(),
            user_id: "1".into(),
            email: "a@x.com".into(),
            is_active: active,
            lines_added: 0,
            lines_deleted: 0,
            accepted_lines_added: 0,
            total_accepts: 0,
            total_rejects: 0,
            total_tabs_shown: 0,
            total_tabs_accepted: 0,
            composer_requests: 0,
            chat_requests: 0,
            agent_requests: 0,
            cmdk_usages: 0,
        }
    }

    #[test]
    fn cutoff_is_start_of_day() {
        let now = utc("2026-08-08T15:42:10Z");
        let cutoff = cutoff_for(now, 7);
        assert_eq!(cutoff, utc("2026-08-01T00:00:00Z"));
    }

    #[test]
    fn cutoff_is_time_of_day_independent() {
        let morning = cutoff_for(utc("2026-08-08T00:01:00Z"), 7);
        let evening = cutoff_for(utc("2026-08-08T23:59:00Z"), 7);
        assert_eq!(morning, evening);
    }

    #[test]
    fn seat_active_within_window() {
        let now = utc("2026-08-08T12:00:00Z");
        let cutoff = cutoff_for(now, 7);

        let c = classify_seat(&seat("a", Some("2026-08-05T10:00:00Z"), None), cutoff, now);
        assert!(c.is_active);
        assert_eq!(c.days_since_last_activity, Some(3));
    }

    #[test]
    fn seat_inactive_outside_window() {
        let now = utc("2026-08-08T12:00:00Z");
        let cutoff = cutoff_for(now, 7);

        let c = classify_seat(&seat("a", Some("2026-07-29T10:00:00Z"), None), cutoff, now);
        assert!(!c.is_active);
        assert_eq!(c.days_since_last_activity, Some(10));
    }

    #[test]
    fn seat_without_timestamp_is_inactive_but_classified() {
        let now = utc("2026-08-08T12:00:00Z");
        let c = classify_seat(&seat("a", None, None), cutoff_for(now, 7), now);
        assert!(!c.is_active);
        assert_eq!(c.days_since_last_activity, None);
        assert_eq!(c.last_activity_at, None);
    }

    #[test]
    fn activity_stream_uses_most_recent_active_record() {
        let now = utc("2026-08-08T12:00:00Z");
        let cutoff = cutoff_for(now, 7);

        let records = vec![
            record("2026-08-02", true),
            record("2026-08-05", true),
            record("2026-08-06", false),
        ];
        let refs: Vec<&ActivityRecord> = records.iter().collect();

        let c = classify_activity(&refs, cutoff, now);
        assert!(c.is_active);
        // the inactive 08-06 record does not move last activity forward
        assert_eq!(c.last_activity_at, Some(utc("2026-08-05T00:00:00Z")));
        assert_eq!(c.days_since_last_activity, Some(3));
    }

    #[test]
    fn activity_stream_with_only_stale_records_is_inactive() {
        let now = utc("2026-08-08T12:00:00Z");
        let cutoff = cutoff_for(now, 7);

        let records = vec![record("2026-07-20", true)];
        let refs: Vec<&ActivityRecord> = records.iter().collect();

        let c = classify_activity(&refs, cutoff, now);
        assert!(!c.is_active);
        assert_eq!(c.days_since_last_activity, Some(19));
    }

    #[test]
    fn activity_stream_with_no_active_records_is_inactive() {
        let now = utc("2026-08-08T12:00:00Z");
        let records = vec![record("2026-08-05", false)];
        let refs: Vec<&ActivityRecord> = records.iter().collect();

        let c = classify_activity(&refs, cutoff_for(now, 7), now);
        assert_eq!(c, ActivityClassification::inactive());
    }

    #[test]
    fn percentages_round_half_up() {
        assert_eq!(AggregateStats::from_counts(2, 1).active_pct, 50);
        // 1/3 = 33.33.. → 33
        assert_eq!(AggregateStats::from_counts(3, 1).active_pct, 33);
        // 2/3 = 66.66.. → 67
        assert_eq!(AggregateStats::from_counts(3, 2).active_pct, 67);
        // 1/8 = 12.5 → 13
        assert_eq!(AggregateStats::from_counts(8, 1).active_pct, 13);
    }

    #[test]
    fn empty_population_is_zero_percent() {
        let stats = AggregateStats::from_counts(0, 0);
        assert_eq!(stats.active_pct, 0);
        assert_eq!(stats.inactive, 0);
    }

    #[test]
    fn teamless_seats_are_excluded_from_rollups() {
        let now = utc("2026-08-08T12:00:00Z");
        let cutoff = cutoff_for(now, 7);

        let seats = vec![
            seat("a", Some("2026-08-05T00:00:00Z"), Some("platform")),
            seat("b", None, Some("platform")),
            seat("c", Some("2026-08-06T00:00:00Z"), None),
        ];

        let rollups = team_rollups(&seats, cutoff, now);
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].slug, "platform");
        assert_eq!(rollups[0].stats.total, 2);
        assert_eq!(rollups[0].stats.active, 1);
        assert_eq!(rollups[0].stats.active_pct, 50);
    }

    #[test]
    fn rollups_are_slug_sorted() {
        let now = utc("2026-08-08T12:00:00Z");
        let cutoff = cutoff_for(now, 7);

        let seats = vec![
            seat("a", None, Some("zeta")),
            seat("b", None, Some("alpha")),
        ];
        let rollups = team_rollups(&seats, cutoff, now);
        assert_eq!(rollups[0].slug, "alpha");
        assert_eq!(rollups[1].slug, "zeta");
    }
}
