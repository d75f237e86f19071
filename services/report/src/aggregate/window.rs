use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tandem_snapshots::ActivityRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct UserWindowSummary {
    pub email: String,
    pub present_days: usize,
    pub active_days: usize,
    pub presence_rate: String,
    pub active_rate: String,
    pub total_lines_added: u64,
    pub avg_lines_added_per_active_day: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub window_days: i64,
    pub users: Vec<UserWindowSummary>,
}

/// Overlapping fetch windows repeat user-days; keep one record per
/// (email, date), preferring the richest row so a partial early fetch never
/// shadows the complete one. The ordering is deterministic regardless of
/// input order.
fn dedupe(records: &[ActivityRecord]) -> Vec<&ActivityRecord> {
    let mut by_key: HashMap<(String, NaiveDate), &ActivityRecord> = HashMap::new();
    for record in records {
        let key = (record.email.to_lowercase(), record.date);
        match by_key.get(&key) {
            Some(existing) if richness(existing) >= richness(record) => {}
            _ => {
                by_key.insert(key, record);
            }
        }
    }
    let mut deduped: Vec<&ActivityRecord> = by_key.into_values().collect();
    deduped.sort_by(|a, b| (a.email.to_lowercase(), a.date).cmp(&(b.email.to_lowercase(), b.date)));
    deduped
}

fn richness(record: &ActivityRecord) -> (bool, u64, u64, u64) {
    (
        record.is_active,
        record.lines_added,
        record.accepted_lines_added,
        record.total_accepts,
    )
}

/// Per-user presence/activity summary over the window actually covered by
/// the data: bounds come from the observed min/max dates, not from any
/// requested range, so a partial fetch yields an internally-consistent
/// window.
pub fn summarize_window(records: &[ActivityRecord]) -> Option<WindowSummary> {
    let deduped = dedupe(records);
    let start = deduped.iter().map(|r| r.date).min()?;
    let end = deduped.iter().map(|r| r.date).max()?;
    let window_days = (end - start).num_days() + 1;

    let mut per_user: BTreeMap<String, (usize, usize, u64)> = BTreeMap::new();
    for record in &deduped {
        let entry = per_user.entry(record.email.to_lowercase()).or_insert((0, 0, 0));
        entry.0 += 1;
        if record.is_active {
            entry.1 += 1;
        }
        entry.2 += record.lines_added;
    }

    let users = per_user
        .into_iter()
        .map(|(email, (present_days, active_days, total_lines_added))| {
            let avg = if active_days == 0 {
                "0.00".to_string()
            } else {
                format!("{:.2}", total_lines_added as f64 / active_days as f64)
            };
            UserWindowSummary {
                email,
                present_days,
                active_days,
                presence_rate: format!("{:.4}", present_days as f64 / window_days as f64),
                active_rate: format!("{:.4}", active_days as f64 / window_days as f64),
                total_lines_added,
                avg_lines_added_per_active_day: avg,
            }
        })
        .collect();

    Some(WindowSummary {
        start,
        end,
        window_days,
        users,
    })
}

/// Calendar-month buckets (`YYYY-MM` of each record's date), independent of
/// which snapshot file a record came from, so overlapping monthly fetches
/// accumulate into the same bucket.
pub fn monthly_buckets(records: &[ActivityRecord]) -> Vec<(String, WindowSummary)> {
    let mut by_month: BTreeMap<String, Vec<ActivityRecord>> = BTreeMap::new();
    for record in records {
        by_month
            .entry(record.date.format("%Y-%m").to_string())
            .or_default()
            .push(record.clone());
    }

    by_month
        .into_iter()
        .filter_map(|(month, month_records)| {
            summarize_window(&month_records).map(|summary| (month, summary))
        })
        .collect()
}
