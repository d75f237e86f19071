use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tandem_matching::NameGroups;
use tandem_snapshots::{
    find_all, find_latest, flatten_names, freshness_warning, load_activity, load_lookup,
    load_metrics, load_roster, load_seats, ActivityRecord, MetricsSnapshot, SeatSnapshot,
    SnapshotCategory, StalenessWarning,
};

use crate::aggregate::{
    classify_activity, classify_seat, cutoff_for, monthly_buckets, org_stats, summarize_window,
    team_rollups, AcceptanceTotals, AggregateStats,
};
use crate::confirm::OverwritePolicy;
use crate::reconcile::{activity_for, index_activity, index_seats, resolve_in_scope, seat_for};
use crate::render::{csv_out, markdown, CopilotSection, CursorSection, ReportData, UserDetail};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub org: String,
    pub lookback_days: i64,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub roster_path: Option<PathBuf>,
    pub lookup_path: Option<PathBuf>,
    pub name_groups_path: Option<PathBuf>,
    pub freshness_max_age_days: i64,
    pub skip_confirmation: bool,
    /// Explicit clock for reproducible runs; `None` reads the wall clock
    /// once at the start of the run.
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ReportStats {
    pub roster_total: usize,
    pub in_scope: usize,
    pub copilot: Option<AggregateStats>,
    pub cursor: Option<AggregateStats>,
}

#[derive(Debug)]
pub enum ReportOutcome {
    Written {
        output_path: PathBuf,
        timestamped_path: PathBuf,
        csv_path: PathBuf,
        stats: ReportStats,
    },
    Cancelled,
}

fn load_optional_seats(
    options: &ReportOptions,
    now: DateTime<Utc>,
    staleness: &mut Vec<StalenessWarning>,
) -> Option<SeatSnapshot> {
    let path = find_latest(SnapshotCategory::Seats, &options.data_dir, &options.org)?;
    match load_seats(&path) {
        Ok(snapshot) => {
            staleness.extend(freshness_warning(&path, options.freshness_max_age_days, now));
            Some(snapshot)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "seat snapshot unusable, copilot section downgraded to no data");
            None
        }
    }
}

fn load_optional_metrics(
    options: &ReportOptions,
    now: DateTime<Utc>,
    staleness: &mut Vec<StalenessWarning>,
) -> Option<MetricsSnapshot> {
    let path = find_latest(SnapshotCategory::OrgMetrics, &options.data_dir, &options.org)?;
    match load_metrics(&path) {
        Ok(snapshot) => {
            staleness.extend(freshness_warning(&path, options.freshness_max_age_days, now));
            Some(snapshot)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "metrics snapshot unusable, acceptance section downgraded to no data");
            None
        }
    }
}

/// Union of the newest daily and weekly snapshots plus every monthly file,
/// so overlapping fetch windows accumulate. Returns `None` when no activity
/// snapshot loaded at all (as opposed to loaded-but-empty).
fn load_optional_activity(
    options: &ReportOptions,
    now: DateTime<Utc>,
    staleness: &mut Vec<StalenessWarning>,
) -> Option<Vec<ActivityRecord>> {
    let mut paths = Vec::new();
    for category in [
        SnapshotCategory::DailyActivity,
        SnapshotCategory::WeeklyActivity,
    ] {
        if let Some(path) = find_latest(category, &options.data_dir, &options.org) {
            staleness.extend(freshness_warning(&path, options.freshness_max_age_days, now));
            paths.push(path);
        }
    }
    // monthly history files are expected to be old; no staleness check
    paths.extend(find_all(
        SnapshotCategory::MonthlyActivity,
        &options.data_dir,
        &options.org,
    ));
    paths.sort();
    paths.dedup();

    let mut records = Vec::new();
    let mut loaded_any = false;
    for path in &paths {
        match load_activity(path) {
            Ok(mut file_records) => {
                loaded_any = true;
                records.append(&mut file_records);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "activity snapshot unusable, skipping file");
            }
        }
    }

    loaded_any.then_some(records)
}

/// One report run: discover, load, reconcile, aggregate, render once, write
/// the canonical and timestamped artifacts.
pub fn generate_report(
    options: &ReportOptions,
    policy: &dyn OverwritePolicy,
) -> anyhow::Result<ReportOutcome> {
    let now = options.now.unwrap_or_else(Utc::now);
    let cutoff = cutoff_for(now, options.lookback_days);

    let canonical_md = options.output_dir.join("adoption-report.md");
    if !options.skip_confirmation
        && canonical_md.exists()
        && !policy.confirm_overwrite(&canonical_md)
    {
        tracing::info!("report cancelled at overwrite confirmation");
        return Ok(ReportOutcome::Cancelled);
    }

    // Roster and lookup are hard requirements; everything platform-side
    // degrades per file.
    let roster_path = options
        .roster_path
        .clone()
        .or_else(|| find_latest(SnapshotCategory::Roster, &options.data_dir, &options.org))
        .with_context(|| {
            format!(
                "roster file not found under {}; pass --roster or place roster.json in the data directory",
                options.data_dir.display()
            )
        })?;
    let lookup_path = options
        .lookup_path
        .clone()
        .or_else(|| find_latest(SnapshotCategory::UserLookup, &options.data_dir, &options.org))
        .with_context(|| {
            format!(
                "user lookup not found under {}; pass --lookup or place user-lookup.csv in the data directory",
                options.data_dir.display()
            )
        })?;

    let roster = load_roster(&roster_path)?;
    let lookup = load_lookup(&lookup_path)?;

    let groups_path = options
        .name_groups_path
        .clone()
        .unwrap_or_else(|| options.data_dir.join("name-groups.json"));
    let groups = NameGroups::load_or_default(&groups_path);

    let mut staleness = Vec::new();
    let seats = load_optional_seats(options, now, &mut staleness);
    let metrics = load_optional_metrics(options, now, &mut staleness);
    let cursor_records = load_optional_activity(options, now, &mut staleness);

    // ── Reconcile ───────────────────────────────────────────────────
    let resolved = resolve_in_scope(&roster, &lookup, &groups);
    let seat_index = seats.as_ref().map(|s| index_seats(&s.seats));
    let activity_index = cursor_records.as_ref().map(|r| index_activity(r));

    let users: Vec<UserDetail> = resolved
        .iter()
        .map(|r| {
            let copilot = match (&seat_index, r.lookup.has_copilot) {
                (Some(index), true) => {
                    seat_for(&r.lookup, index).map(|seat| classify_seat(seat, cutoff, now))
                }
                _ => None,
            };
            let cursor = match (&activity_index, r.lookup.has_cursor) {
                (Some(index), true) => {
                    let stream = activity_for(&r.lookup, index);
                    (!stream.is_empty()).then(|| classify_activity(stream, cutoff, now))
                }
                _ => None,
            };
            UserDetail {
                display_name: r.lookup.name.clone(),
                roster_name: r.roster_name.clone(),
                matched_fuzzily: r.matched_fuzzily,
                email: r.lookup.email.clone(),
                github_login: r.lookup.github_login.clone(),
                role: r.lookup.role.clone(),
                has_copilot: r.lookup.has_copilot,
                has_cursor: r.lookup.has_cursor,
                copilot,
                cursor,
            }
        })
        .collect();

    // ── Aggregate ───────────────────────────────────────────────────
    let copilot_section = if seats.is_some() || metrics.is_some() {
        let seat_records = seats.as_ref().map(|s| s.seats.as_slice()).unwrap_or(&[]);
        let classifications: Vec<_> = seat_records
            .iter()
            .map(|seat| classify_seat(seat, cutoff, now))
            .collect();
        Some(CopilotSection {
            stats: org_stats(&classifications),
            teams: team_rollups(seat_records, cutoff, now),
            acceptance: metrics.as_ref().map(AcceptanceTotals::from_snapshot),
        })
    } else {
        None
    };

    let cursor_section = cursor_records.as_ref().map(|records| {
        let index = index_activity(records);
        let classifications: Vec<_> = index
            .values()
            .map(|stream| classify_activity(stream, cutoff, now))
            .collect();
        let window_records: Vec<ActivityRecord> = records
            .iter()
            .filter(|r| r.date >= cutoff.date_naive())
            .cloned()
            .collect();
        CursorSection {
            stats: org_stats(&classifications),
            window: summarize_window(&window_records),
            months: monthly_buckets(records),
        }
    });

    let stats = ReportStats {
        roster_total: flatten_names(&roster).len(),
        in_scope: users.len(),
        copilot: copilot_section.as_ref().map(|s| s.stats),
        cursor: cursor_section.as_ref().map(|s| s.stats),
    };

    // ── Render once, write both artifacts ───────────────────────────
    let data = ReportData {
        org: options.org.clone(),
        generated_at: now,
        lookback_days: options.lookback_days,
        staleness,
        roster_total: stats.roster_total,
        users,
        copilot: copilot_section,
        cursor: cursor_section,
    };

    let markdown_content = markdown::build_report(&data);
    let csv_content = csv_out::render_csv(&data);

    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let stamp = now.format("%Y%m%d-%H%M%S");
    let timestamped_md = options.output_dir.join(format!("adoption-report_{stamp}.md"));
    let canonical_csv = options.output_dir.join("adoption-report.csv");
    let timestamped_csv = options.output_dir.join(format!("adoption-report_{stamp}.csv"));

    std::fs::write(&canonical_md, &markdown_content)?;
    std::fs::write(&timestamped_md, &markdown_content)?;
    std::fs::write(&canonical_csv, &csv_content)?;
    std::fs::write(&timestamped_csv, &csv_content)?;

    tracing::info!(
        output = %canonical_md.display(),
        history = %timestamped_md.display(),
        in_scope = stats.in_scope,
        "report written"
    );

    Ok(ReportOutcome::Written {
        output_path: canonical_md,
        timestamped_path: timestamped_md,
        csv_path: canonical_csv,
        stats,
    })
}
