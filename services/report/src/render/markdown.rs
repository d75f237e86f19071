use std::fmt::Write;

use crate::aggregate::{ActivityClassification, WindowSummary};

use super::ReportData;

fn classification_cell(
    classification: Option<&ActivityClassification>,
    has_access: bool,
) -> String {
    if !has_access {
        return "no access".to_string();
    }
    match classification {
        Some(c) if c.is_active => "active".to_string(),
        Some(c) => match c.days_since_last_activity {
            Some(days) => format!("inactive ({days}d ago)"),
            None => "inactive (never seen)".to_string(),
        },
        None => "no data".to_string(),
    }
}

fn write_window_table(output: &mut String, summary: &WindowSummary) {
    let _ = writeln!(
        output,
        "Window {} to {} ({} days)",
        summary.start, summary.end, summary.window_days
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "| User | Present days | Active days | Presence rate | Active rate | Avg lines/active day |"
    );
    let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- |");
    for user in &summary.users {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            user.email,
            user.present_days,
            user.active_days,
            user.presence_rate,
            user.active_rate,
            user.avg_lines_added_per_active_day
        );
    }
}

/// Render the markdown report. Section order is fixed (executive summary,
/// detailed breakdowns, per-team, per-user) so diffs between runs stay
/// meaningful.
pub fn build_report(data: &ReportData) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "# Cross-Platform Adoption Report: {}",
        data.org
    );
    let _ = writeln!(
        output,
        "Generated {} (lookback window {} days)",
        data.generated_at.format("%Y-%m-%d %H:%M UTC"),
        data.lookback_days
    );

    if !data.staleness.is_empty() {
        let _ = writeln!(output);
        for warning in &data.staleness {
            let _ = writeln!(output, "> Data caveat: {warning}");
        }
    }

    // ── Executive summary ───────────────────────────────────────────
    let _ = writeln!(output);
    let _ = writeln!(output, "## Executive Summary");
    let _ = writeln!(output, "- Roster members: {}", data.roster_total);
    let _ = writeln!(output, "- In-scope users: {}", data.users.len());

    match &data.copilot {
        Some(section) => {
            let _ = writeln!(
                output,
                "- Copilot seats: {} active / {} total ({}%)",
                section.stats.active, section.stats.total, section.stats.active_pct
            );
        }
        None => {
            let _ = writeln!(output, "- Copilot seats: no data available");
        }
    }
    match &data.cursor {
        Some(section) => {
            let _ = writeln!(
                output,
                "- Cursor users: {} active / {} total ({}%)",
                section.stats.active, section.stats.total, section.stats.active_pct
            );
        }
        None => {
            let _ = writeln!(output, "- Cursor users: no data available");
        }
    }

    // ── Copilot breakdown ───────────────────────────────────────────
    let _ = writeln!(output);
    let _ = writeln!(output, "## Copilot Breakdown");
    match &data.copilot {
        None => {
            let _ = writeln!(output, "No Copilot data available for this run.");
        }
        Some(section) => {
            let _ = writeln!(
                output,
                "- Seats: {} total, {} active, {} inactive ({}% active)",
                section.stats.total,
                section.stats.active,
                section.stats.inactive,
                section.stats.active_pct
            );
            match &section.acceptance {
                Some(totals) => {
                    let _ = writeln!(
                        output,
                        "- Acceptance by lines: {} accepted of {} suggested ({:.2}%)",
                        totals.lines_accepted,
                        totals.lines_suggested,
                        totals.lines_rate()
                    );
                    let _ = writeln!(
                        output,
                        "- Acceptance by count: {} accepted of {} suggested ({:.2}%)",
                        totals.acceptances,
                        totals.suggestions,
                        totals.count_rate()
                    );
                }
                None => {
                    let _ = writeln!(output, "- Acceptance metrics: no data available");
                }
            }

            let _ = writeln!(output);
            let _ = writeln!(output, "### Team Breakdown");
            if section.teams.is_empty() {
                let _ = writeln!(output, "No team assignments in this snapshot.");
            } else {
                let _ = writeln!(output, "| Team | Active | Total | Active % |");
                let _ = writeln!(output, "| --- | --- | --- | --- |");
                for team in &section.teams {
                    let _ = writeln!(
                        output,
                        "| {} | {} | {} | {}% |",
                        team.name.as_deref().unwrap_or(&team.slug),
                        team.stats.active,
                        team.stats.total,
                        team.stats.active_pct
                    );
                }
            }
        }
    }

    // ── Cursor breakdown ────────────────────────────────────────────
    let _ = writeln!(output);
    let _ = writeln!(output, "## Cursor Breakdown");
    match &data.cursor {
        None => {
            let _ = writeln!(output, "No Cursor data available for this run.");
        }
        Some(section) => {
            let _ = writeln!(
                output,
                "- Users observed: {} total, {} active, {} inactive ({}% active)",
                section.stats.total,
                section.stats.active,
                section.stats.inactive,
                section.stats.active_pct
            );
            let _ = writeln!(output);
            match &section.window {
                Some(summary) => write_window_table(&mut output, summary),
                None => {
                    let _ = writeln!(output, "No usage records in the current window.");
                }
            }

            if !section.months.is_empty() {
                let _ = writeln!(output);
                let _ = writeln!(output, "### Monthly Summaries");
                for (month, summary) in &section.months {
                    let _ = writeln!(output);
                    let _ = writeln!(output, "#### {month}");
                    let _ = writeln!(output);
                    write_window_table(&mut output, summary);
                }
            }
        }
    }

    // ── Per-user detail ─────────────────────────────────────────────
    let _ = writeln!(output);
    let _ = writeln!(output, "## Per-User Detail");
    if data.users.is_empty() {
        let _ = writeln!(output, "No lookup users resolve to the roster.");
    } else {
        let _ = writeln!(output, "| Name | Roster match | Role | Copilot | Cursor |");
        let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
        for user in &data.users {
            let roster = if user.matched_fuzzily {
                format!("{} (nickname match)", user.roster_name)
            } else {
                user.roster_name.clone()
            };
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                user.display_name,
                roster,
                user.role,
                classification_cell(user.copilot.as_ref(), user.has_copilot),
                classification_cell(user.cursor.as_ref(), user.has_cursor)
            );
        }
    }

    output
}
