mod aggregate;
mod confirm;
mod reconcile;
mod render;
mod run;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tandem_config::{init_tracing, AppConfig};
use tandem_snapshots::{find_latest, freshness_warning, SnapshotCategory};

use crate::confirm::{AlwaysAllow, OverwritePolicy, PromptStdin};
use crate::run::{generate_report, ReportOptions, ReportOutcome};

#[derive(Parser)]
#[command(name = "tandem-report")]
#[command(about = "Cross-platform AI-assistant adoption reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the adoption report from the newest snapshots
    Report {
        #[arg(long)]
        lookback_days: Option<i64>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Explicit roster file (otherwise discovered in the data directory)
        #[arg(long)]
        roster: Option<PathBuf>,
        /// Explicit user-lookup file (otherwise discovered in the data directory)
        #[arg(long)]
        lookup: Option<PathBuf>,
        /// Explicit name-equivalence config
        #[arg(long)]
        name_groups: Option<PathBuf>,
        /// Skip the overwrite confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List discovered snapshots and their freshness
    Freshness,
}

fn main() -> anyhow::Result<()> {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Report {
            lookback_days,
            data_dir,
            output_dir,
            roster,
            lookup,
            name_groups,
            yes,
        } => {
            let options = ReportOptions {
                org: config.org.clone(),
                lookback_days: lookback_days.unwrap_or(config.lookback_days),
                data_dir: data_dir.unwrap_or_else(|| config.data_dir.clone()),
                output_dir: output_dir.unwrap_or_else(|| config.reports_dir.clone()),
                roster_path: roster,
                lookup_path: lookup,
                name_groups_path: name_groups,
                freshness_max_age_days: config.freshness_max_age_days,
                skip_confirmation: yes,
                now: None,
            };

            let policy: Box<dyn OverwritePolicy> = if yes {
                Box::new(AlwaysAllow)
            } else {
                Box::new(PromptStdin)
            };

            match generate_report(&options, policy.as_ref())? {
                ReportOutcome::Written {
                    output_path,
                    timestamped_path,
                    csv_path,
                    stats,
                } => {
                    println!("Report written to {}", output_path.display());
                    println!("History copy at {}", timestamped_path.display());
                    println!("CSV at {}", csv_path.display());
                    println!(
                        "Roster {} members, {} in scope",
                        stats.roster_total, stats.in_scope
                    );
                    if let Some(copilot) = stats.copilot {
                        println!(
                            "Copilot: {}/{} active ({}%)",
                            copilot.active, copilot.total, copilot.active_pct
                        );
                    }
                    if let Some(cursor) = stats.cursor {
                        println!(
                            "Cursor: {}/{} active ({}%)",
                            cursor.active, cursor.total, cursor.active_pct
                        );
                    }
                }
                ReportOutcome::Cancelled => {
                    println!("Cancelled.");
                }
            }
        }
        Commands::Freshness => {
            let now = Utc::now();
            for category in [
                SnapshotCategory::Seats,
                SnapshotCategory::OrgMetrics,
                SnapshotCategory::Roster,
                SnapshotCategory::UserLookup,
                SnapshotCategory::DailyActivity,
                SnapshotCategory::WeeklyActivity,
                SnapshotCategory::MonthlyActivity,
            ] {
                match find_latest(category, &config.data_dir, &config.org) {
                    Some(path) => {
                        match freshness_warning(&path, config.freshness_max_age_days, now) {
                            Some(warning) => {
                                println!("{:<16} STALE {}", category.as_str(), warning)
                            }
                            None => println!("{:<16} ok    {}", category.as_str(), path.display()),
                        }
                    }
                    None => println!("{:<16} missing", category.as_str()),
                }
            }
        }
    }

    Ok(())
}
