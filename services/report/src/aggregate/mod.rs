pub mod acceptance;
pub mod activity;
pub mod window;

pub use acceptance::{acceptance_rate, AcceptanceTotals};
pub use activity::{
    classify_activity, classify_seat, cutoff_for, org_stats, team_rollups,
    ActivityClassification, AggregateStats, TeamRollup,
};
pub use window::{monthly_buckets, summarize_window, UserWindowSummary, WindowSummary};
