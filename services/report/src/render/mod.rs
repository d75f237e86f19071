pub mod csv_out;
pub mod markdown;

use chrono::{DateTime, Utc};
use tandem_snapshots::StalenessWarning;

use crate::aggregate::{
    AcceptanceTotals, ActivityClassification, AggregateStats, TeamRollup, WindowSummary,
};

/// One in-scope user, fully joined: roster resolution plus both platform
/// classifications. `None` on a platform means no access or no data.
#[derive(Debug, Clone)]
pub struct UserDetail {
    pub display_name: String,
    pub roster_name: String,
    pub matched_fuzzily: bool,
    pub email: String,
    pub github_login: String,
    pub role: String,
    pub has_copilot: bool,
    pub has_cursor: bool,
    pub copilot: Option<ActivityClassification>,
    pub cursor: Option<ActivityClassification>,
}

#[derive(Debug, Clone)]
pub struct CopilotSection {
    pub stats: AggregateStats,
    pub teams: Vec<TeamRollup>,
    pub acceptance: Option<AcceptanceTotals>,
}

#[derive(Debug, Clone)]
pub struct CursorSection {
    pub stats: AggregateStats,
    pub window: Option<WindowSummary>,
    pub months: Vec<(String, WindowSummary)>,
}

/// Everything the renderers need, assembled in one pass by the report run.
/// Both artifacts (markdown and CSV) are generated from this single value
/// so they can never diverge.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub org: String,
    pub generated_at: DateTime<Utc>,
    pub lookback_days: i64,
    pub staleness: Vec<StalenessWarning>,
    pub roster_total: usize,
    pub users: Vec<UserDetail>,
    pub copilot: Option<CopilotSection>,
    pub cursor: Option<CursorSection>,
}
