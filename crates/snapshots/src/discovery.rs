use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

/// Snapshot walking never descends more than this many levels below the
/// data root; dated partition trees are at most `source/YYYY-MM-DD/file`.
const MAX_WALK_DEPTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotCategory {
    Seats,
    OrgMetrics,
    Roster,
    UserLookup,
    DailyActivity,
    WeeklyActivity,
    MonthlyActivity,
}

impl SnapshotCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seats => "copilot-seats",
            Self::OrgMetrics => "copilot-metrics",
            Self::Roster => "roster",
            Self::UserLookup => "user-lookup",
            Self::DailyActivity => "cursor-daily",
            Self::WeeklyActivity => "cursor-weekly",
            Self::MonthlyActivity => "cursor-monthly",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::UserLookup => ".csv",
            _ => ".json",
        }
    }

    /// Organization-scoped naming convention, e.g.
    /// `acme_copilot-seats_2026-08-01.json`. Categories without an org slug
    /// in their filenames use their fixed convention here.
    fn strict_matches(&self, file_name: &str, org: &str) -> bool {
        match self {
            Self::Seats | Self::OrgMetrics => {
                file_name.starts_with(&format!("{org}_{}_", self.as_str()))
                    && file_name.ends_with(self.extension())
            }
            Self::Roster => file_name == "roster.json",
            Self::UserLookup => file_name == "user-lookup.csv",
            Self::DailyActivity | Self::WeeklyActivity | Self::MonthlyActivity => {
                file_name.starts_with(&format!("{}_", self.as_str()))
                    && file_name.ends_with(self.extension())
            }
        }
    }

    /// Loose fallback: any file carrying the category token, regardless of
    /// org slug. Real deployments accumulate files fetched under historical
    /// org slugs that no longer match the configured one.
    fn loose_matches(&self, file_name: &str) -> bool {
        file_name.contains(self.as_str()) && file_name.ends_with(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessWarning {
    pub path: PathBuf,
    pub age_days: i64,
    pub max_age_days: i64,
}

impl fmt::Display for StalenessWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {} days old (threshold {} days)",
            self.path.display(),
            self.age_days,
            self.max_age_days
        )
    }
}

fn files_under(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .max_depth(MAX_WALK_DEPTH)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

/// Most relevant snapshot for a category: the lexicographically-last
/// strictly-matching path (zero-padded dates in the filenames make string
/// order equal recency order), falling back to the most recently modified
/// loosely-matching file anywhere under the root.
pub fn find_latest(category: SnapshotCategory, root: &Path, org: &str) -> Option<PathBuf> {
    let strict = files_under(root)
        .filter(|p| category.strict_matches(&file_name(p), org))
        .max_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    if strict.is_some() {
        return strict;
    }

    let loose = files_under(root)
        .filter(|p| category.loose_matches(&file_name(p)))
        .max_by_key(|p| modified_at(p));
    if let Some(ref p) = loose {
        tracing::warn!(
            category = category.as_str(),
            path = %p.display(),
            "no org-scoped snapshot found, using loose filename match"
        );
    }
    loose
}

/// Every matching snapshot for a category, path-sorted. Used where
/// overlapping fetches must accumulate (monthly/weekly activity).
pub fn find_all(category: SnapshotCategory, root: &Path, org: &str) -> Vec<PathBuf> {
    let mut strict: Vec<PathBuf> = files_under(root)
        .filter(|p| category.strict_matches(&file_name(p), org))
        .collect();
    if strict.is_empty() {
        strict = files_under(root)
            .filter(|p| category.loose_matches(&file_name(p)))
            .collect();
    }
    strict.sort();
    strict
}

/// Advisory staleness check against the file's modification time.
/// Never blocks a report; the caller renders the warning as a caveat.
pub fn freshness_warning(
    path: &Path,
    max_age_days: i64,
    now: DateTime<Utc>,
) -> Option<StalenessWarning> {
    let modified: DateTime<Utc> = modified_at(path)?.into();
    let age_days = (now - modified).num_days();
    if age_days > max_age_days {
        Some(StalenessWarning {
            path: path.to_path_buf(),
            age_days,
            max_age_days,
        })
    } else {
        None
    }
}
