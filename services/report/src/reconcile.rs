use std::collections::HashMap;

use tandem_matching::{find_roster_match, normalize, NameGroups};
use tandem_snapshots::{flatten_names, ActivityRecord, LookupUser, RosterPerson, SeatRecord};

/// A lookup-table user resolved to a roster node.
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub lookup: LookupUser,
    pub roster_name: String,
    pub matched_fuzzily: bool,
}

/// In-scope users: lookup entries whose name resolves to a roster node,
/// exactly or through the nickname-aware two-tier match.
///
/// Only roster inclusion is fuzzy. Platform linking (below) is exact by
/// login or email.
pub fn resolve_in_scope(
    roster: &[RosterPerson],
    lookup: &[LookupUser],
    groups: &NameGroups,
) -> Vec<ResolvedUser> {
    let roster_names = flatten_names(roster);
    let by_normalized: HashMap<String, &str> = roster_names
        .iter()
        .map(|name| (normalize(name), name.as_str()))
        .collect();

    let mut resolved = Vec::new();
    for user in lookup {
        if let Some(&display) = by_normalized.get(&normalize(&user.name)) {
            resolved.push(ResolvedUser {
                lookup: user.clone(),
                roster_name: display.to_string(),
                matched_fuzzily: false,
            });
        } else if let Some(matched_name) = find_roster_match(&user.name, &roster_names, groups) {
            tracing::debug!(lookup_name = %user.name, roster_name = %matched_name, "fuzzy roster match");
            resolved.push(ResolvedUser {
                lookup: user.clone(),
                roster_name: matched_name.to_string(),
                matched_fuzzily: true,
            });
        }
    }
    resolved
}

/// Seat index keyed by exact login.
pub fn index_seats(seats: &[SeatRecord]) -> HashMap<&str, &SeatRecord> {
    seats
        .iter()
        .map(|seat| (seat.login.as_str(), seat))
        .collect()
}

/// Activity index keyed by lowercased email.
pub fn index_activity(records: &[ActivityRecord]) -> HashMap<String, Vec<&ActivityRecord>> {
    let mut index: HashMap<String, Vec<&ActivityRecord>> = HashMap::new();
    for record in records {
        index
            .entry(record.email.to_lowercase())
            .or_default()
            .push(record);
    }
    index
}

/// The seat linked to a user, by exact `github_login` match.
pub fn seat_for<'a>(
    user: &LookupUser,
    seats: &HashMap<&str, &'a SeatRecord>,
) -> Option<&'a SeatRecord> {
    if user.github_login.is_empty() {
        return None;
    }
    seats.get(user.github_login.as_str()).copied()
}

/// The activity stream linked to a user, by case-insensitive email match.
pub fn activity_for<'a>(
    user: &LookupUser,
    activity: &'a HashMap<String, Vec<&'a ActivityRecord>>,
) -> &'a [&'a ActivityRecord] {
    if user.email.is_empty() {
        return &[];
    }
    activity
        .get(&user.email.to_lowercase())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
