use crate::groups::NameGroups;
use crate::normalize::normalize;

/// Two-tier name matching against a roster entry.
///
/// A normalized exact match always succeeds. Otherwise both names are split
/// on whitespace and must carry at least a first and a last token; the last
/// tokens must be exactly equal (surname match is mandatory, never fuzzy)
/// and the first tokens must be equal or nickname-equivalent.
///
/// Known limitation, kept deliberately: someone whose surname is rendered
/// differently across the two sources (e.g. a maiden name in the org
/// directory) will not match. Loosening the surname gate trades too much
/// precision for that recall.
pub fn names_match(candidate: &str, roster_name: &str, groups: &NameGroups) -> bool {
    let cand = normalize(candidate);
    let roster = normalize(roster_name);

    if cand.is_empty() || roster.is_empty() {
        return false;
    }
    if cand == roster {
        return true;
    }

    let cand_tokens: Vec<&str> = cand.split_whitespace().collect();
    let roster_tokens: Vec<&str> = roster.split_whitespace().collect();
    if cand_tokens.len() < 2 || roster_tokens.len() < 2 {
        return false;
    }

    if cand_tokens.last() != roster_tokens.last() {
        return false;
    }

    let cand_first = cand_tokens[0];
    let roster_first = roster_tokens[0];
    cand_first == roster_first || groups.are_variations(cand_first, roster_first)
}

/// First roster name that `candidate` resolves to, if any.
pub fn find_roster_match<'a>(
    candidate: &str,
    roster_names: &'a [String],
    groups: &NameGroups,
) -> Option<&'a str> {
    roster_names
        .iter()
        .find(|roster_name| names_match(candidate, roster_name, groups))
        .map(|s| s.as_str())
}
