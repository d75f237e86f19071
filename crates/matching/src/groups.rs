use std::collections::HashMap;
use std::path::Path;

use tandem_common::error::{TandemError, TandemResult};

use crate::normalize::normalize;

/// Equivalence groups of interchangeable given names.
///
/// The first member of each group is the canonical form. Membership is
/// indexed by normalized name; a name belongs to at most one group.
#[derive(Debug, Clone, Default)]
pub struct NameGroups {
    groups: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl NameGroups {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from raw groups, validating that no name appears in
    /// more than one group. Blank entries are dropped; a group left with
    /// fewer than two members carries no equivalence information and is
    /// dropped as well.
    pub fn from_groups(raw: Vec<Vec<String>>) -> TandemResult<Self> {
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for raw_group in raw {
            let members: Vec<String> = raw_group
                .iter()
                .map(|m| normalize(m.trim()))
                .filter(|m| !m.is_empty())
                .collect();
            if members.len() < 2 {
                continue;
            }

            let group_id = groups.len();
            for member in &members {
                match index.get(member) {
                    Some(&existing) if existing != group_id => {
                        return Err(TandemError::Config(format!(
                            "name equivalence config invalid: \"{member}\" appears in more than one group"
                        )));
                    }
                    _ => {
                        index.insert(member.clone(), group_id);
                    }
                }
            }
            groups.push(members);
        }

        Ok(Self { groups, index })
    }

    /// Parse a JSON array of arrays of strings from `path`.
    pub fn load(path: &Path) -> TandemResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TandemError::NotFound(format!(
                "name equivalence config {}: {e}",
                path.display()
            ))
        })?;
        let parsed: Vec<Vec<String>> = serde_json::from_str(&raw).map_err(|e| {
            TandemError::Config(format!(
                "name equivalence config {} is not an array of string arrays: {e}",
                path.display()
            ))
        })?;
        Self::from_groups(parsed)
    }

    /// Load the table, degrading to an empty one on any failure.
    ///
    /// Identity matching must never crash a report run: a missing or
    /// malformed config means exact-match-only resolution, with a logged
    /// configuration warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "name equivalence config unusable, falling back to exact-match-only"
                );
                Self::empty()
            }
        }
    }

    /// True iff the two names are the same after normalization, or both
    /// belong to the same equivalence group.
    pub fn are_variations(&self, a: &str, b: &str) -> bool {
        let na = normalize(a.trim());
        let nb = normalize(b.trim());
        if na.is_empty() || nb.is_empty() {
            return false;
        }
        if na == nb {
            return true;
        }
        match (self.index.get(&na), self.index.get(&nb)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    /// The canonical (first) member of the owning group, or the normalized
    /// input unchanged when no group claims it.
    pub fn canonical_form(&self, name: &str) -> String {
        let n = normalize(name.trim());
        match self.index.get(&n) {
            Some(&g) => self.groups[g][0].clone(),
            None => n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}
