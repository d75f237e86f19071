use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tandem_common::error::{TandemError, TandemResult};

/// One node of the organizational chart. Ownership flows parent to child
/// only, so a well-formed tree cannot cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterPerson {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "directReports")]
    pub direct_reports: Vec<RosterPerson>,
}

/// Load the roster tree: a JSON object with a single top-level key whose
/// value is either one root node or an array of root nodes.
///
/// A missing or unparseable roster is fatal to a report run.
pub fn load_roster(path: &Path) -> TandemResult<Vec<RosterPerson>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| TandemError::NotFound(format!("roster file {}: {e}", path.display())))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| TandemError::Snapshot(format!("roster file {}: {e}", path.display())))?;

    let object = value.as_object().ok_or_else(|| {
        TandemError::Snapshot(format!(
            "roster file {}: expected a JSON object with one top-level key",
            path.display()
        ))
    })?;
    if object.len() != 1 {
        return Err(TandemError::Snapshot(format!(
            "roster file {}: expected exactly one top-level key, found {}",
            path.display(),
            object.len()
        )));
    }

    let (_, root) = object.iter().next().expect("len checked above");
    let roots: Vec<RosterPerson> = match root {
        Value::Array(_) => serde_json::from_value(root.clone()),
        _ => serde_json::from_value(root.clone()).map(|node| vec![node]),
    }
    .map_err(|e| TandemError::Snapshot(format!("roster file {}: {e}", path.display())))?;

    Ok(roots)
}

/// Every display name in the tree, depth-first, each name once.
///
/// The visited set is a guard against malformed input that repeats subtrees;
/// a well-formed org chart never trips it.
pub fn flatten_names(roots: &[RosterPerson]) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&RosterPerson> = roots.iter().rev().collect();

    while let Some(person) = stack.pop() {
        if seen.insert(person.name.as_str()) {
            names.push(person.name.clone());
        }
        for child in person.direct_reports.iter().rev() {
            stack.push(child);
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_roster(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();
        file
    }

    #[test]
    fn loads_single_root_under_one_key() {
        let file = write_roster(
            r#"{"organization": {
                "name": "Dana Whitfield",
                "title": "VP Engineering",
                "directReports": [
                    {"name": "Robert Chen", "username": "rchen", "directReports": []},
                    {"name": "Maria Lopez", "directReports": [
                        {"name": "Sam Ortiz", "directReports": []}
                    ]}
                ]
            }}"#,
        );

        let roots = load_roster(file.path()).expect("should load");
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Dana Whitfield");
        assert_eq!(roots[0].direct_reports.len(), 2);
    }

    #[test]
    fn loads_array_of_roots() {
        let file = write_roster(
            r#"{"teams": [
                {"name": "A Lead", "directReports": []},
                {"name": "B Lead", "directReports": []}
            ]}"#,
        );
        let roots = load_roster(file.path()).expect("should load");
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn node_without_direct_reports_key_is_a_leaf() {
        let file = write_roster(r#"{"org": {"name": "Solo Person"}}"#);
        let roots = load_roster(file.path()).expect("should load");
        assert!(roots[0].direct_reports.is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_roster(Path::new("/no/such/roster.json")).unwrap_err();
        assert!(matches!(err, TandemError::NotFound(_)));
    }

    #[test]
    fn unparseable_file_is_snapshot_error() {
        let file = write_roster("not json at all");
        let err = load_roster(file.path()).unwrap_err();
        assert!(matches!(err, TandemError::Snapshot(_)));
    }

    #[test]
    fn multiple_top_level_keys_are_rejected() {
        let file = write_roster(r#"{"a": {"name": "X"}, "b": {"name": "Y"}}"#);
        let err = load_roster(file.path()).unwrap_err();
        assert!(err.to_string().contains("one top-level key"), "got: {err}");
    }

    #[test]
    fn flatten_walks_depth_first() {
        let roots = vec![RosterPerson {
            name: "Dana".into(),
            username: None,
            title: None,
            direct_reports: vec![
                RosterPerson {
                    name: "Robert".into(),
                    username: None,
                    title: None,
                    direct_reports: vec![RosterPerson {
                        name: "Sam".into(),
                        username: None,
                        title: None,
                        direct_reports: vec![],
                    }],
                },
                RosterPerson {
                    name: "Maria".into(),
                    username: None,
                    title: None,
                    direct_reports: vec![],
                },
            ],
        }];

        assert_eq!(flatten_names(&roots), vec!["Dana", "Robert", "Sam", "Maria"]);
    }

    #[test]
    fn flatten_deduplicates_repeated_nodes() {
        let dup = RosterPerson {
            name: "Twice Listed".into(),
            username: None,
            title: None,
            direct_reports: vec![],
        };
        let roots = vec![dup.clone(), dup];
        assert_eq!(flatten_names(&roots).len(), 1);
    }
}
