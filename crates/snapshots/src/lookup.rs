use std::path::Path;

use serde::{Deserialize, Serialize};
use tandem_common::error::{TandemError, TandemResult};

/// One row of the curated identity table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupUser {
    pub name: String,
    pub email: String,
    pub github_login: String,
    pub role: String,
    pub has_copilot: bool,
    pub has_cursor: bool,
}

impl LookupUser {
    /// Users with neither access flag stay in roster totals but are
    /// excluded from platform activity analysis.
    pub fn has_any_access(&self) -> bool {
        self.has_copilot || self.has_cursor
    }
}

fn boolish(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

/// Load the user-lookup CSV: fixed column order
/// `name, email, githubLogin, role, hasCopilot, hasCursor`.
///
/// Malformed rows are dropped with a warning; a missing file is fatal.
pub fn load_lookup(path: &Path) -> TandemResult<Vec<LookupUser>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| TandemError::NotFound(format!("user lookup {}: {e}", path.display())))?;

    let mut users = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), row, error = %e, "skipping unreadable lookup row");
                continue;
            }
        };

        let name = record.get(0).unwrap_or("").trim();
        if name.is_empty() {
            tracing::warn!(path = %path.display(), row, "skipping lookup row without a name");
            continue;
        }

        users.push(LookupUser {
            name: name.to_string(),
            email: record.get(1).unwrap_or("").trim().to_string(),
            github_login: record.get(2).unwrap_or("").trim().to_string(),
            role: record.get(3).unwrap_or("").trim().to_string(),
            has_copilot: boolish(record.get(4).unwrap_or("")),
            has_cursor: boolish(record.get(5).unwrap_or("")),
        });
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn loads_well_formed_rows() {
        let file = write_csv(
            "name,email,githubLogin,role,hasCopilot,hasCursor\n\
             Bob Chen,bob@x.com,bchen,IC,true,false\n\
             Maria Lopez,maria@x.com,mlopez,Manager,yes,1\n",
        );

        let users = load_lookup(file.path()).expect("should load");
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Bob Chen");
        assert!(users[0].has_copilot);
        assert!(!users[0].has_cursor);
        assert!(users[1].has_copilot);
        assert!(users[1].has_cursor);
    }

    #[test]
    fn boolish_accepts_variants_case_insensitively() {
        for yes in ["true", "TRUE", "1", "yes", "Yes", "Y", " y "] {
            assert!(boolish(yes), "{yes} should be true");
        }
        for no in ["false", "0", "no", "n", "", "maybe"] {
            assert!(!boolish(no), "{no} should be false");
        }
    }

    #[test]
    fn nameless_rows_are_skipped() {
        let file = write_csv(
            "name,email,githubLogin,role,hasCopilot,hasCursor\n\
             ,orphan@x.com,orphan,IC,true,true\n\
             Bob Chen,bob@x.com,bchen,IC,true,false\n",
        );
        let users = load_lookup(file.path()).expect("should load");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Bob Chen");
    }

    #[test]
    fn short_rows_default_missing_fields() {
        let file = write_csv(
            "name,email,githubLogin,role,hasCopilot,hasCursor\n\
             Short Row,short@x.com\n",
        );
        let users = load_lookup(file.path()).expect("should load");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].github_login, "");
        assert!(!users[0].has_copilot);
        assert!(!users[0].has_any_access());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_lookup(Path::new("/no/such/lookup.csv")).unwrap_err();
        assert!(matches!(err, TandemError::NotFound(_)));
    }

    #[test]
    fn has_any_access_reflects_either_flag() {
        let mut user = LookupUser {
            name: "A".into(),
            email: String::new(),
            github_login: String::new(),
            role: String::new(),
            has_copilot: false,
            has_cursor: false,
        };
        assert!(!user.has_any_access());
        user.has_cursor = true;
        assert!(user.has_any_access());
    }
}
