use std::fmt::Write;

use crate::aggregate::ActivityClassification;

use super::ReportData;

/// Free-text fields lose commas and line breaks instead of being quoted;
/// downstream spreadsheet importers choke on partial quoting far more often
/// than on slightly-mangled display names.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ',' && *c != '\n' && *c != '\r')
        .collect()
}

fn status(classification: Option<&ActivityClassification>, has_access: bool) -> &'static str {
    if !has_access {
        return "no-access";
    }
    match classification {
        Some(c) if c.is_active => "active",
        Some(_) => "inactive",
        None => "no-data",
    }
}

fn last_activity(classification: Option<&ActivityClassification>) -> String {
    classification
        .and_then(|c| c.last_activity_at)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_default()
}

fn days_since(classification: Option<&ActivityClassification>) -> String {
    classification
        .and_then(|c| c.days_since_last_activity)
        .map(|d| d.to_string())
        .unwrap_or_default()
}

/// Render the per-user CSV artifact. UTF-8 BOM first so spreadsheet tools
/// detect the encoding; one row per in-scope user.
pub fn render_csv(data: &ReportData) -> String {
    let mut output = String::from("\u{feff}");
    let _ = writeln!(
        output,
        "name,rosterName,email,githubLogin,role,hasCopilot,hasCursor,\
         copilotStatus,copilotLastActivity,copilotDaysSinceActivity,\
         cursorStatus,cursorLastActivity,cursorDaysSinceActivity"
    );

    for user in &data.users {
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            sanitize(&user.display_name),
            sanitize(&user.roster_name),
            sanitize(&user.email),
            sanitize(&user.github_login),
            sanitize(&user.role),
            user.has_copilot,
            user.has_cursor,
            status(user.copilot.as_ref(), user.has_copilot),
            last_activity(user.copilot.as_ref()),
            days_since(user.copilot.as_ref()),
            status(user.cursor.as_ref(), user.has_cursor),
            last_activity(user.cursor.as_ref()),
            days_since(user.cursor.as_ref())
        );
    }

    output
}
