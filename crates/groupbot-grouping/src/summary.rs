//! Human-readable grouping summary.

use groupbot_core::types::GroupAssignment;

/// Maximum length of the group title shown in the summary.
const TRUNCATE_THRESHOLD: usize = 40;

/// Render the grouping result as a markdown summary: one
/// `**Group-<n>** - **<title>** :` header per group followed by the
/// comma-joined member names, excluding the creator. Deterministic for a
/// given assignment; the randomness all happened inside the split.
pub fn render_summary(
    assignment: &GroupAssignment,
    group_title: &str,
    creator_name: &str,
) -> String {
    let title = truncate_title(group_title.trim());
    let mut summary = String::new();

    for (index, members) in assignment.groups() {
        let names: Vec<&str> = members
            .iter()
            .filter(|m| !m.display_name.eq_ignore_ascii_case(creator_name))
            .map(|m| m.display_name.as_str())
            .collect();

        summary.push_str(&format!("**Group-{}** - **{}** :\n\n", index + 1, title));
        summary.push_str(&names.join(", "));
        summary.push_str("\n\n");
    }

    summary
}

/// Truncate at a character boundary and append an ellipsis when the title
/// exceeds the display threshold.
fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TRUNCATE_THRESHOLD {
        return title.to_string();
    }
    let truncated: String = title.chars().take(TRUNCATE_THRESHOLD).collect();
    format!("{truncated}...")
}
