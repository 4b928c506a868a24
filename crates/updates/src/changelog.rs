//! Changelog rendering for update notifications

use crate::repo::CommitSummary;
use dk_core::escape_html;

/// Commits listed before the overflow footer
pub const CHANGELOG_LIMIT: usize = 10;

/// Render pending commits as HTML, newest first
///
/// Returns `None` when there is nothing pending.
pub fn render_changelog(commits: &[CommitSummary], limit: usize) -> Option<String> {
    if commits.is_empty() {
        return None;
    }

    let mut out = commits
        .iter()
        .take(limit)
        .map(|c| format!("<b>{}</b>: <i>{}</i>", escape_html(&c.id), escape_html(&c.message)))
        .collect::<Vec<_>>()
        .join("\n");

    if commits.len() > limit {
        out.push_str(&format!(
            "\n<i><b>🎥 And {} more...</b></i>",
            commits.len() - limit
        ));
    }

    Some(out)
}
