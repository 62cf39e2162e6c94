//! Plain-text rendering of comments and feedback for terminals and logs.
//!
//! The output is meant for people, not machines; only the JSON documents
//! are normative.

use chrono::{DateTime, Utc};

use crate::types::{Comment, FeedbackTotals};

/// Render how long ago `created` was, relative to `now`.
///
/// Under a minute is `"just now"`, then minutes, hours and days up to a
/// week (`"5m ago"`, `"3h ago"`, `"2d ago"`). Older timestamps render as a
/// calendar date.
pub fn relative_time(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "just now".into()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        created.format("%Y-%m-%d").to_string()
    }
}

/// Render a single [`Comment`] as indented plain text.
///
/// ```text
/// Anonymous · 5m ago  [01953c1e]
///   > "the ramp was closed"
///   "I had the same problem last spring."
///   ⚠ 2 flag(s)
/// ```
pub fn render_comment(comment: &Comment, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "Anonymous · {}  [{}]\n",
        relative_time(comment.created_at, now),
        short_id(&comment.id)
    );

    if let Some(marker) = &comment.inline_marker {
        if !marker.selected_text.is_empty() {
            out.push_str(&format!("  > \"{}\"\n", truncate(&marker.selected_text, 60)));
        }
    }

    out.push_str(&wrap_text(&comment.text, 78, "  "));
    out.push('\n');

    if comment.flag_count > 0 {
        out.push_str(&format!("  ⚠ {} flag(s)\n", comment.flag_count));
    }
    out
}

/// Render vote totals the way the resource page summarises them.
pub fn render_totals(totals: &FeedbackTotals) -> String {
    if totals.total() == 0 {
        return "No votes yet".into();
    }
    if totals.not_helpful_count == 0 {
        return format!("👍 {} found this helpful", totals.helpful_count);
    }
    format!(
        "👍 {} found this helpful · 👎 {} did not",
        totals.helpful_count, totals.not_helpful_count
    )
}

// --- helpers -----------------------------------------------------------------

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::from(indent);
    let mut line_len = 0usize;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + word_len + 1 > width {
            result.push('\n');
            result.push_str(indent);
            line_len = 0;
        } else if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }
    result
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InlineMarker;
    use chrono::{Duration, TimeZone};

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        (now - Duration::seconds(secs_ago), now)
    }

    fn comment() -> Comment {
        Comment {
            id: "01953c1e-0000-7000-8000-000000000001".into(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 18, 11, 55, 0).unwrap(),
            story_id: None,
            resource_id: None,
            session_id: String::new(),
            text: "I had the same problem last spring.".into(),
            flag_count: 0,
            is_flagged: false,
            inline_marker: None,
            flag_reason: None,
            parent_comment: None,
        }
    }

    #[test]
    fn relative_time_buckets() {
        let (c, n) = at(30);
        assert_eq!(relative_time(c, n), "just now");
        let (c, n) = at(5 * 60);
        assert_eq!(relative_time(c, n), "5m ago");
        let (c, n) = at(3 * 3600);
        assert_eq!(relative_time(c, n), "3h ago");
        let (c, n) = at(2 * 86400);
        assert_eq!(relative_time(c, n), "2d ago");
        let (c, n) = at(10 * 86400);
        assert_eq!(relative_time(c, n), "2026-02-08");
    }

    #[test]
    fn render_comment_shows_age_text_and_flags() {
        let mut c = comment();
        c.flag_count = 2;
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let out = render_comment(&c, now);
        assert!(out.starts_with("Anonymous · 5m ago  [01953c1e]"));
        assert!(out.contains("same problem"));
        assert!(out.contains("2 flag(s)"));
    }

    #[test]
    fn render_comment_quotes_inline_selection() {
        let mut c = comment();
        c.inline_marker = Some(InlineMarker {
            paragraph_index: 1,
            selected_text: "the ramp was closed".into(),
            start_char: 0,
            end_char: 19,
        });
        let out = render_comment(&c, c.created_at);
        assert!(out.contains("> \"the ramp was closed\""));
        assert!(!out.contains("flag(s)"));
    }

    #[test]
    fn render_totals_variants() {
        assert_eq!(render_totals(&FeedbackTotals::default()), "No votes yet");
        let t = FeedbackTotals { helpful_count: 3, not_helpful_count: 0 };
        assert_eq!(render_totals(&t), "👍 3 found this helpful");
        let t = FeedbackTotals { helpful_count: 3, not_helpful_count: 1 };
        assert!(render_totals(&t).ends_with("👎 1 did not"));
    }
}
