use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::Submission;

/// Longest comment body accepted, in characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Longest inline comment body accepted, in characters.
pub const MAX_INLINE_COMMENT_CHARS: usize = 500;

/// Shortest improvement suggestion accepted with a not-helpful vote.
pub const MIN_SUGGESTION_CHARS: usize = 20;

/// Longest improvement suggestion accepted, in characters.
pub const MAX_SUGGESTION_CHARS: usize = 500;

/// Errors returned when reader input is malformed or incomplete.
///
/// The `Display` text is shown to the reader as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Comment must be at most {max} characters, got {len}")]
    CommentTooLong { max: usize, len: usize },

    #[error(
        "Please provide 1–2 sentences on how this resource could improve \
         (at least {MIN_SUGGESTION_CHARS} characters)."
    )]
    SuggestionTooShort,

    #[error("Suggestion must be at most {MAX_SUGGESTION_CHARS} characters, got {0}")]
    SuggestionTooLong(usize),

    #[error("Invalid submission type")]
    InvalidSubmissionType,

    #[error("resource URL must start with http:// or https://, got {0:?}")]
    InvalidUrl(String),

    #[error("submitter email is not a valid address: {0:?}")]
    InvalidEmail(String),
}

/// Check a comment body and return the trimmed text to store.
pub fn validate_comment_text(text: &str) -> Result<String, ValidationError> {
    check_comment(text, MAX_COMMENT_CHARS)
}

/// Like [`validate_comment_text`], with the tighter limit for comments
/// anchored to a passage.
pub fn validate_inline_comment_text(text: &str) -> Result<String, ValidationError> {
    check_comment(text, MAX_INLINE_COMMENT_CHARS)
}

fn check_comment(text: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::CommentTooLong { max, len });
    }
    Ok(trimmed.to_string())
}

/// Check the suggestion attached to a vote.
///
/// Helpful votes never carry a suggestion, so any text passed with one is
/// dropped. Not-helpful votes require at least [`MIN_SUGGESTION_CHARS`]
/// after trimming. Returns the trimmed suggestion to store.
pub fn validate_suggestion(
    helpful: bool,
    suggestion: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    if helpful {
        return Ok(None);
    }
    let trimmed = suggestion.map(str::trim).unwrap_or_default();
    let len = trimmed.chars().count();
    if len < MIN_SUGGESTION_CHARS {
        return Err(ValidationError::SuggestionTooShort);
    }
    if len > MAX_SUGGESTION_CHARS {
        return Err(ValidationError::SuggestionTooLong(len));
    }
    Ok(Some(trimmed.to_string()))
}

/// Check the optional contact and link fields of a [`Submission`].
///
/// Every field may be empty; only non-empty URL and email fields are
/// checked for shape.
pub fn validate_submission(submission: &Submission) -> Result<(), ValidationError> {
    let url = submission.resource_url.trim();
    if !url.is_empty() && !URL_RE.is_match(url) {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    let email = submission.submitter_email.trim();
    if !email.is_empty() && !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/]+\S*$").expect("invalid url regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmissionKind;

    #[test]
    fn comment_is_trimmed() {
        assert_eq!(validate_comment_text("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn blank_comment_rejected() {
        assert_eq!(validate_comment_text(""), Err(ValidationError::EmptyComment));
        assert_eq!(validate_comment_text("   \t"), Err(ValidationError::EmptyComment));
    }

    #[test]
    fn comment_length_limit_counts_chars() {
        let ok = "é".repeat(MAX_COMMENT_CHARS);
        assert!(validate_comment_text(&ok).is_ok());
        let long = "a".repeat(MAX_COMMENT_CHARS + 1);
        assert_eq!(
            validate_comment_text(&long),
            Err(ValidationError::CommentTooLong {
                max: MAX_COMMENT_CHARS,
                len: MAX_COMMENT_CHARS + 1
            })
        );
    }

    #[test]
    fn inline_comments_have_a_shorter_limit() {
        let body = "a".repeat(MAX_INLINE_COMMENT_CHARS + 1);
        assert!(validate_comment_text(&body).is_ok());
        assert_eq!(
            validate_inline_comment_text(&body),
            Err(ValidationError::CommentTooLong {
                max: MAX_INLINE_COMMENT_CHARS,
                len: MAX_INLINE_COMMENT_CHARS + 1
            })
        );
        assert_eq!(
            validate_inline_comment_text(&"a".repeat(MAX_INLINE_COMMENT_CHARS)).map(|t| t.len()),
            Ok(MAX_INLINE_COMMENT_CHARS)
        );
    }

    #[test]
    fn helpful_vote_needs_no_suggestion() {
        assert_eq!(validate_suggestion(true, None), Ok(None));
        assert_eq!(validate_suggestion(true, Some("ignored")), Ok(None));
    }

    #[test]
    fn not_helpful_requires_twenty_chars() {
        assert_eq!(validate_suggestion(false, None), Err(ValidationError::SuggestionTooShort));
        assert_eq!(validate_suggestion(false, Some("")), Err(ValidationError::SuggestionTooShort));
        assert_eq!(
            validate_suggestion(false, Some("too short")),
            Err(ValidationError::SuggestionTooShort)
        );
        // 19 visible chars padded with whitespace still fails.
        assert_eq!(
            validate_suggestion(false, Some("   aaaaaaaaaaaaaaaaaaa   ")),
            Err(ValidationError::SuggestionTooShort)
        );
    }

    #[test]
    fn not_helpful_suggestion_is_trimmed() {
        let s = validate_suggestion(false, Some("  Add the phone number for intake.  ")).unwrap();
        assert_eq!(s.as_deref(), Some("Add the phone number for intake."));
    }

    #[test]
    fn submission_fields_checked_only_when_present() {
        let mut s = Submission::new(SubmissionKind::Resource);
        assert_eq!(validate_submission(&s), Ok(()));

        s.resource_url = "https://example.org/benefits".into();
        s.submitter_email = "sam@example.org".into();
        assert_eq!(validate_submission(&s), Ok(()));

        s.resource_url = "example.org".into();
        assert!(matches!(validate_submission(&s), Err(ValidationError::InvalidUrl(_))));

        s.resource_url.clear();
        s.submitter_email = "not-an-email".into();
        assert!(matches!(validate_submission(&s), Err(ValidationError::InvalidEmail(_))));
    }
}
