//! Domain model for the Advocacy Commons community site.
//!
//! This crate holds the pieces of the anti-abuse and moderation subsystem
//! that need no I/O: the document shapes stored in the content store, the
//! input checks applied before any write, and the flag threshold policy.
//! It is the foundation for the session, client, node, CLI and WASM crates.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | [`Comment`], [`ResourceFeedback`], [`Submission`] and their parts |
//! | [`validation`] | Reader input checks via [`validate_comment_text`], [`validate_suggestion`] |
//! | [`moderation`] | Visible → Hidden transition via [`apply_flag`] |
//! | [`render`] | Plain-text rendering of comments and vote totals |

pub mod moderation;
pub mod render;
pub mod types;
pub mod validation;

pub use moderation::{apply_flag, FlagTransition, ModerationState, FLAG_HIDE_THRESHOLD};
pub use types::{
    doc_types, Comment, CommentListing, FeedbackTotals, FlagReason, InlineDraft, InlineMarker,
    NewComment, ParentRef, Reference, ResourceFeedback, Submission, SubmissionKind,
};
pub use validation::{
    validate_comment_text, validate_inline_comment_text, validate_submission, validate_suggestion,
    ValidationError, MAX_COMMENT_CHARS, MAX_INLINE_COMMENT_CHARS, MIN_SUGGESTION_CHARS,
};
