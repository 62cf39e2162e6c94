//! Posting, listing and flagging comments.
//!
//! A comment hangs off one story or resource. It is either *general*
//! (about the item as a whole) or *inline* (anchored to a paragraph), and
//! the two listings never overlap. Hidden comments are never listed.

use advocacy_commons::{
    apply_flag, doc_types, validate_comment_text, validate_inline_comment_text, Comment,
    CommentListing, InlineDraft, ModerationState, NewComment, ParentRef,
};
use advocacy_commons_session::{Clock, KeyValueStore, RateDecision};
use advocacy_commons_store_api::{Direction, Document, DocumentQuery, NewDocument, Patch, StoreError};
use tracing::{debug, info, warn};

use crate::{decode, ActionError, CommunityClient, Duplicate};

/// Fields returned to readers. `sessionId` is left out on purpose.
const LISTING_FIELDS: [&str; 8] = [
    "storyId",
    "resourceId",
    "text",
    "flagCount",
    "isFlagged",
    "inlineMarker",
    "flagReason",
    "parentComment",
];

/// The result of a successful flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagOutcome {
    pub comment_id: String,
    pub flag_count: u32,
    pub hidden: bool,
    /// `true` when this flag found the comment visible and hid it.
    pub newly_hidden: bool,
}

/// The store query behind a comment listing: visible comments on `parent`,
/// newest first.
pub fn listing_query(parent: &ParentRef, listing: CommentListing) -> DocumentQuery {
    let query = DocumentQuery::of_type(doc_types::COMMENT)
        .where_eq(format!("{}._ref", parent.field()), parent.id())
        .where_eq("isFlagged", false);
    let query = match listing {
        CommentListing::General => query.where_undefined("inlineMarker"),
        CommentListing::Inline { paragraph_index } => query
            .where_defined("inlineMarker")
            .where_eq("inlineMarker.paragraphIndex", paragraph_index),
    };
    query
        .order_by("_createdAt", Direction::Desc)
        .project(LISTING_FIELDS)
}

/// Decode listing results, skipping documents that are not valid comments.
pub(crate) fn decode_comments(docs: Vec<Document>) -> Vec<Comment> {
    docs.iter()
        .filter_map(|doc| match decode::<Comment>(doc) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("skipping comment: {e}");
                None
            }
        })
        .collect()
}

impl<S: KeyValueStore, C: Clock> CommunityClient<S, C> {
    /// Post a comment on `parent`, optionally anchored to a passage.
    pub async fn post_comment(
        &self,
        parent: &ParentRef,
        text: &str,
        inline: Option<&InlineDraft>,
    ) -> Result<Comment, ActionError> {
        let text = match inline {
            Some(_) => validate_inline_comment_text(text)?,
            None => validate_comment_text(text)?,
        };

        if let RateDecision::Denied { message, retry_after_secs } = self.guard.can_submit_comment() {
            return Err(ActionError::RateLimited { message, retry_after_secs });
        }

        let session = self.guard.session_id();
        let new = NewComment::new(parent, session, text, inline);
        let doc = NewDocument::from_serialize(doc_types::COMMENT, &new)
            .ok_or_else(|| StoreError::Internal("comment did not encode as an object".into()))?;

        let created = self.store.create(doc).await.inspect_err(|e| {
            warn!(parent = %parent, "failed to create comment: {e}");
        })?;
        self.guard.record_comment_submission();
        debug!(id = %created.id, parent = %parent, inline = inline.is_some(), "comment posted");

        Ok(decode(&created)?)
    }

    /// General comments on `parent`, newest first.
    pub async fn list_comments(&self, parent: &ParentRef) -> Result<Vec<Comment>, ActionError> {
        self.list(parent, CommentListing::General).await
    }

    /// Inline comments anchored to paragraph `paragraph_index` of `parent`,
    /// newest first.
    pub async fn list_inline_comments(
        &self,
        parent: &ParentRef,
        paragraph_index: u32,
    ) -> Result<Vec<Comment>, ActionError> {
        self.list(parent, CommentListing::Inline { paragraph_index }).await
    }

    /// Number of visible inline comments on one paragraph.
    pub async fn inline_comment_count(
        &self,
        parent: &ParentRef,
        paragraph_index: u32,
    ) -> Result<usize, ActionError> {
        Ok(self.list_inline_comments(parent, paragraph_index).await?.len())
    }

    async fn list(&self, parent: &ParentRef, listing: CommentListing) -> Result<Vec<Comment>, ActionError> {
        let docs = self
            .store
            .query(&listing_query(parent, listing))
            .await
            .inspect_err(|e| warn!(parent = %parent, "failed to list comments: {e}"))?;
        Ok(decode_comments(docs))
    }

    /// Report a comment. The fifth flag hides it for good.
    ///
    /// `flagCount` is bumped with the store's atomic increment, so readers
    /// flagging at once are all counted. Whoever lands on or past the
    /// threshold then sets `isFlagged`, which is safe to repeat. If that
    /// write fails the flag still counts, and the next flag on the comment
    /// hides it.
    pub async fn flag_comment(&self, comment_id: &str) -> Result<FlagOutcome, ActionError> {
        if self.guard.has_flagged_comment(comment_id) {
            return Err(ActionError::Duplicate(Duplicate::AlreadyFlagged));
        }
        if let RateDecision::Denied { message, retry_after_secs } = self.guard.can_flag_comment() {
            return Err(ActionError::RateLimited { message, retry_after_secs });
        }

        self.store
            .get_document(comment_id)
            .await?
            .filter(|d| d.doc_type == doc_types::COMMENT)
            .ok_or(StoreError::NotFound)?;

        let counted = self
            .store
            .patch(comment_id, &Patch::new().inc("flagCount", 1))
            .await
            .inspect_err(|e| warn!(comment = comment_id, "failed to flag comment: {e}"))?;
        self.guard.record_comment_flag(comment_id);
        self.guard.record_flag_submission();

        let count = counted.fields.get("flagCount").and_then(|v| v.as_u64()).unwrap_or(1);
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        let hidden = counted.fields.get("isFlagged").and_then(|v| v.as_bool()).unwrap_or(false);
        let transition = apply_flag(count.saturating_sub(1), ModerationState::from_hidden(hidden));

        if transition.newly_hidden {
            self.store
                .patch(comment_id, &Patch::new().set("isFlagged", true))
                .await
                .inspect_err(|e| warn!(comment = comment_id, "flag counted but hide failed: {e}"))?;
            info!(comment = comment_id, flags = count, "comment hidden");
        }
        debug!(comment = comment_id, flags = count, "comment flagged");

        Ok(FlagOutcome {
            comment_id: comment_id.to_string(),
            flag_count: transition.flag_count,
            hidden: transition.is_flagged(),
            newly_hidden: transition.newly_hidden,
        })
    }
}
