//! Core data types for Advocacy Commons content.
//!
//! These structures mirror the JSON documents held in the content store:
//! [`Comment`], [`ResourceFeedback`] and [`Submission`], plus the small value
//! types they are built from. Field names serialise in the store's camelCase
//! convention; system fields keep their leading underscore (`_id`,
//! `_createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::moderation::ModerationState;

/// Document type names used in the content store.
pub mod doc_types {
    pub const COMMENT: &str = "comment";
    pub const RESOURCE: &str = "resource";
    pub const COMMUNITY_STORY: &str = "communityStory";
    pub const RESOURCE_FEEDBACK: &str = "resourceFeedback";
    pub const SUBMISSION: &str = "submission";
}

fn reference_kind() -> String {
    "reference".into()
}

/// A weak link to another document.
///
/// Serialises as `{ "_type": "reference", "_ref": "<document id>" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    #[serde(rename = "_type", default = "reference_kind")]
    pub kind: String,
    #[serde(rename = "_ref")]
    pub id: String,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            kind: reference_kind(),
            id: id.into(),
        }
    }
}

/// The content item a comment hangs off. A comment belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Story(String),
    Resource(String),
}

impl ParentRef {
    /// The comment field that holds the reference (`storyId` or `resourceId`).
    pub fn field(&self) -> &'static str {
        match self {
            ParentRef::Story(_) => "storyId",
            ParentRef::Resource(_) => "resourceId",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ParentRef::Story(id) | ParentRef::Resource(id) => id,
        }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParentRef::Story(id) => write!(f, "story:{id}"),
            ParentRef::Resource(id) => write!(f, "resource:{id}"),
        }
    }
}

/// Parses `story:<id>` or `resource:<id>`.
impl std::str::FromStr for ParentRef {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("story", id)) if !id.is_empty() => Ok(ParentRef::Story(id.to_string())),
            Some(("resource", id)) if !id.is_empty() => Ok(ParentRef::Resource(id.to_string())),
            _ => Err(format!(
                "unknown parent {s:?}; expected story:<id> or resource:<id>"
            )),
        }
    }
}

/// Marks a comment as attached to a passage rather than the whole item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InlineMarker {
    /// Zero-based paragraph the comment refers to.
    pub paragraph_index: u32,
    /// The highlighted text.
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub start_char: u32,
    #[serde(default)]
    pub end_char: u32,
}

/// What a reader selected when opening the inline comment panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDraft {
    pub paragraph_index: u32,
    pub selected_text: String,
}

impl InlineDraft {
    pub fn new(paragraph_index: u32, selected_text: impl Into<String>) -> Self {
        Self {
            paragraph_index,
            selected_text: selected_text.into(),
        }
    }

    /// The marker stored on the comment. Offsets span the whole selection.
    pub fn to_marker(&self) -> InlineMarker {
        InlineMarker {
            paragraph_index: self.paragraph_index,
            selected_text: self.selected_text.trim().to_string(),
            start_char: 0,
            end_char: self.selected_text.chars().count() as u32,
        }
    }
}

/// Reason a moderator recorded for a flag. Never set by readers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlagReason {
    Spam,
    Inappropriate,
    Harassment,
    Other,
}

/// A stored comment as returned by listing queries.
///
/// Listing queries project a subset of fields, so everything except the
/// system fields and `text` tolerates absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Reference>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,

    pub text: String,

    #[serde(default)]
    pub flag_count: u32,

    /// `true` once the comment has been auto-hidden. Never reset automatically.
    #[serde(default)]
    pub is_flagged: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_marker: Option<InlineMarker>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_reason: Option<FlagReason>,

    /// Parent comment when this is a reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<Reference>,
}

impl Comment {
    /// The content item this comment belongs to, when the projection kept it.
    pub fn parent(&self) -> Option<ParentRef> {
        match (&self.story_id, &self.resource_id) {
            (Some(r), None) => Some(ParentRef::Story(r.id.clone())),
            (None, Some(r)) => Some(ParentRef::Resource(r.id.clone())),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.inline_marker.is_some()
    }

    pub fn moderation_state(&self) -> ModerationState {
        ModerationState::from_hidden(self.is_flagged)
    }
}

/// The fields written when a comment is first created.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_id: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Reference>,
    pub session_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_marker: Option<InlineMarker>,
    pub flag_count: u32,
    pub is_flagged: bool,
}

impl NewComment {
    /// A visible, unflagged comment on `parent`. `text` should already be validated.
    pub fn new(
        parent: &ParentRef,
        session_id: impl Into<String>,
        text: impl Into<String>,
        inline: Option<&InlineDraft>,
    ) -> Self {
        let (story_id, resource_id) = match parent {
            ParentRef::Story(id) => (Some(Reference::new(id.as_str())), None),
            ParentRef::Resource(id) => (None, Some(Reference::new(id.as_str()))),
        };
        Self {
            story_id,
            resource_id,
            session_id: session_id.into(),
            text: text.into(),
            inline_marker: inline.map(InlineDraft::to_marker),
            flag_count: 0,
            is_flagged: false,
        }
    }
}

/// Which comment listing a view shows. The two listings never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentListing {
    /// Comments on the item as a whole (no inline marker).
    General,
    /// Comments anchored to one paragraph.
    Inline { paragraph_index: u32 },
}

/// One helpful / not-helpful vote on a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFeedback {
    pub resource: Reference,
    pub session_id: String,
    pub helpful: bool,
    /// Required (and only stored) when `helpful` is `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Set once the vote is reflected in the resource's counters. Votes
    /// stored without the field were counted when written.
    #[serde(default = "counted")]
    pub tallied: bool,
}

fn counted() -> bool {
    true
}

/// Denormalised vote counters kept on a resource document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackTotals {
    #[serde(default)]
    pub helpful_count: u64,
    #[serde(default)]
    pub not_helpful_count: u64,
}

impl FeedbackTotals {
    pub fn total(&self) -> u64 {
        self.helpful_count + self.not_helpful_count
    }
}

/// Kind of item a visitor proposes through the public submission form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionKind {
    Resource,
    CommunityStory,
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionKind::Resource => write!(f, "resource"),
            SubmissionKind::CommunityStory => write!(f, "communityStory"),
        }
    }
}

impl std::str::FromStr for SubmissionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resource" => Ok(SubmissionKind::Resource),
            "communityStory" => Ok(SubmissionKind::CommunityStory),
            _ => Err("Invalid submission type".into()),
        }
    }
}

/// A proposed resource or story awaiting editorial review.
///
/// Only the fields for `kind` are meaningful; the rest stay empty strings so
/// editors always see the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
    #[serde(default)]
    pub submitter_name: String,
    #[serde(default)]
    pub submitter_email: String,
    #[serde(default)]
    pub resource_title: String,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default)]
    pub resource_description: String,
    #[serde(default)]
    pub resource_category: String,
    #[serde(default)]
    pub story_title: String,
    #[serde(default)]
    pub story_person_name: String,
    #[serde(default)]
    pub story_location: String,
    #[serde(default)]
    pub story_summary: String,
    #[serde(default)]
    pub story_body: String,
}

impl Submission {
    pub fn new(kind: SubmissionKind) -> Self {
        Self {
            kind,
            submitter_name: String::new(),
            submitter_email: String::new(),
            resource_title: String::new(),
            resource_url: String::new(),
            resource_description: String::new(),
            resource_category: String::new(),
            story_title: String::new(),
            story_person_name: String::new(),
            story_location: String::new(),
            story_summary: String::new(),
            story_body: String::new(),
        }
    }
}
