//! Flag threshold policy for comments.
//!
//! A comment is either [`Visible`](ModerationState::Visible) or
//! [`Hidden`](ModerationState::Hidden). Each reader flag bumps its
//! `flagCount`; once the count reaches [`FLAG_HIDE_THRESHOLD`] the comment is
//! hidden. There is no transition back. Un-hiding is an editorial action
//! performed directly on the content store.

use serde::{Deserialize, Serialize};

/// Number of flags at which a comment is auto-hidden.
pub const FLAG_HIDE_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModerationState {
    Visible,
    Hidden,
}

impl ModerationState {
    pub fn from_hidden(hidden: bool) -> Self {
        if hidden {
            ModerationState::Hidden
        } else {
            ModerationState::Visible
        }
    }

    pub fn is_hidden(self) -> bool {
        self == ModerationState::Hidden
    }
}

/// Result of applying one flag to a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagTransition {
    pub flag_count: u32,
    pub state: ModerationState,
    /// `true` only for the flag that crossed the threshold.
    pub newly_hidden: bool,
}

impl FlagTransition {
    pub fn is_flagged(&self) -> bool {
        self.state.is_hidden()
    }
}

/// Apply one flag to a comment currently at `flag_count` in `state`.
pub fn apply_flag(flag_count: u32, state: ModerationState) -> FlagTransition {
    let flag_count = flag_count.saturating_add(1);
    let hidden = state.is_hidden() || flag_count >= FLAG_HIDE_THRESHOLD;
    FlagTransition {
        flag_count,
        state: ModerationState::from_hidden(hidden),
        newly_hidden: hidden && !state.is_hidden(),
    }
}
