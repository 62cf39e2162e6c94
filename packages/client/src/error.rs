//! Errors surfaced to the reader by [`CommunityClient`](crate::CommunityClient).

use advocacy_commons::ValidationError;
use advocacy_commons_store_api::StoreError;
use thiserror::Error;

/// An action this session has already taken and may not repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicate {
    AlreadyFlagged,
    AlreadyVoted,
}

impl std::fmt::Display for Duplicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Duplicate::AlreadyFlagged => write!(f, "You have already flagged this comment."),
            Duplicate::AlreadyVoted => write!(f, "You have already shared feedback on this resource."),
        }
    }
}

/// Why a reader action did not happen.
///
/// Every variant except [`Store`](ActionError::Store) means nothing was
/// written.
#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },

    #[error("{0}")]
    Duplicate(Duplicate),

    #[error("content store error: {0}")]
    Store(#[from] StoreError),
}

impl ActionError {
    /// Text to show the reader. Store failures are reported generically.
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Store(_) => "Request failed, please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_not_shown_verbatim() {
        let e = ActionError::Store(StoreError::Internal("disk I/O error at page 12".into()));
        assert_eq!(e.user_message(), "Request failed, please try again.");
    }

    #[test]
    fn rate_limit_message_is_shown_as_is() {
        let e = ActionError::RateLimited {
            message: "slow down".into(),
            retry_after_secs: 3,
        };
        assert_eq!(e.user_message(), "slow down");
    }
}
