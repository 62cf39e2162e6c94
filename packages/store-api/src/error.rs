//! Error body shared by the node and its HTTP clients.

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Codes carried in [`ErrorResponse::code`], with the status each one
/// travels under.
///
/// | `code` | HTTP status |
/// |--------|------------|
/// | `invalid_parameter` | 400 |
/// | `not_found` | 404 |
/// | `revision_conflict` | 409 |
/// | `validation_failed` | 422 |
/// | `internal_error` | 500 |
pub mod codes {
    pub const INVALID_PARAMETER: &str = "invalid_parameter";
    pub const NOT_FOUND: &str = "not_found";
    pub const REVISION_CONFLICT: &str = "revision_conflict";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Body of every non-2xx reply from a document node.
///
/// ```json
/// { "error": "document 0195... is at revision a, expected b", "code": "revision_conflict" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    /// One of [`codes`].
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }

    /// The store error a client should report for this body, judged by
    /// `code` alone. `None` for codes that need the HTTP status to classify.
    pub fn to_store_error(&self) -> Option<StoreError> {
        match self.code.as_str() {
            codes::NOT_FOUND => Some(StoreError::NotFound),
            codes::REVISION_CONFLICT => Some(StoreError::Conflict(self.error.clone())),
            codes::INVALID_PARAMETER | codes::VALIDATION_FAILED => {
                Some(StoreError::Invalid(self.error.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_classify_store_errors() {
        let conflict = ErrorResponse::new(codes::REVISION_CONFLICT, "stale");
        assert_eq!(conflict.to_store_error(), Some(StoreError::Conflict("stale".into())));
        assert_eq!(
            ErrorResponse::new(codes::NOT_FOUND, "gone").to_store_error(),
            Some(StoreError::NotFound)
        );
        assert_eq!(ErrorResponse::new(codes::INTERNAL_ERROR, "boom").to_store_error(), None);
    }
}
