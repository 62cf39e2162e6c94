//! Public resource and story proposals.

use advocacy_commons::{doc_types, validate_submission, Submission};
use advocacy_commons_session::{Clock, KeyValueStore};
use advocacy_commons_store_api::{NewDocument, StoreError};

use crate::{ActionError, CommunityClient};

impl<S: KeyValueStore, C: Clock> CommunityClient<S, C> {
    /// File a submission for editorial review and return its document id.
    pub async fn submit(&self, submission: &Submission) -> Result<String, ActionError> {
        validate_submission(submission)?;
        let doc = NewDocument::from_serialize(doc_types::SUBMISSION, submission)
            .ok_or_else(|| StoreError::Internal("submission did not encode as an object".into()))?;
        let created = self.store.create(doc).await?;
        tracing::info!(id = %created.id, kind = %submission.kind, "submission received");
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use advocacy_commons::{SubmissionKind, ValidationError};
    use advocacy_commons_store_api::ContentStore;

    use super::*;
    use crate::testing::{reader, setup};

    #[tokio::test]
    async fn story_submission_is_stored_with_empty_defaults() {
        let (store, clock) = setup();
        let mut s = Submission::new(SubmissionKind::CommunityStory);
        s.story_title = "Getting to the polling place".into();
        s.story_body = "The accessible entrance was locked.".into();

        let id = reader(&store, &clock).submit(&s).await.unwrap();
        let doc = store.get_document(&id).await.unwrap().unwrap();
        assert_eq!(doc.doc_type, "submission");
        assert_eq!(doc.fields["type"], "communityStory");
        assert_eq!(doc.fields["resourceUrl"], "");
    }

    #[tokio::test]
    async fn malformed_url_is_rejected() {
        let (store, clock) = setup();
        let mut s = Submission::new(SubmissionKind::Resource);
        s.resource_url = "ftp://example.org".into();
        let err = reader(&store, &clock).submit(&s).await.unwrap_err();
        assert!(matches!(err, ActionError::Validation(ValidationError::InvalidUrl(_))));
        assert!(store.is_empty());
    }
}
