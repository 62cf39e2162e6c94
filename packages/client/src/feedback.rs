//! "Was this helpful?" votes on resources.
//!
//! Each vote is its own `resourceFeedback` document; the resource keeps
//! running totals in `helpfulCount` / `notHelpfulCount`, bumped with the
//! store's atomic increment.
//!
//! A vote is written with `tallied: false` and marked `true` once the
//! counters include it. If the counter update fails, the reader can submit
//! again: the untallied vote is reused instead of being refused as a
//! duplicate.

use advocacy_commons::{
    doc_types, validate_suggestion, FeedbackTotals, Reference, ResourceFeedback,
};
use advocacy_commons_session::{Clock, KeyValueStore};
use advocacy_commons_store_api::{DocumentQuery, NewDocument, Patch, StoreError};
use tracing::{debug, warn};

use crate::{decode, ActionError, CommunityClient, Duplicate};

/// This session's stored vote on one resource.
struct StoredVote {
    id: String,
    helpful: bool,
    tallied: bool,
}

impl<S: KeyValueStore, C: Clock> CommunityClient<S, C> {
    async fn stored_vote(&self, resource_id: &str) -> Result<Option<StoredVote>, StoreError> {
        let query = DocumentQuery::of_type(doc_types::RESOURCE_FEEDBACK)
            .where_eq("resource._ref", resource_id)
            .where_eq("sessionId", self.guard.session_id())
            .project(["helpful", "tallied"])
            .limit(1);
        let docs = self.store.query(&query).await?;
        Ok(docs.into_iter().next().map(|d| StoredVote {
            helpful: d.fields.get("helpful").and_then(|v| v.as_bool()).unwrap_or(false),
            tallied: d.fields.get("tallied").and_then(|v| v.as_bool()).unwrap_or(true),
            id: d.id,
        }))
    }

    /// This session's counted vote on `resource_id`, if any.
    pub async fn existing_vote(&self, resource_id: &str) -> Result<Option<bool>, ActionError> {
        Ok(self
            .stored_vote(resource_id)
            .await?
            .filter(|v| v.tallied)
            .map(|v| v.helpful))
    }

    /// Record a vote and return the resource's updated totals.
    ///
    /// A not-helpful vote needs a suggestion of at least 20 characters.
    /// Voting on a resource that does not exist is `Store(NotFound)` and
    /// writes nothing.
    pub async fn submit_feedback(
        &self,
        resource_id: &str,
        helpful: bool,
        suggestion: Option<&str>,
    ) -> Result<FeedbackTotals, ActionError> {
        let suggestion = validate_suggestion(helpful, suggestion)?;

        if self.store.get_document(resource_id).await?.is_none() {
            return Err(StoreError::NotFound.into());
        }

        let vote_id = match self.stored_vote(resource_id).await? {
            Some(vote) if vote.tallied => {
                return Err(ActionError::Duplicate(Duplicate::AlreadyVoted));
            }
            Some(vote) => {
                debug!(resource = resource_id, vote = %vote.id, "resuming untallied vote");
                let retake = Patch::new()
                    .set("helpful", helpful)
                    .set("suggestion", suggestion.clone());
                self.store.patch(&vote.id, &retake).await?;
                vote.id
            }
            None => {
                let vote = ResourceFeedback {
                    resource: Reference::new(resource_id),
                    session_id: self.guard.session_id(),
                    helpful,
                    suggestion,
                    tallied: false,
                };
                let doc = NewDocument::from_serialize(doc_types::RESOURCE_FEEDBACK, &vote)
                    .ok_or_else(|| StoreError::Internal("vote did not encode as an object".into()))?;
                self.store
                    .create(doc)
                    .await
                    .inspect_err(|e| warn!(resource = resource_id, "failed to record vote: {e}"))?
                    .id
            }
        };

        let counter = if helpful { "helpfulCount" } else { "notHelpfulCount" };
        let patch = Patch::new()
            .set_if_missing("helpfulCount", 0)
            .set_if_missing("notHelpfulCount", 0)
            .inc(counter, 1);
        let updated = self.store.patch(resource_id, &patch).await.inspect_err(|e| {
            warn!(resource = resource_id, "failed to update vote totals: {e}");
        })?;

        // Counters already include the vote. Left unmarked, a retry counts it again.
        if let Err(e) = self.store.patch(&vote_id, &Patch::new().set("tallied", true)).await {
            warn!(resource = resource_id, vote = %vote_id, "vote counted but not marked: {e}");
        }

        let totals: FeedbackTotals = decode(&updated)?;
        debug!(
            resource = resource_id,
            helpful = totals.helpful_count,
            not_helpful = totals.not_helpful_count,
            "vote recorded"
        );
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use advocacy_commons::ValidationError;
    use advocacy_commons_session::{MemoryKeyValueStore, SessionGuard};
    use advocacy_commons_store_api::{ContentStore, Document, MemoryContentStore};
    use serde_json::json;

    use super::*;
    use crate::testing::{reader, setup};

    async fn seed_resource(store: &MemoryContentStore) -> String {
        store
            .create(NewDocument {
                doc_type: doc_types::RESOURCE.into(),
                fields: json!({ "title": "Transit rights guide" }).as_object().cloned().unwrap(),
            })
            .await
            .unwrap()
            .id
    }

    async fn totals(store: &MemoryContentStore, id: &str) -> (Option<i64>, Option<i64>) {
        let d = store.get_document(id).await.unwrap().unwrap();
        (
            d.fields.get("helpfulCount").and_then(|v| v.as_i64()),
            d.fields.get("notHelpfulCount").and_then(|v| v.as_i64()),
        )
    }

    #[tokio::test]
    async fn helpful_vote_increments_exactly_one_counter() {
        let (store, clock) = setup();
        let r = seed_resource(&store).await;
        let a = reader(&store, &clock);

        let t = a.submit_feedback(&r, true, None).await.unwrap();
        assert_eq!(t, FeedbackTotals { helpful_count: 1, not_helpful_count: 0 });
        assert_eq!(a.existing_vote(&r).await.unwrap(), Some(true));

        let t = reader(&store, &clock).submit_feedback(&r, true, None).await.unwrap();
        assert_eq!(t.helpful_count, 2);
    }

    #[tokio::test]
    async fn not_helpful_requires_a_real_suggestion() {
        let (store, clock) = setup();
        let r = seed_resource(&store).await;
        let a = reader(&store, &clock);

        for bad in [None, Some(""), Some("too short")] {
            let err = a.submit_feedback(&r, false, bad).await.unwrap_err();
            assert_eq!(err, ActionError::Validation(ValidationError::SuggestionTooShort));
        }
        assert_eq!(totals(&store, &r).await, (None, None));
        assert_eq!(a.existing_vote(&r).await.unwrap(), None);

        let t = a
            .submit_feedback(&r, false, Some("  Please add the county phone numbers.  "))
            .await
            .unwrap();
        assert_eq!(t, FeedbackTotals { helpful_count: 0, not_helpful_count: 1 });

        let q = DocumentQuery::of_type(doc_types::RESOURCE_FEEDBACK);
        let votes = store.query(&q).await.unwrap();
        assert_eq!(votes[0].fields["suggestion"], "Please add the county phone numbers.");
    }

    #[tokio::test]
    async fn second_vote_from_same_session_is_refused() {
        let (store, clock) = setup();
        let r = seed_resource(&store).await;
        let a = reader(&store, &clock);

        a.submit_feedback(&r, true, None).await.unwrap();
        let err = a.submit_feedback(&r, true, None).await.unwrap_err();
        assert_eq!(err, ActionError::Duplicate(Duplicate::AlreadyVoted));
        assert_eq!(totals(&store, &r).await, (Some(1), Some(0)));
    }

    #[tokio::test]
    async fn helpful_vote_stores_no_suggestion() {
        let (store, clock) = setup();
        let r = seed_resource(&store).await;
        reader(&store, &clock)
            .submit_feedback(&r, true, Some("ignored because the vote is positive"))
            .await
            .unwrap();
        let votes = store
            .query(&DocumentQuery::of_type(doc_types::RESOURCE_FEEDBACK))
            .await
            .unwrap();
        assert!(votes[0].fields.get("suggestion").is_none());
    }

    /// Drops the first patch aimed at `target`, as a lost connection would.
    struct DropsOnePatch {
        inner: Arc<MemoryContentStore>,
        target: String,
        dropped: AtomicBool,
    }

    #[async_trait::async_trait]
    impl ContentStore for DropsOnePatch {
        async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
            self.inner.query(query).await
        }

        async fn create(&self, doc: NewDocument) -> Result<Document, StoreError> {
            self.inner.create(doc).await
        }

        async fn patch(&self, id: &str, patch: &Patch) -> Result<Document, StoreError> {
            if id == self.target && !self.dropped.swap(true, Ordering::SeqCst) {
                return Err(StoreError::Network("timeout".into()));
            }
            self.inner.patch(id, patch).await
        }

        async fn get_document(&self, id: &str) -> Result<Option<Document>, StoreError> {
            self.inner.get_document(id).await
        }
    }

    #[tokio::test]
    async fn vote_on_missing_resource_writes_nothing() {
        let (store, clock) = setup();
        let err = reader(&store, &clock)
            .submit_feedback("no-such-resource", true, None)
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::Store(StoreError::NotFound));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn retry_after_failed_tally_counts_the_vote_once() {
        let (store, clock) = setup();
        let r = seed_resource(&store).await;
        let flaky = Arc::new(DropsOnePatch {
            inner: Arc::clone(&store),
            target: r.clone(),
            dropped: AtomicBool::new(false),
        });
        let a = CommunityClient::with_guard(
            flaky as Arc<dyn ContentStore>,
            SessionGuard::with_clock(MemoryKeyValueStore::new(), Arc::clone(&clock)),
        );

        let err = a.submit_feedback(&r, true, None).await.unwrap_err();
        assert_eq!(err, ActionError::Store(StoreError::Network("timeout".into())));
        assert_eq!(totals(&store, &r).await, (None, None));
        assert_eq!(a.existing_vote(&r).await.unwrap(), None);

        let t = a.submit_feedback(&r, true, None).await.unwrap();
        assert_eq!(t, FeedbackTotals { helpful_count: 1, not_helpful_count: 0 });
        assert_eq!(a.existing_vote(&r).await.unwrap(), Some(true));

        let votes = store
            .query(&DocumentQuery::of_type(doc_types::RESOURCE_FEEDBACK))
            .await
            .unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].fields["tallied"], true);

        let err = a.submit_feedback(&r, true, None).await.unwrap_err();
        assert_eq!(err, ActionError::Duplicate(Duplicate::AlreadyVoted));
        assert_eq!(totals(&store, &r).await, (Some(1), Some(0)));
    }

    #[tokio::test]
    async fn retry_may_change_the_vote() {
        let (store, clock) = setup();
        let r = seed_resource(&store).await;
        let flaky = Arc::new(DropsOnePatch {
            inner: Arc::clone(&store),
            target: r.clone(),
            dropped: AtomicBool::new(false),
        });
        let a = CommunityClient::with_guard(
            flaky as Arc<dyn ContentStore>,
            SessionGuard::with_clock(MemoryKeyValueStore::new(), Arc::clone(&clock)),
        );

        a.submit_feedback(&r, false, Some("Please add the office opening hours."))
            .await
            .unwrap_err();
        let t = a.submit_feedback(&r, true, None).await.unwrap();
        assert_eq!(t, FeedbackTotals { helpful_count: 1, not_helpful_count: 0 });

        let votes = store
            .query(&DocumentQuery::of_type(doc_types::RESOURCE_FEEDBACK))
            .await
            .unwrap();
        assert_eq!(votes[0].fields["helpful"], true);
        assert!(votes[0].fields["suggestion"].is_null());
    }
}
