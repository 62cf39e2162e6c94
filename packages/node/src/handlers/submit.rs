//! Public submission form — `POST /api/submit`.

use advocacy_commons::{doc_types, validate_submission};
use advocacy_commons_store_api::{NewDocument, SubmissionRequest, SubmitResponse};
use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::AppError;

use super::AppState;

/// `POST /api/submit`
///
/// Accepts a resource or community-story proposal and stores it as a
/// `submission` document for editors to review. Absent fields are stored
/// as empty strings. An unknown `type` is a 400.
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(request) = body?;
    let submission = request.into_submission()?;
    validate_submission(&submission)?;

    let doc = NewDocument::from_serialize(doc_types::SUBMISSION, &submission)
        .ok_or_else(|| AppError::Internal("submission did not encode as an object".into()))?;
    let created = state.store.create(doc).await?;
    tracing::info!(id = %created.id, kind = %submission.kind, "submission received");

    Ok(Json(SubmitResponse {
        success: true,
        id: created.id,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use advocacy_commons_store_api::{ContentStore, MemoryContentStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{config::NodeConfig, router::build_router};

    async fn post(store: Arc<MemoryContentStore>, body: Value) -> (StatusCode, Value) {
        let app = build_router(store, NodeConfig::default());
        let req = Request::builder()
            .method("POST")
            .uri("/api/submit")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn resource_submission_is_stored() {
        let store = Arc::new(MemoryContentStore::new());
        let (status, body) = post(
            Arc::clone(&store),
            json!({
                "type": "resource",
                "resourceTitle": "Paratransit appeal letter",
                "resourceUrl": "https://example.org/appeal"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let doc = store.get_document(body["id"].as_str().unwrap()).await.unwrap().unwrap();
        assert_eq!(doc.doc_type, "submission");
        assert_eq!(doc.fields["resourceTitle"], "Paratransit appeal letter");
        assert_eq!(doc.fields["storyBody"], "");
    }

    #[tokio::test]
    async fn unknown_type_is_400() {
        let store = Arc::new(MemoryContentStore::new());
        let (status, body) = post(Arc::clone(&store), json!({ "type": "policyGap" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid submission type");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn bad_email_is_422() {
        let store = Arc::new(MemoryContentStore::new());
        let (status, body) = post(
            store,
            json!({ "type": "communityStory", "submitterEmail": "not-an-address" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "validation_failed");
    }
}
