//! Generic document endpoints: query, create, fetch, patch.
//!
//! These are deliberately thin. Moderation rules, rate limits and vote
//! bookkeeping live in the client; the node only stores documents and
//! applies patches atomically.

use advocacy_commons_store_api::{Document, DocumentQuery, NewDocument, Patch, QueryResponse};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;

use super::AppState;

/// Upper bound on documents returned by one query.
pub const MAX_QUERY_LIMIT: usize = 500;

/// `POST /v1/query`
pub async fn query(
    State(state): State<AppState>,
    body: Result<Json<DocumentQuery>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    let Json(mut query) = body?;
    if query.doc_type.is_empty() {
        return Err(AppError::BadRequest("query type must not be empty".into()));
    }
    query.limit = Some(query.limit.map_or(MAX_QUERY_LIMIT, |l| l.min(MAX_QUERY_LIMIT)));

    let documents = state.store.query(&query).await?;
    Ok(Json(QueryResponse { documents }))
}

/// `POST /v1/documents` — 201 with the stored document.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewDocument>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let Json(doc) = body?;
    if doc.doc_type.is_empty() {
        return Err(AppError::BadRequest("_type must not be empty".into()));
    }
    let created = state.store.create(doc).await?;
    tracing::debug!(id = %created.id, doc_type = %created.doc_type, "document created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /v1/documents/{id}`
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    state
        .store
        .get_document(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("document {id} not found")))
}

/// `POST /v1/documents/{id}/patch` — 404 if missing, 409 on a stale `ifRevision`.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Patch>, JsonRejection>,
) -> Result<Json<Document>, AppError> {
    let Json(patch) = body?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("patch has no operations".into()));
    }
    let doc = state.store.patch(&id, &patch).await?;
    Ok(Json(doc))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use advocacy_commons_store_api::{ErrorResponse, MemoryContentStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{config::NodeConfig, router::build_router};

    fn build_app() -> Router {
        build_router(Arc::new(MemoryContentStore::new()), NodeConfig::default())
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn create_get_patch_query() {
        let app = build_app();

        let (status, doc) = call(
            &app,
            "POST",
            "/v1/documents",
            Some(json!({ "_type": "resource", "title": "Ramp map" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = doc["_id"].as_str().unwrap().to_string();

        let (status, got) = call(&app, "GET", &format!("/v1/documents/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(got["title"], "Ramp map");

        let (status, patched) = call(
            &app,
            "POST",
            &format!("/v1/documents/{id}/patch"),
            Some(json!({ "setIfMissing": { "helpfulCount": 0 }, "inc": { "helpfulCount": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["helpfulCount"], 1);

        let (status, page) = call(
            &app,
            "POST",
            "/v1/query",
            Some(json!({ "type": "resource", "filter": [{ "op": "eq", "field": "helpfulCount", "value": 1 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["documents"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_document_is_404() {
        let app = build_app();
        let (status, body) = call(&app, "GET", "/v1/documents/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(err.code, "not_found");

        let (status, _) = call(
            &app,
            "POST",
            "/v1/documents/nope/patch",
            Some(json!({ "inc": { "n": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stale_revision_is_409() {
        let app = build_app();
        let (_, doc) = call(&app, "POST", "/v1/documents", Some(json!({ "_type": "comment" }))).await;
        let id = doc["_id"].as_str().unwrap();
        let rev = doc["_rev"].as_str().unwrap();

        let uri = format!("/v1/documents/{id}/patch");
        let (status, _) = call(&app, "POST", &uri, Some(json!({ "set": { "flagCount": 1 }, "ifRevision": rev }))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, "POST", &uri, Some(json!({ "set": { "flagCount": 2 }, "ifRevision": rev }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "revision_conflict");
    }

    #[tokio::test]
    async fn protected_fields_are_422() {
        let app = build_app();
        let (_, doc) = call(&app, "POST", "/v1/documents", Some(json!({ "_type": "comment" }))).await;
        let uri = format!("/v1/documents/{}/patch", doc["_id"].as_str().unwrap());
        let (status, body) = call(&app, "POST", &uri, Some(json!({ "set": { "_type": "resource" } }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "validation_failed");
    }

    #[tokio::test]
    async fn malformed_bodies_are_400() {
        let app = build_app();
        let (status, body) = call(&app, "POST", "/v1/query", Some(json!({ "filter": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_parameter");

        let (status, _) = call(&app, "POST", "/v1/documents", Some(json!({ "_type": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
