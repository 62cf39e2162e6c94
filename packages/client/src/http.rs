//! [`ContentStore`] over HTTP, talking to a document node.
//!
//! Wraps a pooled [`reqwest::Client`] with a request timeout. Transport
//! failures become [`StoreError::Network`]; error responses are mapped back
//! from their [`ErrorResponse`] code.

use std::time::Duration;

use advocacy_commons::Submission;
use advocacy_commons_store_api::{
    ContentStore, Document, DocumentQuery, ErrorResponse, NewDocument, NodeInfo,
    Patch, QueryResponse, StoreError, SubmissionRequest, SubmitResponse,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Applied to every request unless a custom client is supplied.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A content store reached through a node's `/v1` API.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: Client,
    base: Url,
}

impl HttpContentStore {
    /// Connect to the node at `base_url`, e.g. `http://127.0.0.1:3333`.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Self::with_client(client, base_url)
    }

    /// Use a pre-configured client (custom timeout, proxy, ...).
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| StoreError::Invalid(format!("bad node URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Invalid(format!("bad node URL {base_url:?}")));
        }
        Ok(Self { client, base })
    }

    /// `GET /v1/info`
    pub async fn info(&self) -> Result<NodeInfo, StoreError> {
        let resp = send(self.client.get(self.url(&["v1", "info"])?)).await?;
        json(resp).await
    }

    /// `POST /api/submit`, the public submission form endpoint.
    ///
    /// For callers that post the raw form and let the node validate it.
    /// Readers holding a [`CommunityClient`](crate::CommunityClient) use
    /// [`CommunityClient::submit`](crate::CommunityClient::submit), which
    /// validates locally and writes the document itself.
    pub async fn submit_form(&self, submission: &Submission) -> Result<SubmitResponse, StoreError> {
        let body = SubmissionRequest::from(submission);
        let resp = send(self.client.post(self.url(&["api", "submit"])?).json(&body)).await?;
        json(resp).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Invalid(format!("bad node URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let resp = send(self.client.post(self.url(&["v1", "query"])?).json(query)).await?;
        let page: QueryResponse = json(resp).await?;
        Ok(page.documents)
    }

    async fn create(&self, doc: NewDocument) -> Result<Document, StoreError> {
        let resp = send(self.client.post(self.url(&["v1", "documents"])?).json(&doc)).await?;
        json(resp).await
    }

    async fn patch(&self, id: &str, patch: &Patch) -> Result<Document, StoreError> {
        let url = self.url(&["v1", "documents", id, "patch"])?;
        let resp = send(self.client.post(url).json(patch)).await?;
        json(resp).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.url(&["v1", "documents", id])?;
        match send(self.client.get(url)).await {
            Ok(resp) => json(resp).await.map(Some),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Send and turn any non-2xx status into a [`StoreError`].
async fn send(req: RequestBuilder) -> Result<Response, StoreError> {
    let resp = req
        .send()
        .await
        .map_err(|e| StoreError::Network(e.to_string()))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Option<ErrorResponse> = resp.json().await.ok();
    Err(status_error(status, body))
}

async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    resp.json()
        .await
        .map_err(|e| StoreError::Network(format!("invalid response body: {e}")))
}

fn status_error(status: StatusCode, body: Option<ErrorResponse>) -> StoreError {
    if let Some(err) = body.as_ref().and_then(ErrorResponse::to_store_error) {
        return err;
    }
    let message = body.map(|b| b.error).unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound,
        StatusCode::CONFLICT => StoreError::Conflict(message),
        s if s.is_client_error() => StoreError::Invalid(message),
        s => StoreError::Internal(format!("node returned {s}: {message}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use advocacy_commons_store_api::error::codes;

    use axum::http::StatusCode as AxumStatus;
    use axum::{routing::get, routing::post, Json, Router};
    use tokio::net::TcpListener;

    async fn spawn_mock_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn status_mapping() {
        let conflict = ErrorResponse::new(codes::REVISION_CONFLICT, "stale");
        assert_eq!(
            status_error(StatusCode::CONFLICT, Some(conflict)),
            StoreError::Conflict("stale".into())
        );
        assert_eq!(status_error(StatusCode::NOT_FOUND, None), StoreError::NotFound);
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, None),
            StoreError::Invalid(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, None),
            StoreError::Internal(_)
        ));
    }

    #[test]
    fn urls_keep_a_base_path_prefix() {
        let s = HttpContentStore::new("http://node.example/commons/").unwrap();
        let url = s.url(&["v1", "documents", "a b", "patch"]).unwrap();
        assert_eq!(url.as_str(), "http://node.example/commons/v1/documents/a%20b/patch");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(HttpContentStore::new("not a url"), Err(StoreError::Invalid(_))));
        assert!(matches!(HttpContentStore::new("mailto:x@y.z"), Err(StoreError::Invalid(_))));
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let router = Router::new().route(
            "/v1/documents/{id}",
            get(|| async {
                (
                    AxumStatus::NOT_FOUND,
                    Json(ErrorResponse::new(codes::NOT_FOUND, "document not found")),
                )
            }),
        );
        let base = spawn_mock_server(router).await;
        let store = HttpContentStore::new(&base).unwrap();
        assert_eq!(store.get_document("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn conflict_response_becomes_conflict_error() {
        let router = Router::new().route(
            "/v1/documents/{id}/patch",
            post(|| async {
                (
                    AxumStatus::CONFLICT,
                    Json(ErrorResponse::new(codes::REVISION_CONFLICT, "revision moved")),
                )
            }),
        );
        let base = spawn_mock_server(router).await;
        let store = HttpContentStore::new(&base).unwrap();
        let err = store.patch("c1", &Patch::new().set("a", 1)).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("revision moved".into()));
    }

    #[tokio::test]
    async fn unreachable_node_is_a_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = HttpContentStore::new(&format!("http://{addr}")).unwrap();
        let err = store.query(&DocumentQuery::of_type("comment")).await.unwrap_err();
        assert!(matches!(err, StoreError::Network(_)));
    }
}
