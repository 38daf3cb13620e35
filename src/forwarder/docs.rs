//! Google Docs REST client: `documents.create` and the `insertText`
//! request of `documents.batchUpdate`.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forwarder::auth::TokenProvider;

const DOCS_API_URL: &str = "https://docs.googleapis.com/v1/documents";

/// What went wrong talking to the document service.
#[derive(Debug)]
pub enum DocsError {
    /// Could not obtain a bearer token.
    Auth(String),
    /// The request never completed (network, TLS, timeout).
    Http(String),
    /// The service answered with a non-success status.
    Api { status: u16, body: String },
    /// The response body did not have the expected shape.
    Parse(String),
}

impl fmt::Display for DocsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "auth failed: {msg}"),
            Self::Http(msg) => write!(f, "request failed: {msg}"),
            Self::Api { status, body } => write!(f, "API error {status}: {body}"),
            Self::Parse(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for DocsError {}

/// The two document-service calls the forwarder needs. The engine is
/// tested against an in-memory implementation of this trait.
#[async_trait]
pub trait DocsApi: Send + Sync {
    /// Create a document, returning its newly assigned id.
    async fn create_document(&self, title: &str) -> Result<String, DocsError>;

    /// Insert `text` at absolute character offset `index` in the document
    /// body.
    async fn insert_text(&self, document_id: &str, index: u32, text: &str)
    -> Result<(), DocsError>;
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
struct CreateResponse {
    #[serde(rename = "documentId")]
    document_id: String,
}

#[derive(Serialize)]
struct BatchUpdateRequest {
    requests: Vec<UpdateRequest>,
}

#[derive(Serialize)]
enum UpdateRequest {
    #[serde(rename = "insertText")]
    InsertText { location: Location, text: String },
}

#[derive(Serialize)]
struct Location {
    index: u32,
}

pub struct GoogleDocsClient {
    auth: TokenProvider,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleDocsClient {
    pub fn new(auth: TokenProvider, client: reqwest::Client) -> Self {
        Self { auth, client, base_url: DOCS_API_URL.to_string() }
    }

    async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<String, DocsError> {
        let token = self.auth.bearer_token().await.map_err(DocsError::Auth)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| DocsError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocsError::Http(format!("failed to read response: {e}")))?;

        debug!("Docs API {url} -> {status}");

        if !status.is_success() {
            return Err(DocsError::Api { status: status.as_u16(), body });
        }

        Ok(body)
    }
}

#[async_trait]
impl DocsApi for GoogleDocsClient {
    async fn create_document(&self, title: &str) -> Result<String, DocsError> {
        let body = self.post_json(&self.base_url, &CreateRequest { title }).await?;

        let parsed: CreateResponse =
            serde_json::from_str(&body).map_err(|e| DocsError::Parse(e.to_string()))?;

        Ok(parsed.document_id)
    }

    async fn insert_text(
        &self,
        document_id: &str,
        index: u32,
        text: &str,
    ) -> Result<(), DocsError> {
        let url = format!("{}/{}:batchUpdate", self.base_url, document_id);
        let request = BatchUpdateRequest {
            requests: vec![UpdateRequest::InsertText {
                location: Location { index },
                text: text.to_string(),
            }],
        };

        self.post_json(&url, &request).await?;
        Ok(())
    }
}
