//! Client for the document extraction service.
//!
//! The service receives the raw document as a multipart `file` field and
//! answers with JSON describing the contract's core fields. Normalising that
//! JSON is left to [`dealping_core::extraction::ExtractedContract`].

use std::time::Duration;

use async_trait::async_trait;
use dealping_core::extraction::DocumentKind;
use serde_json::Value;

use crate::error::AppError;

/// HTTP request timeout for one extraction call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for extraction failures.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No `EXTRACTION_SERVICE_URL` was configured.
    #[error("Document extraction is not configured")]
    NotConfigured,

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("Extraction request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Extraction service returned HTTP {0}")]
    HttpStatus(u16),

    /// The service answered with something other than a JSON object.
    #[error("Extraction service returned an unexpected body")]
    InvalidBody,
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// ContractExtractor
// ---------------------------------------------------------------------------

/// Turns an uploaded document into raw contract fields.
#[async_trait]
pub trait ContractExtractor: Send + Sync {
    /// Returns the service's JSON object unchanged.
    async fn extract(
        &self,
        file_name: &str,
        kind: DocumentKind,
        bytes: Vec<u8>,
    ) -> Result<Value, ExtractionError>;
}

/// [`ContractExtractor`] that POSTs to an HTTP extraction service.
pub struct HttpExtractor {
    client: reqwest::Client,
    url: Option<String>,
}

impl HttpExtractor {
    /// Build the client. With `url = None` every call fails with
    /// [`ExtractionError::NotConfigured`].
    pub fn new(url: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ContractExtractor for HttpExtractor {
    async fn extract(
        &self,
        file_name: &str,
        kind: DocumentKind,
        bytes: Vec<u8>,
    ) -> Result<Value, ExtractionError> {
        let url = self.url.as_deref().ok_or(ExtractionError::NotConfigured)?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(kind.mime_type())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::HttpStatus(status.as_u16()));
        }

        let body: Value = response.json().await?;
        tracing::debug!(file_name, "Document extraction completed");
        unwrap_payload(body)
    }
}

/// Accept either a bare object or one wrapped in `{ "data": { ... } }`.
fn unwrap_payload(body: Value) -> Result<Value, ExtractionError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => Ok(inner),
            Some(other) => {
                map.insert("data".into(), other);
                Ok(Value::Object(map))
            }
            None => Ok(Value::Object(map)),
        },
        _ => Err(ExtractionError::InvalidBody),
    }
}
