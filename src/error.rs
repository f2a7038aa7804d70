//! Error types for the pdfy library.
//!
//! Three error types reflect three distinct layers:
//!
//! * [`ServiceError`] — a single call to the document service failed
//!   (transport error, non-2xx answer, undecodable body). Returned by the
//!   [`crate::gemini::DocumentService`] implementations.
//!
//! * [`SummarizeError`] — the summarize request as a whole failed. Each
//!   variant names the step that failed so logs stay precise, while
//!   [`SummarizeError::public_message`] and [`SummarizeError::status_code`]
//!   give callers the uniform `{ "error": … }` shape.
//!
//! * [`FormError`] — the client refused to submit the form (no file, not a
//!   PDF, bad endpoint URL). Server and network failures are not errors for
//!   the client; they end up in [`crate::client::FormState::error`].

use crate::output::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Message returned when an upstream failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A failed call to the external document service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset…).
    #[error("request to document service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("document service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected schema.
    #[error("unexpected response from document service: {0}")]
    Decode(String),

    /// The service refused to answer the prompt.
    #[error("generation blocked by the service: {0}")]
    Blocked(String),

    /// The resumable upload session was opened but no upload URL came back.
    #[error("upload session did not return an upload URL")]
    MissingUploadUrl,
}

impl ServiceError {
    /// The most specific message available, as shown to end users.
    ///
    /// For API errors this is the service's own message without the
    /// status prefix.
    pub fn message(&self) -> String {
        match self {
            ServiceError::Api { message, .. } if !message.is_empty() => message.clone(),
            ServiceError::Api { .. } => UNKNOWN_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

/// All failures of a `POST /api/summarize` request.
#[derive(Debug, Error)]
pub enum SummarizeError {
    // ── Configuration ─────────────────────────────────────────────────────
    /// No API key was configured for the document service.
    #[error("Missing Gemini API key.")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Client input ──────────────────────────────────────────────────────
    /// The multipart form had no `file` field.
    #[error("No file uploaded.")]
    NoFile,

    /// The request body could not be parsed as a multipart form.
    #[error("Invalid form data: {0}")]
    InvalidForm(String),

    /// The request body exceeded the configured upload limit.
    #[error("File is too large (limit: {limit} bytes).")]
    UploadTooLarge { limit: usize },

    // ── Upstream ──────────────────────────────────────────────────────────
    /// Uploading the bytes to the document service failed.
    #[error("upload failed: {0}")]
    UploadFailed(#[source] ServiceError),

    /// The upload succeeded but the service returned no file name.
    #[error("Failed to get file name after upload.")]
    IdentifierMissing,

    /// The service finished processing the file with state `FAILED`.
    #[error("File processing failed.")]
    ProcessingFailed { name: String },

    /// The generation request failed or produced no text.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The file was still processing when the poll budget ran out.
    #[error("File processing timed out after {}s.", .waited.as_secs())]
    Timeout { name: String, waited: Duration },

    /// Any other upstream failure (status check, malformed response…).
    #[error("{0}")]
    Unclassified(String),
}

impl SummarizeError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SummarizeError::NoFile | SummarizeError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            SummarizeError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            SummarizeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The string placed in the `error` field of the JSON response.
    ///
    /// Upstream failures surface the service's own message when there is
    /// one, so users see "API key not valid" rather than a generic wrapper.
    pub fn public_message(&self) -> String {
        match self {
            SummarizeError::UploadFailed(e) => e.message(),
            SummarizeError::GenerationFailed(msg) | SummarizeError::Unclassified(msg) => {
                if msg.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    msg.clone()
                }
            }
            other => other.to_string(),
        }
    }

    /// Whether the failure was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for SummarizeError {
    fn into_response(self) -> Response {
        match &self {
            SummarizeError::MissingApiKey | SummarizeError::InvalidConfig(_) => {
                tracing::error!("Configuration error: {}", self);
            }
            _ if self.is_client_error() => {
                tracing::debug!("Client error: {}", self);
            }
            SummarizeError::Timeout { name, .. } | SummarizeError::ProcessingFailed { name } => {
                tracing::warn!(%name, "Upstream processing error: {}", self);
            }
            _ => {
                tracing::error!("Upstream error: {:#}", self);
            }
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Reasons the client refuses to submit a form.
#[derive(Debug, Error)]
pub enum FormError {
    /// The file input is required.
    #[error("Please choose a PDF file to summarize.")]
    FileRequired,

    /// The chosen file does not start with the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// The chosen file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server URL is not a valid absolute URL.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
