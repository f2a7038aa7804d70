//! The external document service: upload a file, check its state, generate.
//!
//! The summarize flow depends on exactly three operations, captured by the
//! [`DocumentService`] trait. [`GeminiClient`] implements them against the
//! Gemini REST API; tests substitute an in-memory fake.
//!
//! ```text
//! upload(bytes, mime, display name) ──▶ RemoteFile { name, uri, state }
//! get_file(name)                    ──▶ RemoteFile { state: PROCESSING | ACTIVE | FAILED }
//! generate(model, prompt, file)     ──▶ text
//! ```

mod client;
mod wire;

pub use client::GeminiClient;

use crate::error::ServiceError;
use async_trait::async_trait;
use axum::body::Bytes;
use serde::{Deserialize, Serialize};

/// A PDF received from the browser, ready to forward.
#[derive(Debug, Clone)]
pub struct UploadedPdf {
    /// Original file name, used as the display name on the service.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw file content.
    pub bytes: Bytes,
}

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// The service has not reported a state.
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
    /// Still being processed; poll again later.
    Processing,
    /// Ready to be referenced in a generation request.
    #[serde(alias = "READY")]
    Active,
    /// Processing failed for good.
    Failed,
    /// A state this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl FileState {
    /// Whether the file has left `PROCESSING`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FileState::Processing)
    }
}

/// The service's handle on an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc-123`. Used for status checks.
    #[serde(default)]
    pub name: Option<String>,
    /// URI referenced by generation requests.
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub state: FileState,
    /// Service-side explanation when `state` is `FAILED`.
    #[serde(default)]
    pub error: Option<FileStatus>,
}

/// Error detail attached to a failed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The three document-service operations the summarize flow consumes.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload the file and return the service's handle on it.
    async fn upload(&self, pdf: UploadedPdf) -> Result<RemoteFile, ServiceError>;

    /// Fetch the current state of a previously uploaded file.
    async fn get_file(&self, name: &str) -> Result<RemoteFile, ServiceError>;

    /// Ask `model` to answer `prompt` about `file`; returns the generated text.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        file: &RemoteFile,
    ) -> Result<String, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_state_parsing() {
        let parse = |s: &str| serde_json::from_str::<FileState>(&format!("\"{s}\"")).unwrap();
        assert_eq!(parse("PROCESSING"), FileState::Processing);
        assert_eq!(parse("ACTIVE"), FileState::Active);
        assert_eq!(parse("READY"), FileState::Active);
        assert_eq!(parse("FAILED"), FileState::Failed);
        assert_eq!(parse("STATE_UNSPECIFIED"), FileState::Unspecified);
        assert_eq!(parse("ARCHIVED"), FileState::Unknown);
    }

    #[test]
    fn only_processing_is_non_terminal() {
        assert!(!FileState::Processing.is_terminal());
        assert!(FileState::Active.is_terminal());
        assert!(FileState::Failed.is_terminal());
        assert!(FileState::Unknown.is_terminal());
    }

    #[test]
    fn remote_file_from_service_json() {
        let json = r#"{
            "name": "files/abc-123",
            "displayName": "report.pdf",
            "mimeType": "application/pdf",
            "sizeBytes": "1024",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc-123",
            "state": "PROCESSING"
        }"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.name.as_deref(), Some("files/abc-123"));
        assert_eq!(file.display_name.as_deref(), Some("report.pdf"));
        assert_eq!(file.state, FileState::Processing);
    }

    #[test]
    fn remote_file_tolerates_missing_fields() {
        let file: RemoteFile = serde_json::from_str("{}").unwrap();
        assert!(file.name.is_none());
        assert_eq!(file.state, FileState::Unspecified);
    }
}
