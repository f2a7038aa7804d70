//! [`DocumentService`] over the Gemini REST API.
//!
//! Uploads use the resumable protocol: one request opens the session and
//! returns an upload URL, a second request sends the bytes and finalises.
//! Both fit in a single round trip each because the whole PDF is already in
//! memory.

use super::wire::{
    ApiErrorEnvelope, Content, FileData, FileMetadata, GenerateContentRequest,
    GenerateContentResponse, RequestPart, StartUploadRequest, UploadResponse,
};
use super::{DocumentService, RemoteFile, UploadedPdf};
use crate::config::SummarizeConfig;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Gemini API client bound to one API key.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    generate_timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("generate_timeout", &self.generate_timeout)
            .finish()
    }
}

impl GeminiClient {
    /// Wrap an existing HTTP client. `base_url` has no trailing slash.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            generate_timeout: None,
        }
    }

    /// Timeout for `generateContent` calls, overriding the HTTP client's own.
    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = Some(timeout);
        self
    }

    /// Build a client from the proxy configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &SummarizeConfig) -> Result<Option<Self>, ServiceError> {
        let Some(ref key) = config.api_key else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Some(
            Self::new(http, &config.api_base_url, key)
                .with_generate_timeout(Duration::from_secs(config.generate_timeout_secs)),
        ))
    }

    async fn start_upload(&self, pdf: &UploadedPdf) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", pdf.bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", &pdf.mime_type)
            .json(&StartUploadRequest {
                file: FileMetadata {
                    display_name: &pdf.file_name,
                },
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(ServiceError::MissingUploadUrl)
    }
}

#[async_trait]
impl DocumentService for GeminiClient {
    async fn upload(&self, pdf: UploadedPdf) -> Result<RemoteFile, ServiceError> {
        let upload_url = self.start_upload(&pdf).await?;
        debug!(file_name = %pdf.file_name, size = pdf.bytes.len(), "upload session opened");

        let response = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(pdf.bytes)
            .send()
            .await?;
        let body: UploadResponse = decode(check_status(response).await?).await?;

        Ok(body.file.unwrap_or_default())
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, ServiceError> {
        let response = self
            .http
            .get(format!("{}/v1beta/{}", self.base_url, name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        file: &RemoteFile,
    ) -> Result<String, ServiceError> {
        let file_uri = file
            .uri
            .as_deref()
            .ok_or_else(|| ServiceError::Decode("file has no URI".into()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    RequestPart::Text { text: prompt },
                    RequestPart::File {
                        file_data: FileData {
                            mime_type: file.mime_type.as_deref(),
                            file_uri,
                        },
                    },
                ],
            }],
        };

        let mut builder = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request);
        if let Some(timeout) = self.generate_timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder.send().await?;
        let body: GenerateContentResponse = decode(check_status(response).await?).await?;

        if body.candidates.is_empty() {
            if let Some(reason) = body.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
                return Err(ServiceError::Blocked(reason));
            }
        }
        Ok(body.text())
    }
}

/// Turn a non-2xx response into [`ServiceError::Api`], preferring the
/// message from Gemini's `{"error": {...}}` envelope.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorEnvelope>(&text) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ if !text.trim().is_empty() => text.trim().to_string(),
        _ => status.canonical_reason().unwrap_or_default().to_string(),
    };

    Err(ServiceError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
}
