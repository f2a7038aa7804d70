//! Client side of the upload form.
//!
//! [`FormController`] mirrors what the browser page does: one required PDF
//! input, a loading flag that blocks resubmission, and either a summary or
//! an error message once the request settles. The CLI's `submit` command is
//! a thin shim over it.
//!
//! Server-side failures never surface as `Err` here; like the browser form,
//! they become the text in [`FormState::error`]. `Err(FormError)` is reserved
//! for submissions refused before any request is sent.

use crate::error::{FormError, UNKNOWN_ERROR};
use crate::output::SummarizeReply;
use crate::server::FILE_FIELD;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::path::Path;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Message shown when the request failed without a server-provided reason.
pub const FALLBACK_ERROR: &str = "Failed to summarize PDF";

/// Route of the summarize endpoint, relative to the server root.
pub const SUMMARIZE_PATH: &str = "/api/summarize";

const PDF_MIME_TYPE: &str = "application/pdf";

/// A PDF chosen by the user.
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    /// Read a PDF from disk, rejecting files without the `%PDF` magic bytes.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| FormError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if !bytes.starts_with(b"%PDF") {
            return Err(FormError::NotAPdf {
                path: path.to_path_buf(),
                magic: bytes.iter().take(4).copied().collect(),
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        debug!("Resolved local PDF: {}", path.display());
        Ok(Self { file_name, bytes })
    }
}

/// What the form currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Summary from the last successful submission, exactly as the server
    /// returned it. Markdown source; nothing here renders it.
    pub summary: Option<String>,
    /// Error message from the last failed submission.
    pub error: Option<String>,
    /// `true` while a request is in flight.
    pub loading: bool,
}

/// Drives submissions to a pdfy server.
pub struct FormController {
    http: reqwest::Client,
    endpoint: Url,
    state: FormState,
    loading_tx: watch::Sender<bool>,
}

impl FormController {
    /// Controller for the server at `server_url` (e.g. `http://localhost:3000`).
    pub fn new(server_url: &str) -> Result<Self, FormError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| FormError::Client(e.to_string()))?;
        Self::with_client(http, server_url)
    }

    /// Controller using a caller-supplied HTTP client.
    pub fn with_client(http: reqwest::Client, server_url: &str) -> Result<Self, FormError> {
        let invalid = |reason: String| FormError::InvalidEndpoint {
            url: server_url.to_string(),
            reason,
        };
        let base = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https".into()));
        }
        let endpoint = base.join(SUMMARIZE_PATH).map_err(|e| invalid(e.to_string()))?;
        let (loading_tx, _) = watch::channel(false);

        Ok(Self {
            http,
            endpoint,
            state: FormState::default(),
            loading_tx,
        })
    }

    /// Full URL submissions are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Watch the loading flag, e.g. to drive a spinner from another task.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    /// Submit the form.
    ///
    /// `None` is rejected with [`FormError::FileRequired`] before any
    /// request is made. Otherwise the previous summary and error are
    /// cleared, the loading flag is raised for the duration of the request
    /// and lowered again however the request ends.
    pub async fn submit(&mut self, file: Option<PdfFile>) -> Result<&FormState, FormError> {
        let file = file.ok_or(FormError::FileRequired)?;

        let http = &self.http;
        let endpoint = &self.endpoint;
        let loading_tx = &self.loading_tx;
        let mut state = scopeguard::guard(&mut self.state, |state| {
            state.loading = false;
            loading_tx.send_replace(false);
        });

        state.summary = None;
        state.error = None;
        state.loading = true;
        loading_tx.send_replace(true);

        match post_file(http, endpoint, file).await {
            Ok(summary) => state.summary = Some(summary),
            Err(message) => state.error = Some(message),
        }
        drop(state);

        Ok(&self.state)
    }
}

/// Post the file and turn the reply into a summary or a display message.
async fn post_file(http: &reqwest::Client, endpoint: &Url, file: PdfFile) -> Result<String, String> {
    let part = Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(PDF_MIME_TYPE)
        .map_err(|_| FALLBACK_ERROR.to_string())?;
    let form = Form::new().part(FILE_FIELD, part);

    let response = http
        .post(endpoint.clone())
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            warn!("Request to {} failed: {}", endpoint, e);
            FALLBACK_ERROR.to_string()
        })?;

    let status = response.status();
    let reply: SummarizeReply = response.json().await.map_err(|e| {
        warn!("Undecodable reply (HTTP {}): {}", status, e);
        FALLBACK_ERROR.to_string()
    })?;

    if !status.is_success() {
        return Err(reply
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()));
    }

    reply.summary.ok_or_else(|| FALLBACK_ERROR.to_string())
}
