//! Route handlers.

use super::AppState;
use crate::error::SummarizeError;
use crate::gemini::UploadedPdf;
use crate::output::SummaryResponse;
use crate::summarize::Summarizer;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};

/// Name of the multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

const DEFAULT_MIME_TYPE: &str = "application/pdf";
const DEFAULT_FILE_NAME: &str = "document.pdf";

static INDEX_HTML: &str = include_str!("assets/index.html");

/// `GET /` — the upload form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/summarize`
///
/// Takes the raw request rather than a `Multipart` extractor so the
/// credential check runs before anything touches the body.
pub async fn summarize(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SummaryResponse>, SummarizeError> {
    let service = state.service.clone().ok_or(SummarizeError::MissingApiKey)?;

    let mut multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|e| SummarizeError::InvalidForm(e.body_text()))?;
    let pdf = read_file_field(&mut multipart, state.config.max_upload_bytes)
        .await?
        .ok_or(SummarizeError::NoFile)?;

    let summary = Summarizer::new(service, &state.config).summarize(pdf).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Pull the first non-empty `file` field out of the form; other fields are
/// skipped.
async fn read_file_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<Option<UploadedPdf>, SummarizeError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e.status(), e.body_text(), limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let mime_type = field
            .content_type()
            .filter(|m| !m.is_empty() && *m != "application/octet-stream")
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text(), limit))?;

        // Browsers send an empty part when the input was left blank.
        if bytes.is_empty() {
            return Ok(None);
        }

        tracing::debug!(%file_name, %mime_type, size = bytes.len(), "Received upload");
        return Ok(Some(UploadedPdf {
            file_name,
            mime_type,
            bytes,
        }));
    }
    Ok(None)
}

fn multipart_error(status: StatusCode, text: String, limit: usize) -> SummarizeError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        SummarizeError::UploadTooLarge { limit }
    } else {
        SummarizeError::InvalidForm(text)
    }
}
