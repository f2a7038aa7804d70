//! JSON bodies returned by `POST /api/summarize`.

use serde::{Deserialize, Serialize};

/// Success body: `{ "summary": "…" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Markdown summary of the uploaded document.
    pub summary: String,
}

/// Failure body: `{ "error": "…" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either body, as seen by a client that has not checked the status yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SummarizeReply {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
