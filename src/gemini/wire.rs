//! JSON bodies exchanged with the Gemini REST API.

use super::RemoteFile;
use serde::{Deserialize, Serialize};

// ── Files API ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct StartUploadRequest<'a> {
    pub file: FileMetadata<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileMetadata<'a> {
    pub display_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponse {
    #[serde(default)]
    pub file: Option<RemoteFile>,
}

// ── generateContent ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct Content<'a> {
    pub role: &'a str,
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    File {
        file_data: FileData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
    pub file_uri: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    /// Set on reasoning parts of thinking models; not part of the answer.
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated answer text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

// ── Errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_shape() {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    RequestPart::Text {
                        text: "Summarize this document",
                    },
                    RequestPart::File {
                        file_data: FileData {
                            mime_type: Some("application/pdf"),
                            file_uri: "https://example.test/files/a",
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Summarize this document");
        assert_eq!(
            json["contents"][0]["parts"][1]["fileData"]["fileUri"],
            "https://example.test/files/a"
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["fileData"]["mimeType"],
            "application/pdf"
        );
    }

    #[test]
    fn response_text_skips_thoughts() {
        let json = r###"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking…", "thought": true},
                        {"text": "## Summary\n"},
                        {"text": "Short."}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"###;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text(), "## Summary\nShort.");
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(resp.text(), "");
        assert_eq!(
            resp.prompt_feedback.and_then(|f| f.block_reason).as_deref(),
            Some("SAFETY")
        );
    }
}
