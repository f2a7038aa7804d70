//! Prompt and model defaults for the summary request.
//!
//! Callers can override both via [`crate::config::SummarizeConfig`]; the
//! constants here are used only when no override is provided.

/// Instruction sent together with the uploaded file.
pub const SUMMARY_PROMPT: &str = "Summarize this document";

/// Gemini model that produces the summary.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro-exp-03-25";
