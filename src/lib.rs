//! # pdfy
//!
//! Upload a PDF, let Gemini read it, get a Markdown summary back.
//!
//! The crate is a small web application: a form page, a proxy endpoint that
//! forwards the PDF to the Gemini Files API and waits for it to be
//! processed, and a client that submits PDFs from the command line.
//!
//! ## Request Flow
//!
//! ```text
//! Browser / pdfy submit
//!  │  POST /api/summarize (multipart, field "file")
//!  ▼
//! Proxy endpoint
//!  ├─ 1. Upload    bytes → Gemini Files API (resumable upload)
//!  ├─ 2. Poll      files/{id} every 2 s until it leaves PROCESSING
//!  ├─ 3. Generate  "Summarize this document" + file URI
//!  └─ 4. Reply     { "summary": … }  or  { "error": … }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfy::{serve, SummarizeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummarizeConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     serve(config, "127.0.0.1:3000".parse()?).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfy` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod output;
pub mod progress;
pub mod prompts;
pub mod server;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{FormController, FormState, PdfFile};
pub use config::{PollPolicy, SummarizeConfig, SummarizeConfigBuilder};
pub use error::{FormError, ServiceError, SummarizeError};
pub use gemini::{DocumentService, FileState, GeminiClient, RemoteFile, UploadedPdf};
pub use output::{ErrorResponse, SummaryResponse};
pub use progress::{NoopObserver, SummarizeObserver};
pub use server::{create_router, serve, AppState};
pub use summarize::Summarizer;
