//! Progress-callback trait for summarize lifecycle events.
//!
//! Inject an [`Arc<dyn SummarizeObserver>`] via
//! [`crate::summarize::Summarizer::with_observer`] to receive events as the
//! file moves through upload, polling and generation. The CLI renders them
//! as a spinner; the HTTP handler runs without one and relies on tracing.
//!
//! # Example
//!
//! ```rust
//! use pdfy::{FileState, SummarizeObserver};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct PollCounter(AtomicU32);
//!
//! impl SummarizeObserver for PollCounter {
//!     fn on_poll(&self, _name: &str, _attempt: u32, _state: FileState) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::gemini::FileState;
use std::sync::Arc;
use std::time::Duration;

/// Called by the summarizer as it works through a request.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait SummarizeObserver: Send + Sync {
    /// Called before the bytes are sent to the service.
    fn on_upload_start(&self, file_name: &str, size_bytes: usize) {
        let _ = (file_name, size_bytes);
    }

    /// Called once the service has acknowledged the upload.
    ///
    /// # Arguments
    /// * `name` — the service's identifier for the file (`files/…`)
    fn on_upload_complete(&self, name: &str) {
        let _ = name;
    }

    /// Called after every state check.
    ///
    /// # Arguments
    /// * `attempt` — 1-indexed check number
    /// * `state`   — state reported by the service
    fn on_poll(&self, name: &str, attempt: u32, state: FileState) {
        let _ = (name, attempt, state);
    }

    /// Called when the file has left `PROCESSING` successfully.
    fn on_ready(&self, name: &str, waited: Duration) {
        let _ = (name, waited);
    }

    /// Called just before the generation request is sent.
    fn on_generation_start(&self, model: &str) {
        let _ = model;
    }

    /// Called with the byte length of the generated summary.
    fn on_summary(&self, summary_len: usize) {
        let _ = summary_len;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopObserver;

impl SummarizeObserver for NoopObserver {}

/// Convenience alias for the type stored in the summarizer.
pub type ObserverHandle = Arc<dyn SummarizeObserver>;
