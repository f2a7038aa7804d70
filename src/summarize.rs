//! The summarize flow: upload, wait until ready, generate.
//!
//! ```text
//! UploadedPdf
//!  │
//!  ├─ 1. Upload   bytes + MIME type + display name → RemoteFile
//!  ├─ 2. Verify   the service returned a file name
//!  ├─ 3. Poll     get_file(name) every `poll_interval` while PROCESSING,
//!  │              bounded by `max_poll_wait`
//!  ├─ 4. Check    FAILED is terminal failure
//!  └─ 5. Generate one request referencing the file URI; its text is the
//!              summary, returned as-is
//! ```
//!
//! Every failure maps to exactly one [`SummarizeError`] variant so the log
//! line says which step broke, while the HTTP response keeps the uniform
//! `{ "error": … }` shape.

use crate::config::{PollPolicy, SummarizeConfig};
use crate::error::SummarizeError;
use crate::gemini::{DocumentService, FileState, RemoteFile, UploadedPdf};
use crate::progress::ObserverHandle;
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Runs one summarize request against a [`DocumentService`].
///
/// Holds no per-request state; a single instance can serve concurrent
/// requests.
#[derive(Clone)]
pub struct Summarizer {
    service: Arc<dyn DocumentService>,
    model: String,
    prompt: String,
    poll: PollPolicy,
    observer: Option<ObserverHandle>,
}

impl Summarizer {
    pub fn new(service: Arc<dyn DocumentService>, config: &SummarizeConfig) -> Self {
        Self {
            service,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            poll: config.poll_policy(),
            observer: None,
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Upload `pdf`, wait for the service to process it and return the
    /// generated summary text unchanged.
    pub async fn summarize(&self, pdf: UploadedPdf) -> Result<String, SummarizeError> {
        let start = Instant::now();
        info!(file_name = %pdf.file_name, size = pdf.bytes.len(), "Uploading PDF");
        if let Some(ref obs) = self.observer {
            obs.on_upload_start(&pdf.file_name, pdf.bytes.len());
        }

        // ── Step 1–2: Upload and verify the identifier ───────────────────
        let uploaded = self
            .service
            .upload(pdf)
            .await
            .map_err(SummarizeError::UploadFailed)?;
        let name = uploaded
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(SummarizeError::IdentifierMissing)?;
        debug!(%name, "Upload acknowledged");
        if let Some(ref obs) = self.observer {
            obs.on_upload_complete(&name);
        }

        // ── Step 3–4: Poll until terminal ────────────────────────────────
        let ready = self.wait_until_ready(&name).await?;

        // ── Step 5: Generate ─────────────────────────────────────────────
        if let Some(ref obs) = self.observer {
            obs.on_generation_start(&self.model);
        }
        let summary = self
            .service
            .generate(&self.model, &self.prompt, &ready)
            .await
            .map_err(|e| SummarizeError::GenerationFailed(e.message()))?;
        if let Some(ref obs) = self.observer {
            obs.on_summary(summary.len());
        }

        info!(
            %name,
            summary_len = summary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Summary generated"
        );
        Ok(summary)
    }

    /// Check the file state immediately, then every `poll.interval` while it
    /// is `PROCESSING`.
    ///
    /// Returns the ready file, [`SummarizeError::ProcessingFailed`] for
    /// `FAILED`, or [`SummarizeError::Timeout`] once the next sleep would
    /// exceed `poll.max_wait`.
    pub async fn wait_until_ready(&self, name: &str) -> Result<RemoteFile, SummarizeError> {
        let started = Instant::now();
        let mut attempt = 1;
        let mut file = self.check_state(name, attempt).await?;

        while !file.state.is_terminal() {
            let waited = started.elapsed();
            if !self.poll.allows_another_wait(waited) {
                warn!(%name, waited_ms = waited.as_millis() as u64, "File still processing, giving up");
                return Err(SummarizeError::Timeout {
                    name: name.to_string(),
                    waited,
                });
            }
            sleep(self.poll.interval).await;
            attempt += 1;
            file = self.check_state(name, attempt).await?;
        }

        if file.state == FileState::Failed {
            let detail = file
                .error
                .as_ref()
                .and_then(|e| e.message.as_deref())
                .unwrap_or("no detail");
            warn!(%name, detail, "File processing failed");
            return Err(SummarizeError::ProcessingFailed {
                name: name.to_string(),
            });
        }

        if file.uri.as_deref().is_none_or(str::is_empty) {
            return Err(SummarizeError::Unclassified(format!(
                "File '{name}' has no URI after processing."
            )));
        }

        let waited = started.elapsed();
        debug!(%name, state = ?file.state, checks = attempt, "File ready");
        if let Some(ref obs) = self.observer {
            obs.on_ready(name, waited);
        }
        Ok(file)
    }

    async fn check_state(&self, name: &str, attempt: u32) -> Result<RemoteFile, SummarizeError> {
        let file = self
            .service
            .get_file(name)
            .await
            .map_err(|e| SummarizeError::Unclassified(e.message()))?;
        debug!(%name, attempt, state = ?file.state, "Checked file state");
        if let Some(ref obs) = self.observer {
            obs.on_poll(name, attempt, file.state);
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::gemini::FileStatus;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted service: returns queued states from `get_file`.
    struct Scripted {
        upload_name: Option<String>,
        states: Mutex<Vec<FileState>>,
        checks: AtomicUsize,
        generated: AtomicUsize,
        text: String,
    }

    impl Scripted {
        fn new(states: Vec<FileState>) -> Self {
            Self {
                upload_name: Some("files/abc".into()),
                states: Mutex::new(states),
                checks: AtomicUsize::new(0),
                generated: AtomicUsize::new(0),
                text: "A short summary.".into(),
            }
        }
    }

    #[async_trait]
    impl DocumentService for Scripted {
        async fn upload(&self, _pdf: UploadedPdf) -> Result<RemoteFile, ServiceError> {
            Ok(RemoteFile {
                name: self.upload_name.clone(),
                ..Default::default()
            })
        }

        async fn get_file(&self, name: &str) -> Result<RemoteFile, ServiceError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            let mut states = self.states.lock().unwrap();
            let state = if states.len() > 1 { states.remove(0) } else { states[0] };
            Ok(RemoteFile {
                name: Some(name.to_string()),
                uri: Some(format!("https://files.test/{name}")),
                state,
                error: (state == FileState::Failed).then(|| FileStatus {
                    code: Some(3),
                    message: Some("unsupported".into()),
                }),
                ..Default::default()
            })
        }

        async fn generate(
            &self,
            _model: &str,
            _prompt: &str,
            _file: &RemoteFile,
        ) -> Result<String, ServiceError> {
            self.generated.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    fn pdf() -> UploadedPdf {
        UploadedPdf {
            file_name: "report.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes: Bytes::from_static(b"%PDF-1.7 test"),
        }
    }

    fn summarizer(service: Arc<Scripted>, max_wait: Option<Duration>) -> Summarizer {
        let config = SummarizeConfig::builder()
            .api_key("test")
            .max_poll_wait(max_wait)
            .build()
            .unwrap();
        Summarizer::new(service, &config)
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_ready_with_fixed_interval() {
        let service = Arc::new(Scripted::new(vec![
            FileState::Processing,
            FileState::Processing,
            FileState::Active,
        ]));
        let s = summarizer(service.clone(), None);

        let started = Instant::now();
        let summary = s.summarize(pdf()).await.unwrap();

        assert_eq!(summary, "A short summary.");
        assert_eq!(service.checks.load(Ordering::SeqCst), 3);
        assert_eq!(service.generated.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn already_active_checks_once() {
        let service = Arc::new(Scripted::new(vec![FileState::Active]));
        let s = summarizer(service.clone(), None);
        s.summarize(pdf()).await.unwrap();
        assert_eq!(service.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_state_skips_generation() {
        let service = Arc::new(Scripted::new(vec![FileState::Processing, FileState::Failed]));
        let s = summarizer(service.clone(), None);
        let err = s.summarize(pdf()).await.unwrap_err();
        assert!(matches!(err, SummarizeError::ProcessingFailed { .. }), "got: {err:?}");
        assert_eq!(service.generated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_name_skips_everything_else() {
        let mut scripted = Scripted::new(vec![FileState::Active]);
        scripted.upload_name = None;
        let service = Arc::new(scripted);
        let s = summarizer(service.clone(), None);
        let err = s.summarize(pdf()).await.unwrap_err();
        assert!(matches!(err, SummarizeError::IdentifierMissing));
        assert_eq!(service.checks.load(Ordering::SeqCst), 0);
        assert_eq!(service.generated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_poll_times_out() {
        let service = Arc::new(Scripted::new(vec![FileState::Processing]));
        let s = summarizer(service.clone(), Some(Duration::from_secs(5)));
        let err = s.summarize(pdf()).await.unwrap_err();
        match err {
            SummarizeError::Timeout { name, waited } => {
                assert_eq!(name, "files/abc");
                assert_eq!(waited, Duration::from_secs(4));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // t=0, t=2, t=4; a third sleep would overshoot the 5 s budget.
        assert_eq!(service.checks.load(Ordering::SeqCst), 3);
        assert_eq!(service.generated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn generated_text_is_returned_verbatim() {
        let replies = [
            "## Summary\n\n- a  \n- b\n",
            "```\nfn main() {}\n```",
            "A\n\n\n\n\nB",
            "   ",
        ];
        for text in replies {
            let mut scripted = Scripted::new(vec![FileState::Active]);
            scripted.text = text.into();
            let s = summarizer(Arc::new(scripted), None);
            assert_eq!(s.summarize(pdf()).await.unwrap(), text);
        }
    }
}
