//! Configuration for the summarize proxy.
//!
//! Everything the endpoint needs, the service credential included, lives
//! in [`SummarizeConfig`] and is handed to the server at construction time.
//! Nothing is read from the process environment inside the library; the
//! binary maps env vars and flags onto the builder.

use crate::error::SummarizeError;
use crate::prompts::{DEFAULT_MODEL, SUMMARY_PROMPT};
use std::fmt;
use std::time::Duration;

/// Default Gemini API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the summarize proxy.
///
/// Built via [`SummarizeConfig::builder()`] or using
/// [`SummarizeConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfy::SummarizeConfig;
/// use std::time::Duration;
///
/// let config = SummarizeConfig::builder()
///     .api_key("AIza...")
///     .poll_interval(Duration::from_secs(1))
///     .max_poll_wait(Some(Duration::from_secs(120)))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummarizeConfig {
    /// Gemini API key. `None` makes every summarize request fail with
    /// [`SummarizeError::MissingApiKey`].
    pub api_key: Option<String>,

    /// Base URL of the Gemini API. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Model used for the summary. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Instruction sent alongside the file. Default: [`SUMMARY_PROMPT`].
    pub prompt: String,

    /// Delay between two file-state checks. Default: 2 s.
    pub poll_interval: Duration,

    /// Upper bound on the time spent waiting for the file to leave
    /// `PROCESSING`. `None` polls forever. Default: 300 s.
    pub max_poll_wait: Option<Duration>,

    /// Per-HTTP-call timeout for uploads and status checks. Default: 120.
    pub request_timeout_secs: u64,

    /// Timeout for the generation call, which reads the whole document and
    /// can take minutes on long PDFs. Default: 600.
    pub generate_timeout_secs: u64,

    /// Largest accepted request body on `/api/summarize`. Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: SUMMARY_PROMPT.to_string(),
            poll_interval: Duration::from_secs(2),
            max_poll_wait: Some(Duration::from_secs(300)),
            request_timeout_secs: 120,
            generate_timeout_secs: 600,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for SummarizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_wait", &self.max_poll_wait)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("generate_timeout_secs", &self.generate_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl SummarizeConfig {
    /// Create a new builder for `SummarizeConfig`.
    pub fn builder() -> SummarizeConfigBuilder {
        SummarizeConfigBuilder {
            config: Self::default(),
        }
    }

    /// The poll policy derived from this configuration.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_wait: self.max_poll_wait,
        }
    }
}

/// Builder for [`SummarizeConfig`].
#[derive(Debug)]
pub struct SummarizeConfigBuilder {
    config: SummarizeConfig,
}

impl SummarizeConfigBuilder {
    /// Set the API key. Empty strings count as "not configured".
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval.max(Duration::from_millis(100));
        self
    }

    pub fn max_poll_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.config.max_poll_wait = max_wait;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn generate_timeout_secs(mut self, secs: u64) -> Self {
        self.config.generate_timeout_secs = secs.max(1);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing API key is *not* a build error: the server still starts and
    /// answers every summarize request with a configuration error.
    pub fn build(self) -> Result<SummarizeConfig, SummarizeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(SummarizeError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(SummarizeError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(SummarizeError::InvalidConfig(
                "max upload size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

/// How often and how long to wait for an uploaded file to become ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two state checks.
    pub interval: Duration,
    /// Total wait budget; `None` means unbounded.
    pub max_wait: Option<Duration>,
}

impl PollPolicy {
    /// Whether another sleep of `interval` still fits in the budget after
    /// `waited` has already elapsed.
    pub fn allows_another_wait(&self, waited: Duration) -> bool {
        match self.max_wait {
            Some(max) => waited.checked_add(self.interval).is_some_and(|t| t <= max),
            None => true,
        }
    }
}
