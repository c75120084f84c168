//! Configuration types for extraction and sentence synthesis.
//!
//! Extraction and synthesis are configured separately: extraction only needs
//! to know how to read documents and name their areas, synthesis carries the
//! LLM provider, retry and batching knobs. Both are built through a builder
//! that validates constraints in `build()`.

use crate::area::DEFAULT_MARKER;
use crate::error::LogainmError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What [`crate::features::FeatureMatrix::sample`] does when asked for more
/// distinct rows than the matrix holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingPolicy {
    /// Silently switch to sampling with replacement. (default)
    #[default]
    FallbackWithReplacement,
    /// Reject the request with [`LogainmError::InvalidArgument`].
    Strict,
}

// ── Extraction ───────────────────────────────────────────────────────────

/// Configuration for placename extraction.
///
/// # Example
/// ```rust
/// use logainm::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .marker_token("logainmneacha")
///     .build()
///     .unwrap();
/// assert_eq!(config.marker_token, "logainmneacha");
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// File-name token preceding the area words. Default: `"logainmneacha"`.
    pub marker_token: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            marker_token: DEFAULT_MARKER.to_string(),
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("marker_token", &self.marker_token)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn marker_token(mut self, token: impl Into<String>) -> Self {
        self.config.marker_token = token.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, LogainmError> {
        let token = self.config.marker_token.trim();
        if token.is_empty() {
            return Err(LogainmError::InvalidConfig(
                "marker token must not be empty".into(),
            ));
        }
        if token.contains('-') {
            return Err(LogainmError::InvalidConfig(format!(
                "marker token '{token}' must be a single '-'-separated token"
            )));
        }
        Ok(self.config)
    }
}

// ── Synthesis ────────────────────────────────────────────────────────────

/// Configuration for LLM sentence synthesis.
///
/// # Example
/// ```rust
/// use logainm::SynthesisConfig;
///
/// let config = SynthesisConfig::builder()
///     .model("gpt-4.1-mini")
///     .concurrency(4)
///     .sentences_per_request(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SynthesisConfig {
    /// LLM model identifier. Default: `"gpt-4.1-mini"`.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.9.
    ///
    /// Synthetic training data wants variety, so this sits well above the
    /// near-zero values used for transcription.
    pub temperature: f32,

    /// Maximum tokens generated per request. Default: 512.
    pub max_tokens: usize,

    /// Retry attempts on a failed request. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Requests in flight at once within a batch. Default: 4.
    pub concurrency: usize,

    /// Requests per batch. Default: 10.
    pub batch_size: usize,

    /// Fixed pause between batches in milliseconds. Default: 1000.
    pub batch_delay_ms: u64,

    /// Sentences asked for in each request. Default: 5.
    pub sentences_per_request: usize,

    /// Earlier sentences shown to the model as style examples. Default: 3.
    pub history_examples: usize,

    /// Per-request timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Oversized no-replacement sampling policy. Default: fallback.
    pub sampling_policy: SamplingPolicy,

    /// Per-request progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.9,
            max_tokens: 512,
            max_retries: 3,
            retry_backoff_ms: 500,
            concurrency: 4,
            batch_size: 10,
            batch_delay_ms: 1000,
            sentences_per_request: 5,
            history_examples: 3,
            api_timeout_secs: 60,
            system_prompt: None,
            sampling_policy: SamplingPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("concurrency", &self.concurrency)
            .field("batch_size", &self.batch_size)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .field("sentences_per_request", &self.sentences_per_request)
            .field("history_examples", &self.history_examples)
            .field("sampling_policy", &self.sampling_policy)
            .finish()
    }
}

impl SynthesisConfig {
    pub fn builder() -> SynthesisConfigBuilder {
        SynthesisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SynthesisConfig`].
pub struct SynthesisConfigBuilder {
    config: SynthesisConfig,
}

impl SynthesisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn batch_delay_ms(mut self, ms: u64) -> Self {
        self.config.batch_delay_ms = ms;
        self
    }

    pub fn sentences_per_request(mut self, n: usize) -> Self {
        self.config.sentences_per_request = n;
        self
    }

    pub fn history_examples(mut self, n: usize) -> Self {
        self.config.history_examples = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn sampling_policy(mut self, policy: SamplingPolicy) -> Self {
        self.config.sampling_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SynthesisConfig, LogainmError> {
        let c = &self.config;
        if c.sentences_per_request == 0 {
            return Err(LogainmError::InvalidConfig(
                "sentences per request must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(LogainmError::InvalidConfig("max tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(LogainmError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
