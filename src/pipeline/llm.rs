//! LLM interaction: send one sentence-generation request to the provider.
//!
//! Prompt text is built in [`crate::prompts`]; this module only owns the
//! call itself, its per-attempt timeout and the retry loop.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors are frequent when several requests run at once.
//! Backoff is exponential (`retry_backoff_ms * 2^attempt`): with a 500 ms
//! base and 3 retries the waits are 500 ms, 1 s and 2 s.

use crate::config::SynthesisConfig;
use crate::error::GenerationError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Raw outcome of one request, before the reply is split into sentences.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u8,
    pub error: Option<GenerationError>,
}

enum Failure {
    Provider(String),
    TimedOut,
}

/// Run one chat completion with retries.
///
/// Never returns an error: a request that exhausts its retries comes back
/// with `error` set and empty `content`, so one failure does not abort the
/// run.
pub async fn generate(
    provider: &Arc<dyn LLMProvider>,
    request: usize,
    system_prompt: &str,
    user_prompt: &str,
    config: &SynthesisConfig,
) -> Generated {
    let start = Instant::now();
    let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)];
    let options = build_options(config);
    let limit = Duration::from_secs(config.api_timeout_secs);

    let mut last: Option<Failure> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Request {}: retry {}/{} after {}ms",
                request, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(limit, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                debug!(
                    "Request {}: {} input tokens, {} output tokens, {:?}",
                    request, response.prompt_tokens, response.completion_tokens, duration
                );
                return Generated {
                    content: response.content,
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt as u8,
                    error: None,
                };
            }
            Ok(Err(e)) => {
                let msg = e.to_string();
                warn!("Request {}: attempt {} failed: {}", request, attempt + 1, msg);
                last = Some(Failure::Provider(msg));
            }
            Err(_) => {
                warn!(
                    "Request {}: attempt {} timed out after {}s",
                    request,
                    attempt + 1,
                    config.api_timeout_secs
                );
                last = Some(Failure::TimedOut);
            }
        }
    }

    let retries = config.max_retries.min(u8::MAX as u32) as u8;
    let error = match last {
        Some(Failure::TimedOut) => GenerationError::Timeout {
            request,
            secs: config.api_timeout_secs,
        },
        Some(Failure::Provider(detail)) => GenerationError::LlmFailed { request, retries, detail },
        None => GenerationError::LlmFailed {
            request,
            retries,
            detail: "Unknown error".to_string(),
        },
    };

    Generated {
        duration_ms: start.elapsed().as_millis() as u64,
        retries,
        error: Some(error),
        ..Default::default()
    }
}

/// Build `CompletionOptions` from the synthesis config.
fn build_options(config: &SynthesisConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
