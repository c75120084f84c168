//! Eager sentence synthesis.
//!
//! Each placename gets one feature row and one request asking the model for
//! `sentences_per_request` sentences that use it. Requests run in batches of
//! `batch_size`, up to `concurrency` at a time, with `batch_delay_ms` of
//! quiet between batches to stay under provider rate limits.
//!
//! Use [`crate::stream::synthesise_stream`] instead to receive records as
//! they complete.

use crate::config::SynthesisConfig;
use crate::error::LogainmError;
use crate::features::{FeatureMatrix, FeatureRow};
use crate::output::{PlacenameRow, SentenceRecord, SynthesisOutput, SynthesisStats};
use crate::pipeline::{llm, postprocess};
use crate::prompts::{sentence_request, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use rand::seq::SliceRandom;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

/// Model used when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Sentences generated so far in a run, shared by every in-flight request
/// as a pool of few-shot examples.
#[derive(Debug, Default)]
pub struct SentenceHistory {
    sentences: Mutex<Vec<String>>,
}

impl SentenceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&self, sentences: &[String]) {
        let mut guard = self.sentences.lock().unwrap_or_else(|e| e.into_inner());
        guard.extend_from_slice(sentences);
    }

    /// Up to `k` distinct earlier sentences, chosen at random.
    pub fn sample(&self, k: usize) -> Vec<String> {
        let guard = self.sentences.lock().unwrap_or_else(|e| e.into_inner());
        guard.choose_multiple(&mut rand::thread_rng(), k).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sentences.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One planned request.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub request: usize,
    pub placename: String,
    pub area: Option<String>,
    pub features: FeatureRow,
}

/// Generate sentences for every placename.
///
/// # Errors
/// Returns `Err` only for fatal problems:
/// - no placenames, or a strict sampling policy that cannot be honoured
/// - no provider could be configured
/// - every request failed
pub async fn synthesise(
    placenames: &[PlacenameRow],
    matrix: &FeatureMatrix,
    config: &SynthesisConfig,
) -> Result<SynthesisOutput, LogainmError> {
    let total_start = Instant::now();
    let jobs = plan_requests(placenames, matrix, config)?;
    let total = jobs.len();
    info!("Starting synthesis: {} requests", total);

    let provider = resolve_provider(config).await?;
    let history = SentenceHistory::new();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let mut records = Vec::with_capacity(total);
    for (batch_idx, batch) in jobs.chunks(config.batch_size.max(1)).enumerate() {
        if batch_idx > 0 && config.batch_delay_ms > 0 {
            debug!("Batch {}: waiting {}ms", batch_idx + 1, config.batch_delay_ms);
            sleep(Duration::from_millis(config.batch_delay_ms)).await;
        }
        let done: Vec<SentenceRecord> = stream::iter(
            batch
                .iter()
                .map(|job| run_job(&provider, &history, job, total, config)),
        )
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;
        records.extend(done);
    }

    records.sort_by_key(|r| r.request);
    let stats = compute_stats(&records, total_start);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, stats.succeeded);
    }

    if stats.succeeded == 0 {
        let first_error = records
            .iter()
            .find_map(|r| r.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(LogainmError::AllRequestsFailed {
            total,
            retries: config.max_retries,
            first_error,
        });
    }

    info!(
        "Synthesis complete: {}/{} requests, {} sentences, {}ms",
        stats.succeeded, total, stats.total_sentences, stats.total_duration_ms
    );

    Ok(SynthesisOutput { records, stats })
}

/// Pair each placename with a feature row.
///
/// Rows are drawn without replacement while the run fits the matrix;
/// beyond that `config.sampling_policy` decides.
pub(crate) fn plan_requests(
    placenames: &[PlacenameRow],
    matrix: &FeatureMatrix,
    config: &SynthesisConfig,
) -> Result<Vec<Job>, LogainmError> {
    if placenames.is_empty() {
        return Err(LogainmError::InvalidArgument("no placenames to synthesise".into()));
    }
    let features = matrix.sample_under(
        &mut rand::thread_rng(),
        placenames.len(),
        true,
        config.sampling_policy,
    )?;

    Ok(placenames
        .iter()
        .zip(features)
        .enumerate()
        .map(|(idx, (row, features))| Job {
            request: idx + 1,
            placename: row.placename.clone(),
            area: Some(row.area.clone()).filter(|a| !a.is_empty()),
            features,
        })
        .collect())
}

/// Run one request and record its sentences in the shared history.
pub(crate) async fn run_job(
    provider: &Arc<dyn LLMProvider>,
    history: &SentenceHistory,
    job: &Job,
    total: usize,
    config: &SynthesisConfig,
) -> SentenceRecord {
    if let Some(ref cb) = config.progress_callback {
        cb.on_item_start(job.request, total, &job.placename);
    }

    let examples = history.sample(config.history_examples);
    let system_prompt = config.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let user_prompt = sentence_request(
        &job.placename,
        &job.features,
        config.sentences_per_request,
        &examples,
    );

    let generated = llm::generate(provider, job.request, system_prompt, &user_prompt, config).await;
    let sentences = match generated.error {
        None => postprocess::split_sentences(&generated.content),
        Some(_) => Vec::new(),
    };
    history.extend(&sentences);

    if let Some(ref cb) = config.progress_callback {
        match &generated.error {
            None => cb.on_item_complete(job.request, total, sentences.len()),
            Some(e) => cb.on_item_error(job.request, total, &e.to_string()),
        }
    }

    SentenceRecord {
        request: job.request,
        placename: job.placename.clone(),
        area: job.area.clone(),
        features: job.features,
        sentences,
        input_tokens: generated.input_tokens,
        output_tokens: generated.output_tokens,
        duration_ms: generated.duration_ms,
        retries: generated.retries,
        error: generated.error,
    }
}

fn compute_stats(records: &[SentenceRecord], start: Instant) -> SynthesisStats {
    let succeeded = records.iter().filter(|r| r.error.is_none()).count();
    SynthesisStats {
        total_requests: records.len(),
        succeeded,
        failed: records.len() - succeeded,
        total_sentences: records.iter().map(|r| r.sentences.len()).sum(),
        total_input_tokens: records.iter().map(|r| r.input_tokens as u64).sum(),
        total_output_tokens: records.iter().map(|r| r.output_tokens as u64).sum(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, LogainmError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        LogainmError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_MODEL`]; the factory reads the matching API key from the
///    environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    when both are set. An `OPENAI_API_KEY` alone selects OpenAI.
/// 4. **Full auto-detection** (`ProviderFactory::from_env`).
pub(crate) async fn resolve_provider(
    config: &SynthesisConfig,
) -> Result<Arc<dyn LLMProvider>, LogainmError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| LogainmError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
