//! Streaming synthesis API: emit records as requests complete.
//!
//! Unlike the eager [`crate::synthesis::synthesise`], which returns only
//! after every request finishes, [`synthesise_stream`] yields each
//! [`SentenceRecord`] as soon as its request completes, so callers can
//! append rows to disk or drive a progress bar. Within a batch, records
//! arrive in completion order; sort by `request` if order matters.
//! Per-request failures arrive as records with `error` set.
//! `on_run_complete` fires once the last record has been yielded.

use crate::config::SynthesisConfig;
use crate::error::LogainmError;
use crate::features::FeatureMatrix;
use crate::output::{PlacenameRow, SentenceRecord};
use crate::synthesis::{plan_requests, resolve_provider, run_job, Job, SentenceHistory};
use edgequake_llm::LLMProvider;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of synthesis records.
pub type RecordStream = Pin<Box<dyn Stream<Item = SentenceRecord> + Send>>;

struct Shared {
    provider: Arc<dyn LLMProvider>,
    history: SentenceHistory,
    config: SynthesisConfig,
    total: usize,
    completed: AtomicUsize,
    succeeded: AtomicUsize,
}

impl Shared {
    /// Count one finished record; the last one closes the run.
    fn record_done(&self, record: &SentenceRecord) {
        if record.error.is_none() {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if done == self.total {
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_run_complete(self.total, self.succeeded.load(Ordering::SeqCst));
            }
        }
    }
}

/// Generate sentences for every placename, streaming records as they are
/// ready.
///
/// # Returns
/// - `Ok(RecordStream)`: one record per placename
/// - `Err(LogainmError)`: fatal error (no placenames, provider not
///   configured, strict sampling impossible)
pub async fn synthesise_stream(
    placenames: &[PlacenameRow],
    matrix: &FeatureMatrix,
    config: &SynthesisConfig,
) -> Result<RecordStream, LogainmError> {
    let jobs = plan_requests(placenames, matrix, config)?;
    let total = jobs.len();
    info!("Starting streaming synthesis: {} requests", total);

    let provider = resolve_provider(config).await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let shared = Arc::new(Shared {
        provider,
        history: SentenceHistory::new(),
        config: config.clone(),
        total,
        completed: AtomicUsize::new(0),
        succeeded: AtomicUsize::new(0),
    });
    let tally = Arc::clone(&shared);
    let batches: Vec<Vec<Job>> = jobs
        .chunks(config.batch_size.max(1))
        .map(<[Job]>::to_vec)
        .collect();

    let s = stream::iter(batches.into_iter().enumerate()).flat_map(move |(batch_idx, batch)| {
        let shared = Arc::clone(&shared);
        let delay = if batch_idx > 0 { shared.config.batch_delay_ms } else { 0 };
        let concurrency = shared.config.concurrency.max(1);

        stream::once(sleep(Duration::from_millis(delay))).flat_map(move |()| {
            let shared = Arc::clone(&shared);
            stream::iter(batch.clone().into_iter().map(move |job| {
                let shared = Arc::clone(&shared);
                async move {
                    run_job(&shared.provider, &shared.history, &job, shared.total, &shared.config).await
                }
            }))
            .buffer_unordered(concurrency)
        })
    })
    .inspect(move |record| tally.record_done(record));

    Ok(Box::pin(s))
}
