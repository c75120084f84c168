//! Progress-callback trait for per-item run events.
//!
//! Both long-running operations report through the same trait: directory
//! extraction emits one item per document, synthesis one item per request.
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] or
//! [`crate::config::SynthesisConfigBuilder::progress_callback`].
//!
//! # Example
//!
//! ```rust
//! use logainm::{ExtractionConfig, RunProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PairCounter {
//!     pairs: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for PairCounter {
//!     fn on_item_complete(&self, _index: usize, _total: usize, produced: usize) {
//!         self.pairs.fetch_add(produced, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PairCounter { pairs: AtomicUsize::new(0) });
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called as a run processes each item.
///
/// Implementations must be `Send + Sync`: synthesis requests complete
/// concurrently. All methods default to no-ops.
pub trait RunProgressCallback: Send + Sync {
    /// Called once before the first item.
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an item is processed.
    ///
    /// # Arguments
    /// * `index`: 1-indexed item number
    /// * `total`: items in the run
    /// * `label`: document file name or placename
    fn on_item_start(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when an item succeeds.
    ///
    /// `produced` is the number of pairs extracted or sentences generated.
    fn on_item_complete(&self, index: usize, total: usize, produced: usize) {
        let _ = (index, total, produced);
    }

    /// Called when an item fails; the run continues.
    fn on_item_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every item has been attempted.
    fn on_run_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the config structs.
pub type ProgressCallback = Arc<dyn RunProgressCallback>;
