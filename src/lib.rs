//! # logainm
//!
//! Build Irish place-name datasets from official placename orders, and
//! synthesise example sentences around those names.
//!
//! ## Two independent parts
//!
//! * **Extraction** reads the text layer of each placename-order PDF and
//!   recovers the English–Irish name pairs laid out as four-line records
//!   (`index`, English, Irish, `index`). The area each order covers comes
//!   from its file name.
//! * **Feature matrix** enumerates the 18,000 combinations of person, verb,
//!   preposition, case and tense used to steer sentence generation, and
//!   samples from them. Synthesis pairs each placename with a sampled row
//!   and asks an LLM for sentences.
//!
//! ## Pipeline Overview
//!
//! ```text
//! placename orders (PDF)
//!  │
//!  ├─ 1. Input     list the directory, check %PDF magic
//!  ├─ 2. Text      page text layer via pdfium (spawn_blocking)
//!  ├─ 3. Scan      4-line window, clean, split variants, dedup
//!  └─ 4. Output    Ceantar,Logainm CSV
//!
//! placenames CSV + feature matrix
//!  │
//!  ├─ 5. Plan      one feature row per placename
//!  ├─ 6. LLM       batched, concurrent chat calls with retry
//!  ├─ 7. Polish    split replies into clean sentences
//!  └─ 8. Output    sentences CSV + per-request stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logainm::{extract_directory, write_placenames_csv, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = extract_directory("./placenames", &config).await;
//!     for doc in &output.documents {
//!         eprintln!("{}: {} pairs", doc.area, doc.pairs.len());
//!     }
//!     write_placenames_csv("placenames.csv", &output).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `logainm` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! logainm = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod area;
pub mod config;
pub mod error;
pub mod extract;
pub mod features;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;
pub mod synthesis;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use area::{area_from_file_name, area_from_file_name_with_marker};
pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, SamplingPolicy, SynthesisConfig, SynthesisConfigBuilder,
};
pub use error::{DocumentError, GenerationError, LogainmError};
pub use extract::{extract_directory, extract_directory_sync, extract_document, extract_from_bytes, extract_pages};
pub use features::{FeatureCriteria, FeatureMatrix, FeatureRow, MatrixSummary, TOTAL_COMBINATIONS};
pub use output::{
    read_placenames_csv, write_placenames_csv, write_sentences_csv, DocumentResult, ExtractionOutput,
    ExtractionStats, NamePair, PlacenameRow, ScanStats, SentenceRecord, SynthesisOutput, SynthesisStats,
};
pub use pipeline::input::list_documents;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use stream::{synthesise_stream, RecordStream};
pub use synthesis::{synthesise, SentenceHistory};
