//! Pipeline stages for placename extraction and sentence synthesis.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! extraction:  input ──▶ text ──▶ scan
//!              (dir/path) (pdfium) (4-line window)
//!
//! synthesis:   prompts ──▶ llm ──▶ postprocess
//!                          (chat)   (sentence cleanup)
//! ```
//!
//! 1. [`input`]: list a directory and validate each file before pdfium sees it
//! 2. [`text`]: pull each page's text layer as lines; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`scan`]: slide the record window over each page and keep clean,
//!    deduplicated name pairs
//! 4. [`llm`]: drive one chat call with timeout and retry/backoff; the
//!    only stage with network I/O
//! 5. [`postprocess`]: split model output into clean sentences

pub mod input;
pub mod llm;
pub mod postprocess;
pub mod scan;
pub mod text;
