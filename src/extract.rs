//! Placename extraction entry points.
//!
//! [`extract_directory`] is the primary API: it walks a directory of
//! placename orders and returns one [`DocumentResult`] per file. A document
//! that cannot be opened never aborts the run; it comes back with no pairs
//! and `error` set. [`extract_pages`] runs the same scan over page lines
//! that are already in memory, which is how the scanner is tested without
//! pdfium.

use crate::area::area_from_file_name_with_marker;
use crate::config::ExtractionConfig;
use crate::error::{DocumentError, LogainmError};
use crate::output::{DocumentResult, ExtractionOutput, ExtractionStats, NamePair, ScanStats};
use crate::pipeline::scan::PairCollector;
use crate::pipeline::text::PageLines;
use crate::pipeline::{input, text};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scan page line sequences with one dedup set and return the kept pairs
/// in order of first discovery.
pub fn extract_pages<L: AsRef<str>>(pages: &[Vec<L>]) -> Vec<NamePair> {
    scan_pages(pages).0
}

/// Like [`extract_pages`], also returning what happened to every record.
pub fn scan_pages<L: AsRef<str>>(pages: &[Vec<L>]) -> (Vec<NamePair>, ScanStats) {
    let mut collector = PairCollector::new();
    for lines in pages {
        collector.scan_page(lines);
    }
    collector.into_parts()
}

/// Extract the name pairs of one PDF.
///
/// The area is derived from the file name with `config.marker_token`.
/// Never fails: unreadable input yields an empty result with `error` set.
pub async fn extract_document(path: impl AsRef<Path>, config: &ExtractionConfig) -> DocumentResult {
    let start = Instant::now();
    let path = path.as_ref();
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let pages = match input::resolve_local(path) {
        Ok(resolved) => text::page_lines(resolved.path(), config.password.as_deref()).await,
        Err(e) => Err(e),
    };
    finish(file, pages, start, config)
}

/// Extract the name pairs of a PDF held in memory.
///
/// `file_name` is used for the area and for reporting; the bytes are
/// spilled to a temp file that is removed on return.
pub async fn extract_from_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &ExtractionConfig,
) -> DocumentResult {
    let start = Instant::now();
    let pages = match input::resolve_bytes(bytes) {
        // `resolved` keeps the temp file alive until extraction completes
        Ok(resolved) => text::page_lines(resolved.path(), config.password.as_deref()).await,
        Err(e) => Err(e),
    };
    finish(file_name.to_string(), pages, start, config)
}

fn finish(
    file: String,
    pages: Result<PageLines, LogainmError>,
    start: Instant,
    config: &ExtractionConfig,
) -> DocumentResult {
    let area = area_from_file_name_with_marker(&file, &config.marker_token);

    match pages {
        Ok(pages) => {
            let (pairs, scan) = scan_pages(&pages);
            debug!(
                "{}: {} records, {} kept, {} duplicates",
                file, scan.records, scan.kept, scan.duplicates
            );
            DocumentResult {
                file,
                area,
                pairs,
                pages: pages.len(),
                scan,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            warn!("Skipping {}: {}", file, e);
            let error = DocumentError::Unreadable {
                file: file.clone(),
                detail: e.to_string(),
            };
            DocumentResult::failed(file, area, error, start.elapsed().as_millis() as u64)
        }
    }
}

/// Extract every document in `dir`, in file-name order.
///
/// Each document gets its own dedup set. Two documents for the same area
/// keep separate results.
pub async fn extract_directory(dir: impl AsRef<Path>, config: &ExtractionConfig) -> ExtractionOutput {
    let total_start = Instant::now();
    let dir = dir.as_ref();
    info!("Starting extraction: {}", dir.display());

    let files = input::list_documents(dir);
    let total = files.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let mut documents = Vec::with_capacity(total);
    for (idx, file) in files.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(idx + 1, total, file);
        }

        let result = extract_document(dir.join(file), config).await;

        if let Some(ref cb) = config.progress_callback {
            match &result.error {
                None => cb.on_item_complete(idx + 1, total, result.pairs.len()),
                Some(e) => cb.on_item_error(idx + 1, total, &e.to_string()),
            }
        }
        documents.push(result);
    }

    let readable = documents.iter().filter(|d| d.error.is_none()).count();
    let stats = ExtractionStats {
        total_documents: total,
        readable_documents: readable,
        failed_documents: total - readable,
        total_pairs: documents.iter().map(|d| d.pairs.len()).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} pairs from {}/{} documents, {}ms",
        stats.total_pairs, readable, total, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, readable);
    }

    ExtractionOutput { documents, stats }
}

/// Synchronous wrapper around [`extract_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_directory_sync(
    dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, LogainmError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| LogainmError::Internal(format!("Failed to create tokio runtime: {}", e)))?;
    Ok(runtime.block_on(extract_directory(dir, config)))
}
