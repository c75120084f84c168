//! Error types for the logainm library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`LogainmError`] (**fatal**): the operation cannot proceed at all
//!   (bad configuration, provider not configured, output not writable).
//!   Returned as `Err(LogainmError)` from public entry points.
//!
//! * [`DocumentError`] (**non-fatal**): one source document could not be
//!   opened or read. Stored inside [`crate::output::DocumentResult`]; the
//!   document contributes no pairs and the remaining documents carry on.
//!
//! * [`GenerationError`] (**non-fatal**): one synthesis request failed after
//!   its retries. Stored inside [`crate::output::SentenceRecord`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the logainm library.
#[derive(Debug, Error)]
pub enum LogainmError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A CSV or prompt file could not be read.
    #[error("Failed to read '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A placenames CSV row could not be parsed.
    #[error("Malformed CSV at line {line}: {detail}")]
    MalformedCsv { line: usize, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not produce the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Sampling errors ───────────────────────────────────────────────────
    /// A sampling request cannot be satisfied under the configured policy.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Every synthesis request failed; output would be empty.
    #[error("All {total} requests failed after {retries} retries each.\nFirst error: {first_error}")]
    AllRequestsFailed {
        total: usize,
        retries: u32,
        first_error: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single source document.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The document could not be opened or its text could not be read.
    #[error("{file}: unreadable: {detail}")]
    Unreadable { file: String, detail: String },
}

/// A non-fatal error for a single synthesis request.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GenerationError {
    /// LLM call failed after retries.
    #[error("Request {request}: LLM call failed after {retries} retries: {detail}")]
    LlmFailed {
        request: usize,
        retries: u8,
        detail: String,
    },

    /// LLM call timed out.
    #[error("Request {request}: LLM call timed out after {secs}s")]
    Timeout { request: usize, secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display() {
        let e = LogainmError::InvalidArgument("n=20000 exceeds 18000 rows".into());
        assert!(e.to_string().contains("20000"), "got: {e}");
    }

    #[test]
    fn all_requests_failed_display() {
        let e = LogainmError::AllRequestsFailed {
            total: 4,
            retries: 3,
            first_error: "rate limited".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 4 requests"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn document_error_names_file() {
        let e = DocumentError::Unreadable {
            file: "an-tordu-logainmneacha-contae-laoise-2018.pdf".into(),
            detail: "corrupt xref".into(),
        };
        assert!(e.to_string().starts_with("an-tordu-logainmneacha-contae-laoise-2018.pdf"));
        assert!(e.to_string().contains("corrupt xref"));
    }

    #[test]
    fn generation_timeout_display() {
        let e = GenerationError::Timeout {
            request: 7,
            secs: 60,
        };
        assert!(e.to_string().contains("Request 7"));
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn malformed_csv_display() {
        let e = LogainmError::MalformedCsv {
            line: 3,
            detail: "unterminated quote".into(),
        };
        assert!(e.to_string().contains("line 3"));
    }
}
