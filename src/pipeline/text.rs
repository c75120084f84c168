//! Text-layer extraction: turn each PDF page into its sequence of lines.
//!
//! ## Threading
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and does CPU-bound work. Extraction therefore runs on Tokio's
//! blocking pool so the async workers never stall on a large order.
//!
//! ## Binding
//!
//! The pdfium shared library is located in this order:
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one
//! 2. the current directory
//! 3. the system library search path

use crate::error::LogainmError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-page line sequences, in page order.
pub type PageLines = Vec<Vec<String>>;

/// Extract the text of every page as lines.
pub async fn page_lines(pdf_path: &Path, password: Option<&str>) -> Result<PageLines, LogainmError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || page_lines_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| LogainmError::Internal(format!("Text extraction task panicked: {}", e)))?
}

/// Split a page's text into lines, accepting `\n` and `\r\n` endings.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn bind_pdfium() -> Result<Pdfium, LogainmError> {
    let from_env = std::env::var("PDFIUM_LIB_PATH").ok().map(PathBuf::from).map(|p| {
        if p.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&p)
        } else {
            p
        }
    });
    let local = Pdfium::pdfium_platform_library_name_at_path("./");

    let bindings = from_env
        .into_iter()
        .chain(std::iter::once(local))
        .find_map(|lib| match Pdfium::bind_to_library(&lib) {
            Ok(b) => {
                debug!("Bound pdfium from {}", lib.display());
                Some(b)
            }
            Err(_) => None,
        })
        .map(Ok)
        .unwrap_or_else(Pdfium::bind_to_system_library)
        .map_err(|e| LogainmError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn page_lines_blocking(pdf_path: &Path, password: Option<&str>) -> Result<PageLines, LogainmError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                LogainmError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                LogainmError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            LogainmError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut out = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| LogainmError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        let lines = split_lines(&text);
        debug!("Page {} → {} lines", idx + 1, lines.len());
        out.push(lines);
    }

    Ok(out)
}
