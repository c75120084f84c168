//! Input resolution: find the source documents and validate each one before
//! pdfium sees it.
//!
//! pdfium requires a file-system path, so in-memory input is spilled to a
//! temp file that lives as long as the [`ResolvedInput`]. The `%PDF` magic
//! bytes are checked up front so a stray `.txt` or `.docx` in the placenames
//! directory fails with a meaningful error instead of a pdfium crash.

use crate::error::LogainmError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A PDF ready for text extraction.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a byte buffer spilled to a temp file.
    /// The `NamedTempFile` is kept alive until extraction completes.
    Buffered { path: PathBuf, _file: NamedTempFile },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Buffered { path, .. } => path,
        }
    }
}

/// File names of the regular files directly inside `dir`, sorted.
///
/// Never fails: a missing directory, a permission problem or any other
/// listing error is logged and yields an empty list.
pub fn list_documents(dir: impl AsRef<Path>) -> Vec<String> {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("The directory {} does not exist", dir.display());
            return Vec::new();
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            warn!("Permission denied to access {}", dir.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    debug!("Found {} files in {}", names.len(), dir.display());
    names
}

/// Validate a local file: it exists, is readable and starts with `%PDF`.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<ResolvedInput, LogainmError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(LogainmError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
                return Err(LogainmError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(LogainmError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(LogainmError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Spill PDF bytes to a managed temp file.
pub fn resolve_bytes(bytes: &[u8]) -> Result<ResolvedInput, LogainmError> {
    let mut file = NamedTempFile::new().map_err(|e| LogainmError::Internal(format!("tempfile: {e}")))?;
    let path = file.path().to_path_buf();

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(LogainmError::NotAPdf { path, magic });
    }

    file.write_all(bytes)
        .map_err(|e| LogainmError::Internal(format!("tempfile write: {e}")))?;
    Ok(ResolvedInput::Buffered { path, _file: file })
}
