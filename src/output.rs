//! Result types and the CSV boundary.
//!
//! Extraction produces one [`DocumentResult`] per source file, gathered into
//! an [`ExtractionOutput`]. Synthesis produces one [`SentenceRecord`] per
//! request, gathered into a [`SynthesisOutput`]. The CSV helpers at the end
//! of the module render these for the downstream dataset files; the English
//! name is dropped only here, at the file boundary.

use crate::error::{DocumentError, GenerationError, LogainmError};
use crate::features::FeatureRow;
use crate::pipeline::scan::RecordOutcome;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

// ── Extraction ───────────────────────────────────────────────────────────

/// An English–Irish place-name correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamePair {
    pub english: String,
    pub irish: String,
}

impl NamePair {
    pub fn new(english: impl Into<String>, irish: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            irish: irish.into(),
        }
    }
}

/// Per-document tally of what happened to the matched records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Windows that matched the marker/name/name/marker shape.
    pub records: usize,
    pub kept: usize,
    pub duplicates: usize,
    pub seen_not_kept: usize,
    pub cross_bracket: usize,
    pub invalid: usize,
}

impl ScanStats {
    pub(crate) fn record(&mut self, outcome: RecordOutcome) {
        self.records += 1;
        match outcome {
            RecordOutcome::Kept => self.kept += 1,
            RecordOutcome::Duplicate => self.duplicates += 1,
            RecordOutcome::SeenNotKept => self.seen_not_kept += 1,
            RecordOutcome::CrossBracket => self.cross_bracket += 1,
            RecordOutcome::Invalid => self.invalid += 1,
        }
    }
}

/// Extraction result for one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// File name (no directory).
    pub file: String,
    /// Area derived from the file name; `"err"` when it cannot be derived.
    pub area: String,
    /// Kept pairs in order of first discovery.
    pub pairs: Vec<NamePair>,
    /// Pages whose text was scanned.
    pub pages: usize,
    pub scan: ScanStats,
    pub duration_ms: u64,
    /// Set when the document could not be opened or read.
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub(crate) fn failed(file: String, area: String, error: DocumentError, duration_ms: u64) -> Self {
        Self {
            file,
            area,
            pairs: Vec::new(),
            pages: 0,
            scan: ScanStats::default(),
            duration_ms,
            error: Some(error),
        }
    }
}

/// Aggregate numbers for an extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_documents: usize,
    pub readable_documents: usize,
    pub failed_documents: usize,
    pub total_pairs: usize,
    pub total_duration_ms: u64,
}

/// Everything an extraction run produced, in directory order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub documents: Vec<DocumentResult>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// `(area, irish)` rows for the placenames dataset, in document order.
    pub fn placename_rows(&self) -> Vec<PlacenameRow> {
        self.documents
            .iter()
            .flat_map(|doc| {
                doc.pairs.iter().map(move |p| PlacenameRow {
                    area: doc.area.clone(),
                    placename: p.irish.clone(),
                })
            })
            .collect()
    }
}

/// One row of the placenames dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacenameRow {
    /// `Ceantar` column.
    pub area: String,
    /// `Logainm` column: the Irish name.
    pub placename: String,
}

// ── Synthesis ────────────────────────────────────────────────────────────

/// Result of one synthesis request.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceRecord {
    /// 1-indexed request number.
    pub request: usize,
    pub placename: String,
    pub area: Option<String>,
    pub features: FeatureRow,
    /// Cleaned sentences, one per element.
    pub sentences: Vec<String>,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u8,
    pub error: Option<GenerationError>,
}

/// Aggregate numbers for a synthesis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisStats {
    pub total_requests: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_sentences: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
}

/// Everything a synthesis run produced, ordered by request number.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisOutput {
    pub records: Vec<SentenceRecord>,
    pub stats: SynthesisStats,
}

// ── CSV ──────────────────────────────────────────────────────────────────

/// Header of the placenames dataset.
pub const PLACENAMES_HEADER: [&str; 2] = ["Ceantar", "Logainm"];

/// Header of the sentences dataset.
pub const SENTENCES_HEADER: [&str; 7] = [
    "Logainm",
    "person",
    "verb",
    "preposition",
    "case",
    "tense",
    "abairt",
];

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_line(fields: &[&str]) -> String {
    let mut line = fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

/// Render the placenames dataset: `Ceantar,Logainm`, one row per kept pair.
pub fn placenames_csv(output: &ExtractionOutput) -> String {
    let mut csv = csv_line(&PLACENAMES_HEADER);
    for row in output.placename_rows() {
        csv.push_str(&csv_line(&[row.area.as_str(), row.placename.as_str()]));
    }
    csv
}

/// Render the sentences dataset, one row per generated sentence.
pub fn sentences_csv(output: &SynthesisOutput) -> String {
    let mut csv = csv_line(&SENTENCES_HEADER);
    for record in output.records.iter().filter(|r| r.error.is_none()) {
        let f = &record.features;
        for sentence in &record.sentences {
            csv.push_str(&csv_line(&[
                record.placename.as_str(),
                f.person,
                f.verb,
                f.preposition,
                f.case,
                f.tense,
                sentence.as_str(),
            ]));
        }
    }
    csv
}

/// Split CSV text into records, honouring `"` quoting. A quoted field may
/// span lines. Each record carries the line number it starts on; blank
/// lines are skipped.
fn csv_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, LogainmError> {
    fn push_record(records: &mut Vec<(usize, Vec<String>)>, start: usize, fields: Vec<String>) {
        let blank = fields.len() == 1 && fields[0].trim().is_empty();
        if !blank {
            records.push((start, fields));
        }
    }

    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut quoted = false;
    let mut line = 1;
    let mut start = 1;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (true, c) => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
            (false, '"') if field.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, '\r') if chars.peek() == Some(&'\n') => {}
            (false, '\n') => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, start, std::mem::take(&mut fields));
                line += 1;
                start = line;
            }
            (false, c) => field.push(c),
        }
    }
    if quoted {
        return Err(LogainmError::MalformedCsv {
            line: start,
            detail: "unterminated quoted field".into(),
        });
    }
    fields.push(field);
    push_record(&mut records, start, fields);
    Ok(records)
}

/// Parse a placenames dataset.
///
/// Columns are located by header name, so extra columns (such as a leading
/// unnamed index column) are tolerated. Blank lines are skipped, and quoted
/// fields may contain line breaks.
pub fn parse_placenames_csv(text: &str) -> Result<Vec<PlacenameRow>, LogainmError> {
    let mut records = csv_records(text)?.into_iter();

    let Some((header_no, header)) = records.next() else {
        return Ok(Vec::new());
    };
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LogainmError::MalformedCsv {
                line: header_no,
                detail: format!("missing '{name}' column"),
            })
    };
    let area_col = column(PLACENAMES_HEADER[0])?;
    let name_col = column(PLACENAMES_HEADER[1])?;

    let mut rows = Vec::new();
    for (line_no, fields) in records {
        let field = |col: usize| {
            fields.get(col).cloned().ok_or_else(|| LogainmError::MalformedCsv {
                line: line_no,
                detail: format!("expected at least {} fields, found {}", col + 1, fields.len()),
            })
        };
        rows.push(PlacenameRow {
            area: field(area_col)?,
            placename: field(name_col)?,
        });
    }
    debug!("Parsed {} placename rows", rows.len());
    Ok(rows)
}

/// Read and parse a placenames dataset from disk.
pub async fn read_placenames_csv(path: impl AsRef<Path>) -> Result<Vec<PlacenameRow>, LogainmError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LogainmError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    parse_placenames_csv(&text)
}

/// Write `contents` to `path` atomically (temp file + rename).
pub async fn write_atomic(path: impl AsRef<Path>, contents: &str) -> Result<(), LogainmError> {
    let path = path.as_ref();
    let write_err = |e| LogainmError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Write the placenames dataset; returns the number of data rows.
pub async fn write_placenames_csv(
    path: impl AsRef<Path>,
    output: &ExtractionOutput,
) -> Result<usize, LogainmError> {
    write_atomic(path, &placenames_csv(output)).await?;
    Ok(output.stats.total_pairs)
}

/// Write the sentences dataset; returns the number of data rows.
pub async fn write_sentences_csv(
    path: impl AsRef<Path>,
    output: &SynthesisOutput,
) -> Result<usize, LogainmError> {
    write_atomic(path, &sentences_csv(output)).await?;
    Ok(output.stats.total_sentences)
}
