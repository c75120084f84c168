//! Record scanner: recover `(index, English, Irish, index)` quadruples from
//! the raw text lines of a placename-order page.
//!
//! ## Page layout
//!
//! The text layer of a placename order comes out of the PDF as one cell per
//! line, in reading order:
//!
//! ```text
//! 1.
//! Addergoole
//! Eadargúil
//! 2.
//! Attyshonock
//! Áit Tí Seonac
//! 3.
//! ```
//!
//! Headers, footers, parish notes and OCR debris sit between the records.
//! A record is any window of four lines shaped *marker, name, name, marker*.
//! The closing marker of one record is the opening marker of the next, so a
//! matched window advances the cursor by three lines, not four.
//!
//! ## Two-stage filtering
//!
//! [`PageScanner`] only classifies windows (stage one). [`PairCollector`]
//! turns each matched [`LineRecord`] into zero or one [`NamePair`] (stage
//! two): bracket cleaning, the cross-bracket guard, the `or`/`nó` variant
//! split and deduplication all happen there. One collector lives for exactly
//! one document.

use crate::output::{NamePair, ScanStats};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_INDEX_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?\s*$").unwrap());
static RE_TRIPLE_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{3}").unwrap());
static RE_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());
static RE_SQUARE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static RE_ROUND_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Separator between English name variants ("Goat's Island or Oileán").
const EN_VARIANT_SEPARATOR: &str = " or ";
/// Separator between Irish name variants.
const GA_VARIANT_SEPARATOR: &str = " nó ";

/// True when the line is a record delimiter: digits, an optional period,
/// optional trailing whitespace and nothing else.
pub fn is_index_marker(line: &str) -> bool {
    RE_INDEX_MARKER.is_match(line)
}

/// Heuristic filter for a candidate place name.
///
/// Rejects the empty string, anything containing a digit, and anything with
/// three consecutive ASCII capitals (section headers, acronyms such as
/// `ED` prefixes run together with column titles).
pub fn is_valid_name(s: &str) -> bool {
    !s.is_empty() && !RE_TRIPLE_UPPER.is_match(s) && !RE_DIGIT.is_match(s)
}

/// Remove every `[...]` and `(...)` annotation (non-greedy), then trim.
///
/// `"Adamstown [ED:Garristown]"` → `"Adamstown"`.
pub fn clean_name(s: &str) -> String {
    let s = RE_SQUARE_BRACKETS.replace_all(s, "");
    let s = RE_ROUND_BRACKETS.replace_all(&s, "");
    s.trim().to_string()
}

/// Keep only the first alternative of each name and clean it again.
///
/// The English name splits on `" or "`, the Irish name on `" nó "`; a name
/// without its separator passes through unchanged apart from the re-clean.
pub fn first_variant(english: &str, irish: &str) -> (String, String) {
    let en = english.split(EN_VARIANT_SEPARATOR).next().unwrap_or(english);
    let ga = irish.split(GA_VARIANT_SEPARATOR).next().unwrap_or(irish);
    (clean_name(en), clean_name(ga))
}

fn has_bracket(s: &str) -> bool {
    s.contains(['[', ']', '(', ')'])
}

/// Four consecutive lines classified as one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    /// Line index (within the page) of the opening marker.
    pub start: usize,
    pub index_a: &'a str,
    pub english: &'a str,
    pub irish: &'a str,
    pub index_b: &'a str,
}

/// Lazy sliding-window scan over the lines of one page.
///
/// The cursor visits every `i` with `i + 3 <= len`; the closing marker is
/// read with a bounds-checked lookup, so a candidate whose closing marker
/// would sit past the last line simply does not match.
pub struct PageScanner<'a, L> {
    lines: &'a [L],
    cursor: usize,
}

impl<'a, L: AsRef<str>> PageScanner<'a, L> {
    pub fn new(lines: &'a [L]) -> Self {
        Self { lines, cursor: 0 }
    }

    fn classify(&self, i: usize) -> Option<LineRecord<'a>> {
        let lines = self.lines;
        let line = |k: usize| -> Option<&'a str> { lines.get(k).map(|l| l.as_ref()) };

        let index_a = line(i).filter(|l| is_index_marker(l))?;
        let english = line(i + 1).filter(|l| is_valid_name(l))?;
        let irish = line(i + 2).filter(|l| is_valid_name(l))?;
        let index_b = line(i + 3).filter(|l| is_index_marker(l))?;

        Some(LineRecord {
            start: i,
            index_a,
            english,
            irish,
            index_b,
        })
    }
}

impl<'a, L: AsRef<str>> Iterator for PageScanner<'a, L> {
    type Item = LineRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor + 3 <= self.lines.len() {
            let i = self.cursor;
            match self.classify(i) {
                Some(record) => {
                    self.cursor = i + 3;
                    return Some(record);
                }
                None => self.cursor = i + 1,
            }
        }
        None
    }
}

/// What happened to one matched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Appended to the output.
    Kept,
    /// Unmatched `[` in the English column and `]` in the Irish column: an
    /// annotation spilling across both cells.
    CrossBracket,
    /// A name failed the valid-name filter after cleaning.
    Invalid,
    /// The exact pair was already seen in this document.
    Duplicate,
    /// Recorded as seen, but left out of the output because a bracket
    /// character survived cleaning. A later bracket-free duplicate is still
    /// suppressed.
    SeenNotKept,
}

/// Turns matched records into deduplicated pairs for one document.
#[derive(Debug, Default)]
pub struct PairCollector {
    seen: HashSet<NamePair>,
    pairs: Vec<NamePair>,
    stats: ScanStats,
}

impl PairCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one page and offer every matched record.
    pub fn scan_page<L: AsRef<str>>(&mut self, lines: &[L]) {
        for record in PageScanner::new(lines) {
            self.offer(&record);
        }
    }

    /// Resolve one record into at most one output pair.
    pub fn offer(&mut self, record: &LineRecord<'_>) -> RecordOutcome {
        let outcome = self.resolve(record);
        self.stats.record(outcome);
        outcome
    }

    fn resolve(&mut self, record: &LineRecord<'_>) -> RecordOutcome {
        let mut english = clean_name(record.english);
        let mut irish = clean_name(record.irish);

        if english.contains('[') && irish.contains(']') {
            return RecordOutcome::CrossBracket;
        }

        if english.contains(EN_VARIANT_SEPARATOR) || irish.contains(GA_VARIANT_SEPARATOR) {
            (english, irish) = first_variant(&english, &irish);
        }

        if !is_valid_name(&english) || !is_valid_name(&irish) {
            return RecordOutcome::Invalid;
        }

        let pair = NamePair::new(english, irish);
        if self.seen.contains(&pair) {
            return RecordOutcome::Duplicate;
        }
        self.seen.insert(pair.clone());

        if has_bracket(&pair.english) || has_bracket(&pair.irish) {
            return RecordOutcome::SeenNotKept;
        }

        self.pairs.push(pair);
        RecordOutcome::Kept
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn pairs(&self) -> &[NamePair] {
        &self.pairs
    }

    pub fn into_parts(self) -> (Vec<NamePair>, ScanStats) {
        (self.pairs, self.stats)
    }
}
