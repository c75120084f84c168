//! Post-processing: deterministic cleanup of generated sentences.
//!
//! The model is asked for one sentence per line and nothing else, but it
//! still numbers them, bullets them, wraps them in quotes or a code fence,
//! or adds an English preamble ending in a colon. Each rule below is a pure
//! `&str → String` pass, applied in order:
//!
//! 1. Strip an outer code fence
//! 2. Normalise line endings (CRLF → LF)
//! 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 4. Per line: strip list numbering and bullets
//! 5. Per line: strip wrapping quotes
//! 6. Drop blank lines and preamble lines ending in `:`

use once_cell::sync::Lazy;
use regex::Regex;

/// Split raw model output into clean, non-empty sentences.
pub fn split_sentences(input: &str) -> Vec<String> {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    s.lines()
        .map(strip_list_marker)
        .map(strip_wrapping_quotes)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .collect()
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*)\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode ─────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'))
        .collect()
}

// ── Rule 4: Strip list markers ───────────────────────────────────────────────

static RE_LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+").unwrap());

fn strip_list_marker(line: &str) -> &str {
    match RE_LIST_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

// ── Rule 5: Strip wrapping quotes ────────────────────────────────────────────

fn strip_wrapping_quotes(line: &str) -> &str {
    let t = line.trim();
    for (open, close) in [('"', '"'), ('“', '”'), ('«', '»')] {
        if let Some(inner) = t.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
            return inner;
        }
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_pass_through() {
        let out = split_sentences("Chuaigh mé go Cromghlinn inné.\nBeidh sí i gCaisleán Cnucha amárach.");
        assert_eq!(
            out,
            vec!["Chuaigh mé go Cromghlinn inné.", "Beidh sí i gCaisleán Cnucha amárach."]
        );
    }

    #[test]
    fn numbering_and_bullets_removed() {
        let out = split_sentences("1. Abair a.\n2) Abair b.\n- Abair c.\n• Abair d.");
        assert_eq!(out, vec!["Abair a.", "Abair b.", "Abair c.", "Abair d."]);
    }

    #[test]
    fn fences_and_quotes_removed() {
        let out = split_sentences("```text\n\"Ólann siad tae ag An Carn.\"\n“D'ith mé ar An Seantóir.”\n```");
        assert_eq!(out, vec!["Ólann siad tae ag An Carn.", "D'ith mé ar An Seantóir."]);
    }

    #[test]
    fn preamble_and_blanks_dropped() {
        let out = split_sentences("Here are the sentences:\r\n\r\n1. Tá sé i nGlinn.\r\n\r\n");
        assert_eq!(out, vec!["Tá sé i nGlinn."]);
    }

    #[test]
    fn invisible_chars_removed() {
        assert_eq!(split_sentences("Tá\u{200B} sé\u{FEFF} ann."), vec!["Tá sé ann."]);
    }

    #[test]
    fn leading_digit_without_separator_is_kept() {
        // "1798" starts the sentence; it is not a list marker.
        assert_eq!(split_sentences("1798 a bhí ann."), vec!["1798 a bhí ann."]);
    }

    #[test]
    fn empty_output() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("\n\n").is_empty());
    }
}
