//! Prompts for Irish sentence synthesis.
//!
//! Every prompt lives here so that wording changes touch one file and unit
//! tests can inspect the text without a provider.
//!
//! Callers can override the system prompt via
//! [`crate::config::SynthesisConfig::system_prompt`]; the constant here is
//! used only when no override is provided.

use crate::features::FeatureRow;

/// Default system prompt for generating sentences around a place name.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a native speaker of Irish (Gaeilge) who writes short, natural example sentences for a language dataset.

Follow these rules precisely:

1. LANGUAGE
   - Write every sentence in standard Irish (An Caighdeán Oifigiúil)
   - Apply initial mutations (séimhiú, urú) after the preposition exactly as the grammar requires

2. CONTENT
   - Every sentence must contain the given place name exactly once
   - Inflect the place name for the requested case where Irish grammar requires it
   - Use the requested person, verb, preposition and tense in every sentence

3. STYLE
   - Keep each sentence under 20 words
   - Vary the situations; do not repeat one template with small changes

4. OUTPUT FORMAT
   - One sentence per line
   - No numbering, bullets, quotes or translations
   - Do NOT add commentary or explanations"#;

/// Human-readable description of a person code.
pub fn describe_person(code: &str) -> &str {
    match code {
        "1sg" => "first person singular (mé)",
        "2sg" => "second person singular (tú)",
        "3sg_m" => "third person singular masculine (sé)",
        "3sg_f" => "third person singular feminine (sí)",
        "1pl" => "first person plural (muid / sinn)",
        "2pl" => "second person plural (sibh)",
        "3pl" => "third person plural (siad)",
        "saor" => "autonomous form (briathar saor)",
        other => other,
    }
}

/// Build the user message for one request.
///
/// `examples` are earlier generated sentences shown for style; pass an empty
/// slice for the first requests of a run.
pub fn sentence_request(placename: &str, row: &FeatureRow, count: usize, examples: &[String]) -> String {
    let mut prompt = format!(
        "Write {count} Irish sentences that use the place name \"{placename}\".\n\n\
         Person: {person}\n\
         Verb: {verb}\n\
         Preposition: {preposition}\n\
         Case of the place name: {case}\n\
         Tense: {tense}\n",
        person = describe_person(row.person),
        verb = row.verb,
        preposition = row.preposition,
        case = row.case,
        tense = row.tense,
    );

    if !examples.is_empty() {
        prompt.push_str("\nExamples of sentences already in the dataset:\n");
        for ex in examples {
            prompt.push_str("- ");
            prompt.push_str(ex);
            prompt.push('\n');
        }
    }

    prompt
}
