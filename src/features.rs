//! Linguistic feature matrix for sentence synthesis.
//!
//! Every synthesis request asks the model for sentences built around one
//! combination of person, verb, preposition, case and tense. The matrix is the
//! full cross-product of the five fixed value lists below (8 × 15 × 10 × 3 × 5
//! = 18 000 rows), built once and never mutated; sampling and filtering hand
//! out copies of rows.

use crate::config::SamplingPolicy;
use crate::error::LogainmError;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grammatical persons, plus the autonomous (`saor`) form.
pub const PERSONS: [&str; 8] = [
    "1sg",   // mé/mise
    "2sg",   // tú/tusa
    "3sg_m", // sé/seisean
    "3sg_f", // sí/sise
    "1pl",   // muid/sinne
    "2pl",   // sibh/sibhse
    "3pl",   // siad/siadsan
    "saor",
];

/// High-frequency verbs, lemma forms.
pub const VERBS: [&str; 15] = [
    "bí",        // be
    "déan",      // do/make
    "faigh",     // get
    "téigh",     // go
    "feic",      // see
    "tabhair",   // give
    "tar",       // come
    "abair",     // say
    "ith",       // eat
    "ól",        // drink
    "ceannaigh", // buy
    "léigh",     // read
    "scríobh",   // write
    "seas",      // stand
    "suigh",     // sit
];

/// Simple prepositions.
pub const PREPOSITIONS: [&str; 10] = [
    "i", "ar", "le", "ó", "do", "ag", "faoi", "roimh", "tar éis", "gan",
];

pub const CASES: [&str; 3] = [
    "nominative", // tuiseal ainmneach
    "genitive",   // tuiseal ginideach
    "dative",     // tuiseal tabharthach
];

pub const TENSES: [&str; 5] = [
    "Aimsir Cháite",          // past
    "Aimsir Láithreach",      // present
    "Aimsir Fháistineach",    // future
    "Aimsir Gnáthcháite",     // past habitual
    "Aimsir Gnáthláithreach", // present habitual
];

/// Size of the full cross-product.
pub const TOTAL_COMBINATIONS: usize =
    PERSONS.len() * VERBS.len() * PREPOSITIONS.len() * CASES.len() * TENSES.len();

/// One combination of the five dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FeatureRow {
    pub person: &'static str,
    pub verb: &'static str,
    pub preposition: &'static str,
    pub case: &'static str,
    pub tense: &'static str,
}

/// A partial row: every `Some` field must match exactly, `None` fields are
/// unconstrained. An empty string counts as unconstrained too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCriteria {
    pub person: Option<String>,
    pub verb: Option<String>,
    pub preposition: Option<String>,
    pub case: Option<String>,
    pub tense: Option<String>,
}

impl FeatureCriteria {
    pub fn person(mut self, v: impl Into<String>) -> Self {
        self.person = Some(v.into());
        self
    }

    pub fn verb(mut self, v: impl Into<String>) -> Self {
        self.verb = Some(v.into());
        self
    }

    pub fn preposition(mut self, v: impl Into<String>) -> Self {
        self.preposition = Some(v.into());
        self
    }

    pub fn case(mut self, v: impl Into<String>) -> Self {
        self.case = Some(v.into());
        self
    }

    pub fn tense(mut self, v: impl Into<String>) -> Self {
        self.tense = Some(v.into());
        self
    }

    pub fn matches(&self, row: &FeatureRow) -> bool {
        fn field(want: &Option<String>, have: &str) -> bool {
            match want.as_deref() {
                None | Some("") => true,
                Some(w) => w == have,
            }
        }
        field(&self.person, row.person)
            && field(&self.verb, row.verb)
            && field(&self.preposition, row.preposition)
            && field(&self.case, row.case)
            && field(&self.tense, row.tense)
    }
}

/// Row count and value lists, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixSummary {
    pub total_combinations: usize,
    pub persons: &'static [&'static str],
    pub verbs: &'static [&'static str],
    pub prepositions: &'static [&'static str],
    pub cases: &'static [&'static str],
    pub tenses: &'static [&'static str],
}

impl fmt::Display for MatrixSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn line(f: &mut fmt::Formatter<'_>, name: &str, values: &[&str]) -> fmt::Result {
            writeln!(f, "- {}: {} ({})", name, values.len(), values.join(", "))
        }
        writeln!(f, "Irish Feature Matrix Summary:")?;
        writeln!(f, "- Total combinations: {}", self.total_combinations)?;
        line(f, "Persons", self.persons)?;
        line(f, "Verbs", self.verbs)?;
        line(f, "Prepositions", self.prepositions)?;
        line(f, "Cases", self.cases)?;
        line(f, "Tenses", self.tenses)
    }
}

/// The full, immutable feature cross-product.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    rows: Vec<FeatureRow>,
    policy: SamplingPolicy,
}

impl Default for FeatureMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureMatrix {
    /// Build the matrix with the default [`SamplingPolicy`].
    pub fn new() -> Self {
        Self::with_policy(SamplingPolicy::default())
    }

    /// Build the matrix with an explicit policy for oversized
    /// no-replacement requests.
    pub fn with_policy(policy: SamplingPolicy) -> Self {
        let mut rows = Vec::with_capacity(TOTAL_COMBINATIONS);
        for person in PERSONS {
            for verb in VERBS {
                for preposition in PREPOSITIONS {
                    for case in CASES {
                        for tense in TENSES {
                            rows.push(FeatureRow {
                                person,
                                verb,
                                preposition,
                                case,
                                tense,
                            });
                        }
                    }
                }
            }
        }
        Self { rows, policy }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    /// Sample `n` rows using the thread-local RNG.
    ///
    /// See [`FeatureMatrix::sample_with_rng`].
    pub fn sample(&self, n: usize, ensure_variation: bool) -> Result<Vec<FeatureRow>, LogainmError> {
        self.sample_with_rng(&mut rand::thread_rng(), n, ensure_variation)
    }

    /// Sample `n` rows.
    ///
    /// With `ensure_variation` and `n` within the population, no row repeats.
    /// Otherwise rows are drawn with replacement. When `ensure_variation` is
    /// set and `n` exceeds the population, [`SamplingPolicy::Strict`] fails
    /// with [`LogainmError::InvalidArgument`] instead of falling back.
    pub fn sample_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        ensure_variation: bool,
    ) -> Result<Vec<FeatureRow>, LogainmError> {
        self.sample_under(rng, n, ensure_variation, self.policy)
    }

    /// Sample under an explicit policy, overriding the matrix's own.
    pub(crate) fn sample_under<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        ensure_variation: bool,
        policy: SamplingPolicy,
    ) -> Result<Vec<FeatureRow>, LogainmError> {
        let population = self.rows.len();

        if ensure_variation && n <= population {
            return Ok(index::sample(rng, population, n)
                .into_iter()
                .map(|i| self.rows[i])
                .collect());
        }

        if ensure_variation && policy == SamplingPolicy::Strict {
            return Err(LogainmError::InvalidArgument(format!(
                "cannot sample {n} distinct rows from {population} combinations"
            )));
        }

        if population == 0 {
            return Ok(Vec::new());
        }
        Ok((0..n)
            .map(|_| self.rows[rng.gen_range(0..population)])
            .collect())
    }

    /// All rows matching every specified field of `criteria`.
    pub fn filter(&self, criteria: &FeatureCriteria) -> Vec<FeatureRow> {
        self.rows
            .iter()
            .filter(|row| criteria.matches(row))
            .copied()
            .collect()
    }

    /// One random row.
    pub fn sample_one(&self) -> FeatureRow {
        self.sample_one_with_rng(&mut rand::thread_rng())
    }

    pub fn sample_one_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> FeatureRow {
        self.rows[rng.gen_range(0..self.rows.len())]
    }

    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary {
            total_combinations: self.rows.len(),
            persons: &PERSONS,
            verbs: &VERBS,
            prepositions: &PREPOSITIONS,
            cases: &CASES,
            tenses: &TENSES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn full_cross_product() {
        let m = FeatureMatrix::new();
        assert_eq!(m.len(), 18_000);
        assert_eq!(m.summary().total_combinations, 18_000);
        let distinct: HashSet<_> = m.rows().iter().collect();
        assert_eq!(distinct.len(), 18_000);
    }

    #[test]
    fn summary_lists_dimensions() {
        let s = FeatureMatrix::new().summary();
        assert_eq!(s.persons.len(), 8);
        assert_eq!(s.verbs.len(), 15);
        assert_eq!(s.prepositions.len(), 10);
        assert_eq!(s.cases.len(), 3);
        assert_eq!(s.tenses.len(), 5);
        let text = s.to_string();
        assert!(text.contains("Total combinations: 18000"));
        assert!(text.contains("Tenses: 5 (Aimsir Cháite,"));
    }

    #[test]
    fn sample_without_replacement_has_no_duplicates() {
        let m = FeatureMatrix::new();
        let rows = m.sample(100, true).unwrap();
        assert_eq!(rows.len(), 100);
        let distinct: HashSet<_> = rows.iter().collect();
        assert_eq!(distinct.len(), 100);
    }

    #[test]
    fn sample_whole_population() {
        let m = FeatureMatrix::new();
        let mut rng = StdRng::seed_from_u64(7);
        let rows = m.sample_with_rng(&mut rng, 18_000, true).unwrap();
        let distinct: HashSet<_> = rows.iter().collect();
        assert_eq!(distinct.len(), 18_000);
    }

    #[test]
    fn oversize_request_falls_back_to_replacement() {
        let m = FeatureMatrix::new();
        let mut rng = StdRng::seed_from_u64(1);
        let rows = m.sample_with_rng(&mut rng, 18_001, true).unwrap();
        assert_eq!(rows.len(), 18_001);
    }

    #[test]
    fn oversize_request_rejected_when_strict() {
        let m = FeatureMatrix::with_policy(SamplingPolicy::Strict);
        let err = m.sample(18_001, true).unwrap_err();
        assert!(matches!(err, LogainmError::InvalidArgument(_)));
        // Replacement was requested explicitly: no error.
        assert_eq!(m.sample(18_001, false).unwrap().len(), 18_001);
    }

    #[test]
    fn sample_zero_rows() {
        let m = FeatureMatrix::new();
        assert!(m.sample(0, true).unwrap().is_empty());
        assert!(m.sample(0, false).unwrap().is_empty());
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let m = FeatureMatrix::new();
        let a = m.sample_with_rng(&mut StdRng::seed_from_u64(42), 10, true).unwrap();
        let b = m.sample_with_rng(&mut StdRng::seed_from_u64(42), 10, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn filter_by_tense() {
        let m = FeatureMatrix::new();
        let rows = m.filter(&FeatureCriteria::default().tense("Aimsir Cháite"));
        assert_eq!(rows.len(), 3_600);
        assert!(rows.iter().all(|r| r.tense == "Aimsir Cháite"));
    }

    #[test]
    fn filter_combines_fields() {
        let m = FeatureMatrix::new();
        let criteria = FeatureCriteria::default()
            .person("saor")
            .verb("ól")
            .case("genitive");
        let rows = m.filter(&criteria);
        assert_eq!(rows.len(), 10 * 5);
        assert!(rows
            .iter()
            .all(|r| r.person == "saor" && r.verb == "ól" && r.case == "genitive"));
    }

    #[test]
    fn filter_unconstrained_and_unknown() {
        let m = FeatureMatrix::new();
        assert_eq!(m.filter(&FeatureCriteria::default()).len(), 18_000);
        assert_eq!(m.filter(&FeatureCriteria::default().person("")).len(), 18_000);
        assert!(m.filter(&FeatureCriteria::default().verb("rith")).is_empty());
    }

    #[test]
    fn filter_does_not_touch_matrix() {
        let m = FeatureMatrix::new();
        let _ = m.filter(&FeatureCriteria::default().tense("Aimsir Láithreach"));
        assert_eq!(m.len(), 18_000);
    }

    #[test]
    fn sample_one_is_a_matrix_row() {
        let m = FeatureMatrix::new();
        let row = m.sample_one();
        assert!(m.rows().contains(&row));
    }
}
