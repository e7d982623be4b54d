//! Positional comparison of two test case sequences
//!
//! Both sequences come from parsing the same ordered sentence list with two versions of a
//! grammar, so case `i` of one side is compared with case `i` of the other. Within a pair the
//! slots are walked in lock-step in insertion order, reserved keys left out:
//!
//! - same key, same value: match
//! - same key, different value: slot mismatch, rendered `"source#compare"`
//! - different keys: key mismatch, rendered `"KEY_MISMATCH <compare key>"` under the source key
//!
//! Keys are not joined by name. A grammar update that only reorders slots shows up as key
//! mismatches. When one side has more slots than the other the extra ones have no partner and
//! are not reported.
//!
//! If the two sequences differ in length, the comparison stops at the shorter one and the
//! report carries a [`LengthMismatch`].

use crate::error::{ExtractError, Result};
use crate::test_case::{Extraction, TestCase};
use crate::format_line;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// How one slot of a pair compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Match { value: String },
    ValueMismatch { source: String, compare: String },
    KeyMismatch { compare_key: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Match { value } => write!(f, "{}", value),
            Outcome::ValueMismatch { source, compare } => write!(f, "{}#{}", source, compare),
            Outcome::KeyMismatch { compare_key } => write!(f, "KEY_MISMATCH {}", compare_key),
        }
    }
}

/// One line of the comparison file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    pub grammar_name: String,
    pub literal_value: String,
    pub key: String,
    pub outcome: Outcome,
}

impl ComparisonRecord {
    pub fn is_match(&self) -> bool {
        matches!(self.outcome, Outcome::Match { .. })
    }
}

impl fmt::Display for ComparisonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_line(
            &self.grammar_name,
            &self.literal_value,
            &self.key,
            &self.outcome.to_string(),
        ))
    }
}

/// The two compared sequences had different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthMismatch {
    pub source: usize,
    pub compare: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    pub records: Vec<ComparisonRecord>,
    pub key_mismatches: usize,
    pub slot_mismatches: usize,
    pub length_mismatch: Option<LengthMismatch>,
    /// Positions left out because one side failed to extract.
    pub skipped: usize,
}

impl ComparisonReport {
    pub fn has_regressions(&self) -> bool {
        self.key_mismatches > 0 || self.slot_mismatches > 0 || self.length_mismatch.is_some()
    }

    /// Contents of the `.comp` file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_string());
            out.push('\n');
        }
        out
    }

    /// Write the `.comp` file, replacing any previous one.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|err| ExtractError::write(path, err))
    }
}

/// Compare two sequences position by position.
pub fn compare(source: &[TestCase], compare: &[TestCase]) -> ComparisonReport {
    let mut report = ComparisonReport::default();

    if source.len() != compare.len() {
        report.length_mismatch = Some(LengthMismatch {
            source: source.len(),
            compare: compare.len(),
        });
    }

    for (s, c) in source.iter().zip(compare) {
        compare_pair(s, c, &mut report);
    }

    report
}

/// Compare two extraction batches, leaving out positions where either side failed.
pub fn compare_extractions(source: &Extraction, compare_side: &Extraction) -> ComparisonReport {
    let paired = source.len().min(compare_side.len());
    let mut sources = Vec::with_capacity(paired);
    let mut compares = Vec::with_capacity(paired);
    let mut skipped = 0;

    for index in 0..paired {
        match (source.get(index), compare_side.get(index)) {
            (Some(s), Some(c)) => {
                sources.push(s.clone());
                compares.push(c.clone());
            }
            _ => skipped += 1,
        }
    }

    let mut report = compare(&sources, &compares);
    report.skipped = skipped;
    if source.len() != compare_side.len() {
        report.length_mismatch = Some(LengthMismatch {
            source: source.len(),
            compare: compare_side.len(),
        });
    }
    report
}

fn compare_pair(source: &TestCase, compare: &TestCase, report: &mut ComparisonReport) {
    for ((key_s, value_s), (key_c, value_c)) in source.test_slots().zip(compare.test_slots()) {
        let outcome = if key_s != key_c {
            report.key_mismatches += 1;
            Outcome::KeyMismatch {
                compare_key: key_c.to_string(),
            }
        } else if value_s != value_c {
            report.slot_mismatches += 1;
            Outcome::ValueMismatch {
                source: value_s.to_string(),
                compare: value_c.to_string(),
            }
        } else {
            Outcome::Match {
                value: value_s.to_string(),
            }
        };

        report.records.push(ComparisonRecord {
            grammar_name: source.grammar_name().to_string(),
            literal_value: source.literal_value().to_string(),
            key: key_s.to_string(),
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(grammar: &str, literal: &str, slots: &[(&str, &str)]) -> TestCase {
        let body: String = slots
            .iter()
            .map(|(k, v)| format!("<{0}>{1}</{0}>", k, v))
            .collect();
        let doc = format!(
            "<?xml version=\"1.0\"?><result><instance><grammar_id>g</grammar_id>{}</instance></result>",
            body
        );
        TestCase::from_document(&doc, grammar, Some(literal)).unwrap()
    }

    fn berlin(destination: &str) -> TestCase {
        case(
            "g1.xml",
            "fly to Berlin",
            &[("intent", "book_flight"), ("destination", destination)],
        )
    }

    #[test]
    fn identical_sequences_have_no_mismatches() {
        let cases = vec![
            berlin("Berlin"),
            case("g1.xml", "book a train", &[("intent", "book_train"), ("class", "")]),
        ];
        let report = compare(&cases, &cases.clone());
        assert_eq!(report.key_mismatches, 0);
        assert_eq!(report.slot_mismatches, 0);
        assert!(report.length_mismatch.is_none());
        assert!(!report.has_regressions());
        assert!(report.records.iter().all(ComparisonRecord::is_match));
        assert_eq!(report.records.len(), 4);
    }

    #[test]
    fn reports_one_value_mismatch() {
        let report = compare(&[berlin("Berlin")], &[berlin("Munich")]);
        assert_eq!(report.slot_mismatches, 1);
        assert_eq!(report.key_mismatches, 0);
        assert!(report.records[0].is_match());
        insta::assert_snapshot!(report.render(), @r###"
        g1.xml "fly to Berlin" intent "book_flight"
        g1.xml "fly to Berlin" destination "Berlin#Munich"
        "###);
    }

    #[test]
    fn reordered_slots_are_key_mismatches() {
        let source = case("g1.xml", "fly", &[("intent", "fly"), ("destination", "Berlin")]);
        let compare_side = case("g2.xml", "fly", &[("destination", "Berlin"), ("intent", "fly")]);
        let report = compare(&[source], &[compare_side]);

        assert_eq!(report.key_mismatches, 2);
        assert_eq!(report.slot_mismatches, 0);
        assert_eq!(
            report.records[0].outcome,
            Outcome::KeyMismatch {
                compare_key: "destination".to_string()
            }
        );
        assert_eq!(
            report.records[0].to_string(),
            "g1.xml \"fly\" intent \"KEY_MISMATCH destination\""
        );
    }

    #[test]
    fn records_use_source_grammar_and_literal() {
        let source = case("old/g.xml", "hello", &[("a", "1")]);
        let compare_side = case("new/g.xml", "hello there", &[("a", "1")]);
        let report = compare(&[source], &[compare_side]);
        assert_eq!(report.render(), "old/g.xml \"hello\" a \"1\"\n");
    }

    #[test]
    fn unpaired_trailing_slots_are_ignored() {
        let source = case("g.xml", "s", &[("a", "1"), ("b", "2")]);
        let compare_side = case("g.xml", "s", &[("a", "1")]);
        let report = compare(&[source], &[compare_side]);
        assert_eq!(report.records.len(), 1);
        assert!(!report.has_regressions());
    }

    #[test]
    fn length_mismatch_truncates_and_is_reported() {
        let report = compare(&[berlin("Berlin"), berlin("Berlin")], &[berlin("Berlin")]);
        assert_eq!(report.records.len(), 2);
        assert_eq!(
            report.length_mismatch,
            Some(LengthMismatch {
                source: 2,
                compare: 1
            })
        );
        assert!(report.has_regressions());
    }

    #[test]
    fn comparing_extractions_skips_failed_positions() {
        let good = "<?xml version=\"1.0\"?><result><instance><a>1</a></instance></result>".to_string();
        let bad = "<?xml version=\"1.0\"?><result>".to_string();
        let sentences = ["x", "y"];
        let source = crate::extract_all("g.xml", &[good.clone(), good.clone()], &sentences);
        let compare_side = crate::extract_all("g.xml", &[bad, good], &sentences);

        let report = compare_extractions(&source, &compare_side);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.render(), "g.xml \"y\" a \"1\"\n");
        assert!(!report.has_regressions());
    }

    #[test]
    fn writes_comparison_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g1.comp");
        let report = compare(&[berlin("Berlin")], &[berlin("Munich")]);
        report.write_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, report.render());
    }
}
