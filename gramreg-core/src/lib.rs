//! Slot extraction and differencing for grammar regression tests
//!
//!     This crate turns the raw output of an external grammar engine into structured test cases
//!     and compares two sets of test cases produced by two versions of the same grammar.
//!
//!     It is a pure lib: it never spawns processes or reads the environment. Running the engine
//!     is the job of gramreg-engine, orchestration lives in gramreg-cli.
//!
//! Pipeline
//!
//!     raw lines -> sanitize -> join -> split -> TestCase::from_document (xN) -> compare | tset
//!
//!     .
//!     ├── sanitize.rs     # Drops engine banner lines from process output
//!     ├── split.rs        # One XML document per parse result
//!     ├── test_case.rs    # XML document -> TestCase (slot extraction)
//!     ├── compare.rs      # Positional comparison of two TestCase sequences
//!     ├── tset.rs         # .tset serialization
//!     └── error.rs
//!
//! Line Format
//!
//!     Both the regression test set (.tset) and the comparison file (.comp) use one line per
//!     (sentence, slot) pair:
//!
//!         <grammar_name> "<sentence>" <slot_name> "<slot_value>"
//!
//!     In the comparison file the value is either the shared value, "source#compare" when the
//!     two grammars disagree, or "KEY_MISMATCH <key>" when the slots are out of step.

pub mod compare;
pub mod error;
pub mod sanitize;
pub mod split;
pub mod test_case;
pub mod tset;

pub use compare::{compare, compare_extractions, ComparisonRecord, ComparisonReport, LengthMismatch, Outcome};
pub use error::{ExtractError, Result};
pub use sanitize::Sanitizer;
pub use split::{split_documents, split_lines};
pub use test_case::{extract_all, is_reserved, Extraction, TestCase, RESERVED_KEYS};
pub use tset::{render_test_set, write_test_set, WriteMode};

/// Format one `.tset`/`.comp` line (without the trailing newline).
pub(crate) fn format_line(grammar_name: &str, literal_value: &str, key: &str, value: &str) -> String {
    format!("{} \"{}\" {} \"{}\"", grammar_name, literal_value, key, value)
}
