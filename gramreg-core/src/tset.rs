//! Regression test set (`.tset`) serialization
//!
//! One line per (sentence, slot) pair, reserved keys left out:
//!
//! ```text
//! g1.xml "fly to Berlin" intent "book_flight"
//! g1.xml "fly to Berlin" destination "Berlin"
//! ```
//!
//! Append mode lets a second grammar's values for the same sentences follow the first ones in
//! the same file.

use crate::error::{ExtractError, Result};
use crate::format_line;
use crate::test_case::TestCase;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    Append,
}

/// Render the test set lines for `cases`, each newline-terminated.
pub fn render_test_set<'a, I>(cases: I) -> String
where
    I: IntoIterator<Item = &'a TestCase>,
{
    let mut out = String::new();
    for case in cases {
        for (key, value) in case.test_slots() {
            out.push_str(&format_line(case.grammar_name(), case.literal_value(), key, value));
            out.push('\n');
        }
    }
    out
}

/// Write `cases` to `path`. The file is created if needed and closed before returning.
pub fn write_test_set<'a, I>(cases: I, path: impl AsRef<Path>, mode: WriteMode) -> Result<()>
where
    I: IntoIterator<Item = &'a TestCase>,
{
    let path = path.as_ref();
    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Overwrite => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };

    let mut file = options
        .open(path)
        .map_err(|err| ExtractError::write(path, err))?;
    file.write_all(render_test_set(cases).as_bytes())
        .map_err(|err| ExtractError::write(path, err))
}
