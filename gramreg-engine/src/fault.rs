//! Classification of engine failures
//!
//! The engine reports failures only as text on its output. The known cases are:
//!
//! | Output                              | Fault                    |
//! |-------------------------------------|--------------------------|
//! | contains `INVALID_LANGUAGE`         | MissingLanguage          |
//! | `uri` … `file` … `not` … `found`    | MissingGrammarResource   |
//! | fewer than 5 bytes                  | BadInstallation          |
//! | anything else                       | Unknown                  |
//!
//! Checks run in that order, the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static INVALID_LANGUAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"INVALID_LANGUAGE").unwrap());

static MISSING_RESOURCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"uri.*file.*not.*found").unwrap());

/// Output shorter than this means the engine died before printing anything useful.
const MIN_MEANINGFUL_OUTPUT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    MissingLanguage,
    MissingGrammarResource,
    BadInstallation,
    Unknown,
}

impl Fault {
    pub fn classify(output: &str) -> Fault {
        if INVALID_LANGUAGE.is_match(output) {
            Fault::MissingLanguage
        } else if MISSING_RESOURCE.is_match(output) {
            Fault::MissingGrammarResource
        } else if output.len() < MIN_MEANINGFUL_OUTPUT {
            Fault::BadInstallation
        } else {
            Fault::Unknown
        }
    }

    /// Advice printed along with the failure.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Fault::MissingLanguage => {
                Some("Please make sure you have the required language installed!")
            }
            Fault::MissingGrammarResource => Some("External grammar not found!"),
            Fault::BadInstallation => Some("Please check your xmlgenerator installation!"),
            Fault::Unknown => None,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fault::MissingLanguage => "missing language",
            Fault::MissingGrammarResource => "missing grammar resource",
            Fault::BadInstallation => "bad installation",
            Fault::Unknown => "unknown failure",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ERROR INVALID_LANGUAGE de-DE", Fault::MissingLanguage)]
    #[case("load failed: uri 'cities.xml' file not found", Fault::MissingGrammarResource)]
    #[case("uri file was not found anywhere", Fault::MissingGrammarResource)]
    #[case("", Fault::BadInstallation)]
    #[case("seg", Fault::BadInstallation)]
    #[case("grammar compilation failed at line 12", Fault::Unknown)]
    fn classifies_engine_output(#[case] output: &str, #[case] expected: Fault) {
        assert_eq!(Fault::classify(output), expected);
    }

    #[test]
    fn language_check_comes_first() {
        let output = "INVALID_LANGUAGE; uri x file not found";
        assert_eq!(Fault::classify(output), Fault::MissingLanguage);
    }

    #[test]
    fn resource_pattern_stays_within_a_line() {
        let output = "uri resolved\nfile loaded\nnothing not found";
        assert_eq!(Fault::classify(output), Fault::Unknown);
    }

    #[test]
    fn unknown_has_no_hint() {
        assert!(Fault::Unknown.hint().is_none());
        assert!(Fault::BadInstallation.hint().is_some());
    }
}
