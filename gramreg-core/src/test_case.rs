//! Slot extraction
//!
//! A parse-result document looks like
//!
//! ```text
//! <?xml version="1.0"?>
//! <result>
//!   <instance>
//!     <grammar_id>g1</grammar_id>
//!     <intent>book_flight</intent>
//!     <destination>Berlin</destination>
//!   </instance>
//! </result>
//! ```
//!
//! Every direct child of every `instance` element becomes a slot, except `grammar_id`. Slot
//! values are trimmed; a missing text or the literal text `None` becomes the empty string.
//!
//! When a document carries several `instance` elements, a later instance overwrites the value
//! of a slot an earlier one already set. The slot keeps the position where it was first seen.

use crate::error::{ExtractError, Result};
use indexmap::IndexMap;
use tracing::warn;

/// Keys that describe where a test case came from rather than what the grammar produced.
/// They are never compared or written to a test set.
pub const RESERVED_KEYS: &[&str] = &["literal_value", "grammar_name", "grammar_version"];

const INSTANCE_TAG: &str = "instance";
const GRAMMAR_ID_TAG: &str = "grammar_id";
const LITERAL_TAG: &str = "literal_value";

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// One generated sentence together with the slot values a grammar assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    grammar_name: String,
    literal_value: String,
    slots: IndexMap<String, String>,
}

impl TestCase {
    /// Build a test case from one parse-result document.
    ///
    /// The sentence is taken from the document's `literal_value` slot when the engine reports
    /// one, otherwise from `sentence`.
    pub fn from_document(document: &str, grammar_name: &str, sentence: Option<&str>) -> Result<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let tree = roxmltree::Document::parse_with_options(document, options)?;

        let mut slots = IndexMap::new();
        for instance in tree
            .descendants()
            .filter(|node| node.has_tag_name(INSTANCE_TAG))
        {
            for slot in instance.children().filter(|node| node.is_element()) {
                let tag = slot.tag_name().name();
                if tag == GRAMMAR_ID_TAG {
                    continue;
                }
                slots.insert(tag.to_string(), normalize(slot.text()));
            }
        }

        let literal_value = match slots.shift_remove(LITERAL_TAG) {
            Some(literal) => literal,
            None => sentence.map(str::trim).unwrap_or_default().to_string(),
        };

        Ok(TestCase {
            grammar_name: grammar_name.to_string(),
            literal_value,
            slots,
        })
    }

    pub fn grammar_name(&self) -> &str {
        &self.grammar_name
    }

    pub fn literal_value(&self) -> &str {
        &self.literal_value
    }

    /// All slots in first-seen order, including `grammar_version` if the engine reported it.
    pub fn slots(&self) -> &IndexMap<String, String> {
        &self.slots
    }

    pub fn slot(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Slots that take part in comparison and serialization, in order.
    pub fn test_slots(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots
            .iter()
            .filter(|(key, _)| !is_reserved(key))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

fn normalize(text: Option<&str>) -> String {
    match text.map(str::trim) {
        None | Some("None") => String::new(),
        Some(value) => value.to_string(),
    }
}

/// Outcome of extracting a batch of documents. Each entry keeps its document position.
#[derive(Debug, Default)]
pub struct Extraction {
    results: Vec<Result<TestCase>>,
}

impl Extraction {
    /// Number of documents, failed ones included.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.results.get(index).and_then(|r| r.as_ref().ok())
    }

    pub fn cases(&self) -> impl Iterator<Item = &TestCase> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &ExtractError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Extract one test case per document. `sentences` supplies the literal for documents that
/// carry none, matched by position. When the counts differ the positions cannot be trusted, so
/// only literals reported inside the documents are used.
///
/// A malformed document does not stop the batch: it is logged and kept as a failure.
pub fn extract_all<S: AsRef<str>>(grammar_name: &str, documents: &[String], sentences: &[S]) -> Extraction {
    let aligned = documents.len() == sentences.len();
    if !aligned {
        warn!(
            grammar = grammar_name,
            documents = documents.len(),
            sentences = sentences.len(),
            "parse results do not line up with sentences, taking literals from the results only"
        );
    }

    let results = documents
        .iter()
        .enumerate()
        .map(|(index, document)| {
            let sentence = sentences.get(index).filter(|_| aligned).map(AsRef::as_ref);
            TestCase::from_document(document, grammar_name, sentence).map_err(|err| {
                warn!(grammar = grammar_name, index, error = %err, "skipping malformed parse result");
                err
            })
        })
        .collect::<Vec<_>>();

    Extraction { results }
}

impl From<Vec<TestCase>> for Extraction {
    fn from(cases: Vec<TestCase>) -> Self {
        Extraction {
            results: cases.into_iter().map(Ok).collect(),
        }
    }
}
