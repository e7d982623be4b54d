//! Parse-result splitter
//!
//! The engine prints one XML document per parsed sentence with nothing between them but
//! whitespace, so the joined output is segmented on the `<?xml version` declaration and the
//! closing `</result>` tag.
//!
//! Whitespace between a closing and the next opening tag is collapsed first. Text nodes keep
//! their inner whitespace; only runs bounded by `>` and `<` are removed.

use once_cell::sync::Lazy;
use regex::Regex;

static INTER_TAG_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());

static PARSE_RESULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<\?xml version.*?</result>").unwrap());

/// Remove whitespace runs that sit between two tags.
pub fn collapse_inter_tag_whitespace(joined: &str) -> String {
    INTER_TAG_WHITESPACE.replace_all(joined, "><").into_owned()
}

/// Split concatenated parse results into one XML document per result, in order.
///
/// Returns an empty vector when the input holds no parse result.
pub fn split_documents(joined: &str) -> Vec<String> {
    let collapsed = collapse_inter_tag_whitespace(joined);
    PARSE_RESULT
        .find_iter(&collapsed)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Join sanitized output lines and split them into documents.
pub fn split_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let joined: String = lines.iter().map(AsRef::as_ref).collect();
    split_documents(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc(slot: &str, value: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><result><instance><grammar_id>g1</grammar_id><{0}>{1}</{0}></instance></result>",
            slot, value
        )
    }

    #[test]
    fn empty_input_yields_no_documents() {
        assert!(split_documents("").is_empty());
        assert!(split_documents("no parses here").is_empty());
    }

    #[test]
    fn splits_adjacent_documents() {
        let joined = format!("{}{}", doc("intent", "a"), doc("intent", "b"));
        let docs = split_documents(&joined);
        assert_eq!(docs, vec![doc("intent", "a"), doc("intent", "b")]);
    }

    #[test]
    fn collapses_whitespace_between_tags() {
        let joined = "<?xml version=\"1.0\"?> <result>\n  <instance> <intent>a</intent> </instance>\t</result>  <?xml version=\"1.0\"?><result></result>";
        let docs = split_documents(joined);
        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs[0],
            "<?xml version=\"1.0\"?><result><instance><intent>a</intent></instance></result>"
        );
        assert_eq!(docs[1], "<?xml version=\"1.0\"?><result></result>");
    }

    #[test]
    fn keeps_whitespace_inside_text() {
        let docs = split_documents(&doc("city", "New York"));
        assert!(docs[0].contains("<city>New York</city>"));
    }

    #[test]
    fn ignores_trailing_incomplete_document() {
        let joined = format!("{}<?xml version=\"1.0\"?><result><instance>", doc("intent", "a"));
        assert_eq!(split_documents(&joined), vec![doc("intent", "a")]);
    }

    #[test]
    fn splits_joined_lines() {
        let lines = vec![
            "<?xml version=\"1.0\"?>".to_string(),
            "<result><instance><intent>a</intent></instance></result>".to_string(),
            "<?xml version=\"1.0\"?>".to_string(),
            "<result></result>".to_string(),
        ];
        assert_eq!(split_lines(&lines).len(), 2);
    }

    proptest! {
        #[test]
        fn recovers_every_concatenated_document(
            values in proptest::collection::vec("[a-zA-Z]{1,8}", 0..12),
            gaps in proptest::collection::vec("[ \t\n]{0,3}", 12),
        ) {
            let sources: Vec<String> = values.iter().map(|v| doc("slot", v)).collect();
            let mut joined = String::new();
            for (i, source) in sources.iter().enumerate() {
                // inject whitespace between the document and its neighbours
                joined.push_str(&gaps[i]);
                joined.push_str(&source.replace("><instance>", &format!(">{}<instance>", gaps[i])));
            }
            let docs = split_documents(&joined);
            prop_assert_eq!(docs.len(), sources.len());
            for (got, want) in docs.iter().zip(&sources) {
                prop_assert_eq!(got, want);
                prop_assert!(roxmltree::Document::parse(got).is_ok());
            }
        }
    }
}
