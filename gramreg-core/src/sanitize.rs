//! Output sanitizer
//!
//! The grammar engine interleaves banner and log lines with its payload (sentences or XML).
//! Those lines carry one of a small set of markers, so every line containing a marker is
//! dropped. The filter is coarse: a payload line that happens to contain a marker is dropped as
//! well, and a banner line without any marker passes through.

/// Markers the engine uses in its diagnostic lines.
pub const DEFAULT_MARKERS: &[&str] = &[":", "|", "=="];

/// Line filter removing engine-internal lines from process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitizer {
    markers: Vec<String>,
}

impl Sanitizer {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Sanitizer {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// True if the line carries none of the markers.
    pub fn keeps(&self, line: &str) -> bool {
        !self.markers.iter().any(|marker| line.contains(marker.as_str()))
    }

    /// Drop every line containing a marker, keeping the order of the rest.
    pub fn sanitize<I, S>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lines
            .into_iter()
            .map(Into::into)
            .filter(|line| self.keeps(line))
            .collect()
    }

    /// Split raw process output into lines and sanitize them.
    pub fn sanitize_output(&self, output: &str) -> Vec<String> {
        self.sanitize(output.lines())
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::new(DEFAULT_MARKERS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn passes_lines_without_markers() {
        let raw = vec!["GEN v2.1", "fly to Berlin", "book a train"];
        let cleaned = Sanitizer::default().sanitize(raw.clone());
        assert_eq!(cleaned, raw);
    }

    #[test]
    fn drops_banner_lines() {
        let raw = vec![
            "xmlgenerator: loading grammar",
            "| rule | weight |",
            "==========",
            "fly to Berlin",
            "book a train",
        ];
        let cleaned = Sanitizer::default().sanitize(raw);
        assert_eq!(cleaned, vec!["fly to Berlin", "book a train"]);
    }

    #[test]
    fn drops_payload_lines_with_markers() {
        // Known approximation: the sentence is lost along with the banners
        let cleaned = Sanitizer::default().sanitize(vec!["meet at 10:30"]);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn custom_markers_replace_defaults() {
        let sanitizer = Sanitizer::new(["#"]);
        let cleaned = sanitizer.sanitize(vec!["# header", "a: b"]);
        assert_eq!(cleaned, vec!["a: b"]);
    }

    #[test]
    fn sanitizes_raw_output_by_line() {
        let output = "INFO: start\n<?xml version=\"1.0\"?>\n<result>\n</result>\n";
        let cleaned = Sanitizer::default().sanitize_output(output);
        assert_eq!(cleaned, vec!["<?xml version=\"1.0\"?>", "<result>", "</result>"]);
    }

    proptest! {
        #[test]
        fn sanitizing_twice_equals_once(lines in proptest::collection::vec("[a-z :|=]{0,12}", 0..20)) {
            let sanitizer = Sanitizer::default();
            let once = sanitizer.sanitize(lines);
            let twice = sanitizer.sanitize(once.clone());
            prop_assert_eq!(once, twice);
        }
    }
}
