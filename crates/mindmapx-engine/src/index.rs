use serde::Serialize;
use std::collections::BTreeMap;

use crate::text::{classify, normalize};

/// Inclusive, zero-based range of document lines that produced a node.
///
/// Only single-line constructs are indexed, so `start_line == end_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl LineSpan {
    pub fn single(line: usize) -> Self {
        Self {
            start_line: line,
            end_line: line,
        }
    }
}

/// Maps normalized node text to the source line that produced it.
///
/// Keys are not unique in real documents: when two lines normalize to the same
/// text, the later line wins. Built wholesale by [`build_index`], never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLineIndex {
    entries: BTreeMap<String, LineSpan>,
}

impl NodeLineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the span for already-normalized text
    pub fn get(&self, normalized: &str) -> Option<LineSpan> {
        self.entries.get(normalized).copied()
    }

    /// Normalize display text and look it up
    pub fn lookup(&self, display_text: &str) -> Option<LineSpan> {
        self.get(&normalize(display_text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, LineSpan> {
        &self.entries
    }

    fn record(&mut self, key: String, span: LineSpan) {
        self.entries.insert(key, span);
    }
}

/// Scan every line of `document_text` and index its headings and list items.
///
/// Lines that are neither are skipped. There is no failure mode.
pub fn build_index(document_text: &str) -> NodeLineIndex {
    let mut index = NodeLineIndex::new();
    for (line_index, line) in document_text.split('\n').enumerate() {
        if let Some(outline) = classify(line) {
            index.record(normalize(outline.text), LineSpan::single(line_index));
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_list_item() {
        let index = build_index("# Title\n- item one\n");

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Title"), Some(LineSpan::single(0)));
        assert_eq!(index.get("item one"), Some(LineSpan::single(1)));
    }

    #[test]
    fn test_duplicate_key_last_line_wins() {
        let index = build_index("- dup\n- dup\n");

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("dup"), Some(LineSpan::single(1)));
    }

    #[test]
    fn test_keys_are_normalized() {
        let index = build_index("## **Bold** heading\n  * see [docs](http://x)\n");

        assert_eq!(index.get("Bold heading"), Some(LineSpan::single(0)));
        assert_eq!(index.get("see docs"), Some(LineSpan::single(1)));
        assert_eq!(index.lookup("**Bold** heading"), Some(LineSpan::single(0)));
    }

    #[test]
    fn test_other_lines_are_skipped() {
        let index = build_index("Intro paragraph\n\n```\n- inside fence\n```\n1. numbered\n");

        // Fences are not tracked, matching the line scan of the source
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("inside fence"), Some(LineSpan::single(3)));
    }

    #[test]
    fn test_build_is_deterministic() {
        let text = "# A\n- b\n  - c\n- b\n## d\n";
        assert_eq!(build_index(text), build_index(text));
    }

    #[test]
    fn test_empty_document() {
        assert!(build_index("").is_empty());
    }

    #[test]
    fn test_crlf_lines_index_without_carriage_return() {
        let index = build_index("# Title\r\n- item\r\n");
        assert_eq!(index.get("Title"), Some(LineSpan::single(0)));
        assert_eq!(index.get("item"), Some(LineSpan::single(1)));
    }

    #[test]
    fn test_index_snapshot() {
        let index = build_index("# Plan\n- **ship** it\n  - write [docs](d.md)\n- `test`\n");
        insta::assert_yaml_snapshot!(index.entries(), @r#"
        Plan:
          start_line: 0
          end_line: 0
        ship it:
          start_line: 1
          end_line: 1
        test:
          start_line: 3
          end_line: 3
        write docs:
          start_line: 2
          end_line: 2
        "#);
    }
}
