use regex::Regex;
use std::sync::OnceLock;

/// The single-line outline constructs that produce diagram nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// ATX heading, `level` is the length of the `#` run (1-6)
    Heading { level: u8 },
    /// Bullet list item using `-`, `*` or `+`
    ListItem { bullet: char, indent: usize },
}

/// A classified source line split into its untouched marker prefix and its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineLine<'a> {
    pub kind: LineKind,
    /// Marker run plus surrounding whitespace, e.g. `"## "` or `"  - "`
    pub prefix: &'a str,
    /// Everything after the prefix
    pub text: &'a str,
}

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("Invalid heading regex"))
}

fn list_item_regex() -> &'static Regex {
    static LIST_ITEM: OnceLock<Regex> = OnceLock::new();
    LIST_ITEM
        .get_or_init(|| Regex::new(r"^(\s*)([-*+])\s+(.+)$").expect("Invalid list item regex"))
}

/// Classify one line (without its trailing newline). Headings take precedence.
pub fn classify(line: &str) -> Option<OutlineLine<'_>> {
    if let Some(caps) = heading_regex().captures(line) {
        let hashes = caps.get(1)?;
        let text = caps.get(2)?;
        return Some(OutlineLine {
            kind: LineKind::Heading {
                level: hashes.as_str().len() as u8,
            },
            prefix: &line[..text.start()],
            text: text.as_str(),
        });
    }

    let caps = list_item_regex().captures(line)?;
    let indent = caps.get(1)?;
    let bullet = caps.get(2)?.as_str().chars().next()?;
    let text = caps.get(3)?;
    Some(OutlineLine {
        kind: LineKind::ListItem {
            bullet,
            indent: indent.as_str().len(),
        },
        prefix: &line[..text.start()],
        text: text.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# Title", 1, "# ", "Title")]
    #[case("###   Spaced", 3, "###   ", "Spaced")]
    #[case("###### Six", 6, "###### ", "Six")]
    fn test_classify_heading(
        #[case] line: &str,
        #[case] level: u8,
        #[case] prefix: &str,
        #[case] text: &str,
    ) {
        let classified = classify(line).unwrap();
        assert_eq!(classified.kind, LineKind::Heading { level });
        assert_eq!(classified.prefix, prefix);
        assert_eq!(classified.text, text);
    }

    #[rstest]
    #[case("- item", '-', 0, "- ", "item")]
    #[case("  * nested", '*', 2, "  * ", "nested")]
    #[case("\t+ tabbed", '+', 1, "\t+ ", "tabbed")]
    fn test_classify_list_item(
        #[case] line: &str,
        #[case] bullet: char,
        #[case] indent: usize,
        #[case] prefix: &str,
        #[case] text: &str,
    ) {
        let classified = classify(line).unwrap();
        assert_eq!(classified.kind, LineKind::ListItem { bullet, indent });
        assert_eq!(classified.prefix, prefix);
        assert_eq!(classified.text, text);
    }

    #[rstest]
    #[case("")]
    #[case("Plain paragraph")]
    #[case("####### seven hashes")]
    #[case("#no-space")]
    #[case("-no-space")]
    #[case("- ")]
    #[case("**bold** paragraph")]
    #[case("1. numbered")]
    fn test_classify_ignores_other_lines(#[case] line: &str) {
        assert_eq!(classify(line), None);
    }
}
