use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Ordered inline markup rewrites: bold, italic, code span, then link label.
///
/// Underscore emphasis only counts at word boundaries, so `snake_case` is left
/// alone the same way the markdown parser leaves it.
fn rewrites() -> &'static [(Regex, &'static str); 6] {
    static REWRITES: OnceLock<[(Regex, &'static str); 6]> = OnceLock::new();
    REWRITES.get_or_init(|| {
        [
            (
                Regex::new(r"\*\*(.+?)\*\*").expect("Invalid bold regex"),
                "$1",
            ),
            (
                Regex::new(r"(^|\W)__(.+?)__($|\W)").expect("Invalid underscore bold regex"),
                "${1}${2}${3}",
            ),
            (Regex::new(r"\*(.+?)\*").expect("Invalid italic regex"), "$1"),
            (
                Regex::new(r"(^|\W)_(.+?)_($|\W)").expect("Invalid underscore italic regex"),
                "${1}${2}${3}",
            ),
            (Regex::new(r"`(.+?)`").expect("Invalid code regex"), "$1"),
            (
                Regex::new(r"\[(.+?)\]\(.+?\)").expect("Invalid link regex"),
                "$1",
            ),
        ]
    })
}

/// Strip inline markup from a line's visible text to get its comparison key.
///
/// Emphasis markers and code delimiters are dropped, `[label](target)` collapses
/// to `label`, and surrounding whitespace is trimmed. The rewrites are repeated
/// until the text stops changing, so `normalize(normalize(s)) == normalize(s)`.
/// Every rewrite removes characters, which bounds the loop.
pub fn normalize(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = strip_once(&current);
        let next = next.trim();
        if next == current {
            return current;
        }
        current = next.to_string();
    }
}

fn strip_once(text: &str) -> String {
    let mut out = Cow::Borrowed(text);
    for (regex, replacement) in rewrites() {
        if let Cow::Owned(replaced) = regex.replace_all(&out, *replacement) {
            out = Cow::Owned(replaced);
        }
    }
    out.into_owned()
}
