use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static LINE_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)//.*?$").expect("valid regex"));

static BLOCK_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// Remove `//` and `/* ... */` comments. Used where a pattern inside a
/// comment must not count as real code (e.g. a commented-out `require`).
pub fn strip_comments(text: &str) -> String {
    let without_line: Cow<'_, str> = LINE_COMMENT_RE.replace_all(text, "");
    BLOCK_COMMENT_RE.replace_all(&without_line, "").into_owned()
}

/// 1-based line of a character offset within `text`.
pub fn line_at_offset(text: &str, offset: usize) -> usize {
    let clamped = offset.min(text.len());
    text[..clamped].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_comments() {
        let body = "value = 1; // require(false)\nother = 2;";
        let stripped = strip_comments(body);
        assert!(!stripped.contains("require"));
        assert!(stripped.contains("other = 2;"));
    }

    #[test]
    fn test_strip_block_comments() {
        let body = "a = 1;\n/* require(x > 0);\n   assert(y); */\nb = 2;";
        let stripped = strip_comments(body);
        assert!(!stripped.contains("require"));
        assert!(!stripped.contains("assert"));
        assert!(stripped.contains("b = 2;"));
    }

    #[test]
    fn test_line_at_offset() {
        let text = "one\ntwo\nthree";
        assert_eq!(line_at_offset(text, 0), 1);
        assert_eq!(line_at_offset(text, 5), 2);
        assert_eq!(line_at_offset(text, text.len()), 3);
    }
}
