//! MarkdownV2 escaping
//!
//! Telegram's MarkdownV2 parse mode rejects messages containing unescaped
//! reserved characters, so every interpolated value goes through
//! [`escape_markdown`] before rendering.

/// Escape MarkdownV2 special characters in user- or database-provided text.
pub fn escape_markdown(text: &str) -> String {
    const RESERVED: &[char] = &[
        '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}',
        '.', '!',
    ];

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*bold*"), r"\*bold\*");
        assert_eq!(escape_markdown("a.b!c"), r"a\.b\!c");
        assert_eq!(escape_markdown("۱۴۰۴/۱۰/۱۵"), "۱۴۰۴/۱۰/۱۵");
        assert_eq!(escape_markdown(""), "");
    }

    #[test]
    fn test_backslash_is_escaped_first() {
        assert_eq!(escape_markdown(r"a\b"), r"a\\b");
    }
}
