/// Maximum number of characters kept from a thought.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Appended to content cut at [`MAX_CONTENT_CHARS`].
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Normalize raw thought text before it is scored or stored.
///
/// Line endings are unified to `\n`, non-whitespace control characters are
/// dropped, every whitespace run (newlines included) becomes a single space,
/// the ends are trimmed, and anything past [`MAX_CONTENT_CHARS`] is cut and
/// marked. Applying it twice yields the same string.
pub fn sanitize_content(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let printable: String = normalized
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let collapsed = printable.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_CONTENT_CHARS {
        let mut truncated: String = collapsed.chars().take(MAX_CONTENT_CHARS).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(sanitize_content("  a \t b\n\n c  "), "a b c");
    }

    #[test]
    fn test_line_endings_do_not_survive_collapse() {
        assert_eq!(sanitize_content("one\r\ntwo\rthree\nfour"), "one two three four");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize_content("a\u{0}b\u{7}c\u{7f}d"), "abcd");
    }

    #[test]
    fn test_control_between_spaces_leaves_single_space() {
        assert_eq!(sanitize_content("a \u{1} b"), "a b");
    }

    #[test]
    fn test_truncates_long_content() {
        let raw = "x".repeat(MAX_CONTENT_CHARS + 50);
        let sanitized = sanitize_content(&raw);
        assert!(sanitized.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            sanitized.chars().count(),
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_exact_limit_not_truncated() {
        let raw = "y".repeat(MAX_CONTENT_CHARS);
        assert_eq!(sanitize_content(&raw), raw);
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(sanitize_content(" \n\t \r\n "), "");
    }

    #[test]
    fn test_idempotent() {
        let long = format!("{} tail", "word ".repeat(3000));
        let samples = [
            "plain",
            "  spaced \t out \n lines ",
            "ctrl\u{1}chars\u{1b} here",
            "a \u{2} b",
            long.as_str(),
        ];
        for raw in samples {
            let once = sanitize_content(raw);
            assert_eq!(sanitize_content(&once), once);
        }
    }

    #[test]
    fn test_multibyte_characters_preserved() {
        assert_eq!(sanitize_content("  café   ∑ 🌿 "), "café ∑ 🌿");
    }
}
