//! README normalisation.
//!
//! Turns raw markdown into a lowercase, space-separated bag of plain words:
//! bracketed content, links and other markup noise are removed, everything
//! outside `[a-z0-9 ]` is dropped, and short words are discarded.

use regex::Regex;
use std::sync::LazyLock;

/// Delimiter pairs whose enclosed content is removed, in this order
pub const BRACKETS: [(&str, &str); 4] = [("[", "]"), ("<", ">"), ("{", "}"), ("(http", ")")];

/// Words that are links, git references, e-mail addresses, paths or other
/// markup residue
static NOISE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.?http|.?git|.*@|.?[!;]|.*\\|.*[/:|$*#()])").expect("valid noise pattern")
});

/// Cleans README text. Absent text yields an empty string.
pub fn tokenize(text: Option<&str>, min_length: usize) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let line: String = text
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '"' | '\'' | '`'))
        .collect::<String>()
        .to_lowercase();

    let line = remove_bracketed(&line, &BRACKETS);

    let line = line
        .split_whitespace()
        .filter(|word| !NOISE_WORD.is_match(word))
        .collect::<Vec<_>>()
        .join(" ");

    let kept: String = line
        .chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .filter(|c| *c == ' ' || c.is_ascii_digit() || c.is_ascii_lowercase())
        .collect();

    kept.split_whitespace()
        .filter(|word| word.len() >= min_length)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes bracketed spans from `line`.
///
/// For each pair, while both delimiters occur: if the first closing delimiter
/// precedes the first opening one, every occurrence of both is treated as
/// stray and replaced by a space; otherwise the span from the opening
/// delimiter through the first closing delimiter is cut out.
pub fn remove_bracketed(line: &str, brackets: &[(&str, &str)]) -> String {
    let mut line = line.to_string();

    for (open, close) in brackets {
        while let (Some(start), Some(end)) = (line.find(open), line.find(close)) {
            if start > end {
                line = line.replace(open, " ").replace(close, " ");
            } else {
                line.replace_range(start..end + close.len(), "");
            }
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_markup_and_short_words_removed() {
        let out = tokenize(
            Some("Check http://x.com and <b>bold</b> [ignored] now"),
            3,
        );
        assert!(!out.contains("http"));
        assert!(!out.contains("ignored"));
        assert!(!out.contains('<'));
        assert!(out.split(' ').all(|w| w.len() >= 3));
        assert_eq!(out, "check and bold now");
    }

    #[test]
    fn test_absent_text_is_empty() {
        assert_eq!(tokenize(None, 3), "");
        assert_eq!(tokenize(Some(""), 3), "");
    }

    #[test]
    fn test_markdown_link_target_removed() {
        let out = tokenize(Some("See the [docs](https://docs.rs/crate) for details"), 3);
        assert_eq!(out, "see the for details");
    }

    #[test]
    fn test_inverted_brackets_are_stray() {
        assert_eq!(remove_bracketed("a ] b [ c", &[("[", "]")]), "a   b   c");
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(remove_bracketed("x {a {b} c} y", &[("{", "}")]), "x  c} y");
    }

    #[test]
    fn test_noise_words_dropped() {
        let out = tokenize(
            Some("mail me@example.org clone git://host/repo !important path/to/file C:\\dir plain"),
            3,
        );
        assert_eq!(out, "mail clone plain");
    }

    #[test]
    fn test_non_ascii_and_punctuation() {
        let out = tokenize(Some("Café-au-lait, naïve résumé! Version 2.0"), 2);
        assert_eq!(out, "caf aulait na ve sum version 20");
    }

    #[test]
    fn test_quotes_are_stripped() {
        assert_eq!(tokenize(Some("\"don't\" `code`"), 3), "dont code");
    }
}
