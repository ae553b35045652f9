//! Line model shared by every diagram parser.
//!
//! Diagram languages in this family are line oriented: a construct never
//! spans lines except through explicit open/close markers. [`Source`]
//! splits the input once, drops blank lines, `%%` comments and a leading
//! `---` front-matter block, and records the absolute position of each
//! remaining line so parsers never do offset arithmetic themselves.

mod params;

pub use params::split_params;

use merval_core::position::Position;
use winnow::{Parser, ascii::float, error::ModalResult};

use crate::error::{ErrorCode, ParseError, Result};

/// A significant (non-blank, non-comment) source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Absolute 1-indexed line number, caller offset included.
    pub number: usize,
    /// 1-indexed column of the first non-whitespace character.
    pub column: usize,
    /// Indentation width (spaces count 1, tabs count 2).
    pub indent: usize,
    /// The line as written.
    pub raw: &'a str,
    /// The line with surrounding whitespace removed.
    pub text: &'a str,
}

impl<'a> SourceLine<'a> {
    fn new(number: usize, raw: &'a str) -> Self {
        let text = raw.trim();
        let leading = raw.len() - raw.trim_start().len();
        Self {
            number,
            column: raw[..leading].chars().count() + 1,
            indent: leading_indent_width(raw),
            raw,
            text,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.number, self.column)
    }

    /// A syntax error pointing at this line.
    pub fn syntax_error(&self, code: ErrorCode, message: impl Into<String>) -> ParseError {
        ParseError::syntax(code, self.position(), self.text, message)
    }

    pub fn structural_error(&self, code: ErrorCode, message: impl Into<String>) -> ParseError {
        ParseError::structural(code, self.position(), message)
    }
}

/// Diagram source split into significant lines.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    text: &'a str,
    offset: usize,
    lines: Vec<SourceLine<'a>>,
}

impl<'a> Source<'a> {
    /// Split `text`, numbering lines from `offset + 1`.
    pub fn new(text: &'a str, offset: usize) -> Self {
        let mut lines = Vec::new();
        let mut in_front_matter = false;
        let mut seen_content = false;

        for (index, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed == "---" && (in_front_matter || !seen_content) {
                in_front_matter = !in_front_matter;
                seen_content = true;
                continue;
            }
            if in_front_matter || trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }
            seen_content = true;
            lines.push(SourceLine::new(offset + index + 1, raw));
        }

        Self {
            text,
            offset,
            lines,
        }
    }

    /// The complete, unmodified input.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// First significant line, if any.
    pub fn header(&self) -> Option<&SourceLine<'a>> {
        self.lines.first()
    }

    /// Significant lines after the header.
    pub fn body(&self) -> &[SourceLine<'a>] {
        self.lines.get(1..).unwrap_or(&[])
    }

    /// The header line, or an `E001` error for input with no content.
    pub fn require_header(&self) -> Result<&SourceLine<'a>> {
        self.header().ok_or_else(|| {
            ParseError::header(
                ErrorCode::E001,
                Position::new(self.offset + 1, 1),
                "diagram source has no header line",
            )
        })
    }

    /// Check the header starts with `keyword` and return what follows it.
    pub fn expect_header(&self, keyword: &'static str) -> Result<(&SourceLine<'a>, &'a str)> {
        self.expect_header_any(&[keyword])
            .map(|(line, _, rest)| (line, rest))
    }

    /// Check the header starts with one of `keywords` (matched in order).
    pub fn expect_header_any(
        &self,
        keywords: &[&'static str],
    ) -> Result<(&SourceLine<'a>, &'static str, &'a str)> {
        let header = self.require_header()?;
        keywords
            .iter()
            .find_map(|keyword| {
                strip_keyword(header.text, keyword).map(|rest| (header, *keyword, rest))
            })
            .ok_or_else(|| {
                ParseError::header(
                    ErrorCode::E002,
                    header.position(),
                    format!(
                        "expected `{}` header, found `{}`",
                        keywords.join("` or `"),
                        header.text
                    ),
                )
            })
    }
}

/// Strip a leading keyword that ends at whitespace, `:` or end of text.
///
/// Returns the remainder with leading whitespace removed.
pub fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        _ => None,
    }
}

/// Like [`strip_keyword`] but also accepts a `:` right after the keyword.
pub fn strip_keyword_colon<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(':') => Some(rest[1..].trim_start()),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        _ => None,
    }
}

/// Split `text` at the first `:` outside double quotes.
pub fn split_label(text: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (index, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                return (text[..index].trim_end(), Some(text[index + 1..].trim()));
            }
            _ => {}
        }
    }
    (text, None)
}

/// Remove one layer of surrounding double quotes, if present.
pub fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// `Some(text)` unless the text is empty.
pub fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Identifier token: alphanumerics plus `_`, `-` and `.`.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Split on whitespace outside double quotes. Quotes are kept.
pub fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = None;
    let mut in_quotes = false;
    for (index, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c.is_whitespace() && !in_quotes {
            if let Some(begin) = start.take() {
                words.push(&text[begin..index]);
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        words.push(&text[begin..]);
    }
    words
}

fn number(input: &mut &str) -> ModalResult<f64> {
    float.parse_next(input)
}

/// Parse a finite decimal number, ignoring surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    number
        .parse(text.trim())
        .ok()
        .filter(|value| value.is_finite())
}

pub fn leading_indent_width(line: &str) -> usize {
    let mut width = 0_usize;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 2,
            _ => break,
        }
    }
    width
}

/// Byte index of the first `pattern` outside double quotes and outside
/// `[]`, `()` or `{}` brackets.
pub fn find_unquoted(text: &str, pattern: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut depth = 0_usize;
    for (index, c) in text.char_indices() {
        if !in_quotes && depth == 0 && text[index..].starts_with(pattern) {
            return Some(index);
        }
        match c {
            '"' => in_quotes = !in_quotes,
            '[' | '(' | '{' if !in_quotes => depth += 1,
            ']' | ')' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Split a line into `;`-separated statements. A `;` inside quotes or a
/// bracketed label does not end a statement.
pub fn split_statements(line: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(line);
    std::iter::from_fn(move || {
        loop {
            let text = rest?;
            let (segment, remainder) = match find_unquoted(text, ";") {
                Some(index) => (&text[..index], Some(&text[index + 1..])),
                None => (text, None),
            };
            rest = remainder;
            let segment = segment.trim();
            if !segment.is_empty() {
                return Some(segment);
            }
        }
    })
}

fn is_comment(line: &str) -> bool {
    line.starts_with("%%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_skips_blank_and_comments() {
        let source = Source::new("\n%% note\nclassDiagram\n\n  class A\n", 0);

        let header = source.header().unwrap();
        assert_eq!(header.text, "classDiagram");
        assert_eq!(header.number, 3);
        assert_eq!(source.body().len(), 1);
        assert_eq!(source.body()[0].position(), Position::new(5, 3));
    }

    #[test]
    fn test_source_applies_offset() {
        let source = Source::new("pie\n\"a\": 1", 10);

        assert_eq!(source.header().unwrap().number, 11);
        assert_eq!(source.body()[0].number, 12);
    }

    #[test]
    fn test_source_skips_front_matter() {
        let source = Source::new("---\ntitle: x\n---\nflowchart LR\nA --> B", 0);

        assert_eq!(source.header().unwrap().text, "flowchart LR");
        assert_eq!(source.header().unwrap().number, 4);
    }

    #[test]
    fn test_require_header_on_empty_input() {
        let source = Source::new("  \n%% only a comment\n", 3);

        let err = source.require_header().unwrap_err();
        assert_eq!(err.code(), ErrorCode::E001);
        assert_eq!(err.position(), Position::new(4, 1));
    }

    #[test]
    fn test_expect_header_word_boundary() {
        let source = Source::new("classDiagram-v2", 0);

        let err = source.expect_header("classDiagram").unwrap_err();
        assert_eq!(err.code(), ErrorCode::E002);
    }

    #[test]
    fn test_strip_keyword() {
        assert_eq!(strip_keyword("title Hello", "title"), Some("Hello"));
        assert_eq!(strip_keyword("title", "title"), Some(""));
        assert_eq!(strip_keyword("titles", "title"), None);
        assert_eq!(strip_keyword_colon("commit: x", "commit"), Some("x"));
    }

    #[test]
    fn test_split_label_ignores_quoted_colon() {
        assert_eq!(split_label(r#"A "x:y" : lbl"#), (r#"A "x:y""#, Some("lbl")));
        assert_eq!(split_label("A --> B"), ("A --> B", None));
    }

    #[test]
    fn test_split_words_keeps_quoted_runs() {
        assert_eq!(
            split_words(r#"A "1" *-- "many" B"#),
            ["A", "\"1\"", "*--", "\"many\"", "B"]
        );
        assert_eq!(split_words(r#"x "a b" y"#), ["x", "\"a b\"", "y"]);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("0.01"), Some(0.01));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_leading_indent_width() {
        assert_eq!(leading_indent_width("    root"), 4);
        assert_eq!(leading_indent_width("\t\tchild"), 4);
        assert_eq!(leading_indent_width("x"), 0);
    }

    #[test]
    fn test_split_statements() {
        let parts: Vec<_> = split_statements("A --> B; B --> C;").collect();
        assert_eq!(parts, ["A --> B", "B --> C"]);
    }

    #[test]
    fn test_split_statements_keeps_quoted_semicolons() {
        let parts: Vec<_> = split_statements(r##"A["#quot;hi#quot;"] --> B; C"##).collect();
        assert_eq!(parts, [r##"A["#quot;hi#quot;"] --> B"##, "C"]);

        let parts: Vec<_> = split_statements("A[a;b] --> B").collect();
        assert_eq!(parts, ["A[a;b] --> B"]);
    }

    #[test]
    fn test_find_unquoted() {
        assert_eq!(find_unquoted(r#"A["x --> y"] --> B"#, "-->"), Some(13));
        assert_eq!(find_unquoted("A(x --> y) --> B", "-->"), Some(11));
        assert_eq!(find_unquoted(r#""a;b""#, ";"), None);
        assert_eq!(find_unquoted("a;b", ";"), Some(1));
    }
}
