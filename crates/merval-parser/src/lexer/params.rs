//! Quote-aware comma-separated parameter lists.
//!
//! Used for C4 constructor arguments, sankey rows and any other field list
//! where a value may itself contain commas.

use thiserror::Error;
use winnow::{
    Parser,
    combinator::{alt, cut_err, preceded, repeat, separated, terminated},
    error::ModalResult,
    token::{any, none_of},
};

/// The parameter list could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unterminated quote in parameter list at byte {offset}")]
pub struct ParamsError {
    /// Byte offset into the input where tokenizing stopped.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Quoted(String),
    Plain(String),
}

fn push_char(mut text: String, c: char) -> String {
    text.push(c);
    text
}

/// `"..."` with backslash escapes; the surrounding quotes are dropped.
fn quoted(input: &mut &str) -> ModalResult<String> {
    preceded(
        '"',
        cut_err(terminated(
            repeat(0.., alt((preceded('\\', any), none_of(['"', '\\']))))
                .fold(String::new, push_char),
            '"',
        )),
    )
    .parse_next(input)
}

/// Unquoted run up to the next comma or quote.
fn plain(input: &mut &str) -> ModalResult<String> {
    repeat(1.., alt((preceded('\\', any), none_of([',', '"', '\\']))))
        .fold(String::new, push_char)
        .parse_next(input)
}

fn field(input: &mut &str) -> ModalResult<String> {
    repeat(
        0..,
        alt((quoted.map(Segment::Quoted), plain.map(Segment::Plain))),
    )
    .map(assemble)
    .parse_next(input)
}

/// A field that is a single quoted string (give or take surrounding
/// whitespace) yields its inner text. Anything else is concatenated with
/// quotes kept, so `$descr="x"` survives for keyword parsing.
fn assemble(segments: Vec<Segment>) -> String {
    let mut significant = segments
        .iter()
        .filter(|segment| !matches!(segment, Segment::Plain(text) if text.trim().is_empty()));
    if let (Some(Segment::Quoted(inner)), None) = (significant.next(), significant.next()) {
        return inner.clone();
    }

    let mut out = String::new();
    for segment in &segments {
        match segment {
            Segment::Plain(text) => out.push_str(text),
            Segment::Quoted(text) => {
                out.push('"');
                out.push_str(text);
                out.push('"');
            }
        }
    }
    out.trim().to_string()
}

/// Split `input` on commas outside double quotes.
///
/// Order is preserved, one layer of surrounding quotes is stripped per
/// field, a backslash escapes the next character and fields are trimmed.
/// Blank input yields no fields.
///
/// ```
/// # use merval_parser::lexer::split_params;
/// let fields = split_params(r#""a,b","c, d",e"#).unwrap();
/// assert_eq!(fields, ["a,b", "c, d", "e"]);
/// ```
pub fn split_params(input: &str) -> Result<Vec<String>, ParamsError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    separated(1.., field, ',')
        .parse(input)
        .map_err(|err| ParamsError {
            offset: err.offset(),
        })
}
