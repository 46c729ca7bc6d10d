use nom::error::{ContextError, ParseError};
use nom::IResult;
use std::fmt;
use thiserror::Error;

/// Accumulating nom error: each entry is the remaining input at the point of
/// failure plus a static context message.
#[derive(Debug, PartialEq)]
pub struct CypherParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

pub type PResult<'a, O> = IResult<&'a str, O, CypherParsingError<'a>>;

impl<'a> ParseError<&'a str> for CypherParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        CypherParsingError {
            errors: vec![(input, "unexpected input")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unexpected input"));
        other
    }
}

impl<'a> ContextError<&'a str> for CypherParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for CypherParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for CypherParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        CypherParsingError {
            errors: vec![(err.input, "unable to parse")],
        }
    }
}

/// Context message prefix marking a recognized-but-unsupported construct.
pub const UNSUPPORTED_PREFIX: &str = "unsupported:";

/// Public parse error with a byte offset into the (comment-stripped) input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CypherParseError {
    #[error("Cypher syntax error at offset {offset}: {expected}")]
    Syntax { offset: usize, expected: String },
    #[error("Cypher feature not supported: {feature}")]
    NotSupported { feature: String },
}

impl CypherParseError {
    /// Convert an internal parsing error, resolving offsets against the
    /// original input string.
    pub fn from_parsing_error(base: &str, err: &CypherParsingError<'_>) -> Self {
        for (_, ctx) in &err.errors {
            if let Some(feature) = ctx.strip_prefix(UNSUPPORTED_PREFIX) {
                return CypherParseError::NotSupported {
                    feature: feature.trim().to_string(),
                };
            }
        }
        let (rest, expected) = err
            .errors
            .last()
            .copied()
            .unwrap_or(("", "unexpected end of input"));
        CypherParseError::Syntax {
            offset: offset_in(base, rest),
            expected: expected.to_string(),
        }
    }
}

/// Byte offset of `rest` inside `base`; falls back to the end of input when
/// `rest` is not a suffix of `base`.
pub(crate) fn offset_in(base: &str, rest: &str) -> usize {
    let base_ptr = base.as_ptr() as usize;
    let rest_ptr = rest.as_ptr() as usize;
    if rest_ptr >= base_ptr && rest_ptr <= base_ptr + base.len() {
        rest_ptr - base_ptr
    } else {
        base.len()
    }
}
