use nom::error::{ContextError, ParseError};
use nom::IResult;
use std::fmt;
use thiserror::Error;

/// Accumulating nom error for the SQL front end.
#[derive(Debug, PartialEq)]
pub struct SqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

pub type SResult<'a, O> = IResult<&'a str, O, SqlParsingError<'a>>;

impl<'a> ParseError<&'a str> for SqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        SqlParsingError {
            errors: vec![(input, "unexpected input")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unexpected input"));
        other
    }
}

impl<'a> ContextError<&'a str> for SqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for SqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {}", ctx, input)?;
        }
        Ok(())
    }
}

/// Public parse error with a byte offset into the (comment-stripped) input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlParseError {
    #[error("SQL syntax error at offset {offset}: {expected}")]
    Syntax { offset: usize, expected: String },
}

impl SqlParseError {
    pub fn from_parsing_error(base: &str, err: &SqlParsingError<'_>) -> Self {
        let (rest, expected) = err
            .errors
            .last()
            .copied()
            .unwrap_or(("", "unexpected end of input"));
        SqlParseError::Syntax {
            offset: offset_in(base, rest),
            expected: expected.to_string(),
        }
    }
}

pub(crate) fn offset_in(base: &str, rest: &str) -> usize {
    let base_ptr = base.as_ptr() as usize;
    let rest_ptr = rest.as_ptr() as usize;
    if rest_ptr >= base_ptr && rest_ptr <= base_ptr + base.len() {
        rest_ptr - base_ptr
    } else {
        base.len()
    }
}
