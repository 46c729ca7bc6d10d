//! Shared combinators for the Cypher front end.

use nom::{
    bytes::complete::{take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{opt, recognize},
    error::ParseError,
    sequence::delimited,
    IResult, Parser,
};

/// Whitespace-handling combinator.
pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn parse_identifier<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize((
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// Signed integer literal.
pub fn parse_integer<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, i64, E> {
    let (rest, text) = recognize((opt(char('-')), digit1)).parse(input)?;
    match text.parse::<i64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(E::from_error_kind(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Single-quoted string literal; returns the inner slice.
pub fn parse_string_literal<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    delimited(char('\''), take_until("'"), char('\'')).parse(input)
}

/// Case-insensitive keyword that must not run into a following identifier
/// character (so `MATCHED` does not parse as `MATCH`).
pub fn keyword<'a, E: ParseError<&'a str>>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = E> {
    move |input: &'a str| {
        let (rest, matched) = nom::bytes::complete::tag_no_case::<_, _, E>(kw).parse(input)?;
        if rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(nom::Err::Error(E::from_error_kind(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        Ok((rest, matched))
    }
}

/// Strip line (`--`, `//`) and block (`/* */`) comments, preserving quoted
/// strings. Run before parsing; the parsers themselves never see comments.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        if in_string {
            result.push(ch);
            if ch == '\'' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '\'' => {
                in_string = true;
                result.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::error::Error;

    #[test]
    fn test_identifier() {
        let (rest, id) = parse_identifier::<Error<&str>>("works_at ").unwrap();
        assert_eq!(id, "works_at");
        assert_eq!(rest, " ");
        let (_, id) = parse_identifier::<Error<&str>>("_x9").unwrap();
        assert_eq!(id, "_x9");
        assert!(parse_identifier::<Error<&str>>("9x").is_err());
    }

    #[test]
    fn test_integer() {
        let (_, n) = parse_integer::<Error<&str>>("-42").unwrap();
        assert_eq!(n, -42);
        let (rest, n) = parse_integer::<Error<&str>>("17)").unwrap();
        assert_eq!(n, 17);
        assert_eq!(rest, ")");
    }

    #[test]
    fn test_string_literal() {
        let (_, s) = parse_string_literal::<Error<&str>>("'Batman'").unwrap();
        assert_eq!(s, "Batman");
    }

    #[test]
    fn test_keyword_boundary() {
        let mut match_kw = keyword::<Error<&str>>("MATCH");
        assert!(match_kw.parse("MATCH (n)").is_ok());
        assert!(match_kw.parse("match (n)").is_ok());
        assert!(match_kw.parse("MATCHED").is_err());
    }

    #[test]
    fn test_strip_comments() {
        let stripped = strip_comments("MATCH (n:Person) -- find people\nRETURN n.pid AS pid");
        assert_eq!(stripped, "MATCH (n:Person) \nRETURN n.pid AS pid");
        let stripped = strip_comments("MATCH /* block */ (n:Person) RETURN n.pid AS pid");
        assert_eq!(stripped, "MATCH  (n:Person) RETURN n.pid AS pid");
        // Comment markers inside strings are preserved.
        let stripped = strip_comments("WHERE n.name = 'a--b'");
        assert_eq!(stripped, "WHERE n.name = 'a--b'");
    }
}
