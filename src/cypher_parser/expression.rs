//! Expression and predicate parsers.
//!
//! Predicate precedence, loosest first: `OR` < `AND` < `NOT` < comparison.
//! Comparisons do not nest; their operands are plain expressions.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{cut, map},
    error::context,
    Parser,
};

use super::ast::{AggregateFn, ComparisonOp, Expression, Predicate, PropertyAccess};
use super::common::{keyword, parse_identifier, parse_integer, parse_string_literal, ws};
use super::errors::{CypherParsingError, PResult};

pub fn parse_expression(input: &str) -> PResult<'_, Expression<'_>> {
    alt((
        parse_aggregate,
        map(char('*'), |_| Expression::Star),
        map(parse_integer, Expression::Integer),
        map(parse_string_literal, Expression::Str),
        parse_property_access,
    ))
    .parse(input)
}

/// `AGG(expr)` with a case-insensitive aggregate name. A non-aggregate name
/// followed by `(` is rejected here so it surfaces as a parse error rather
/// than silently matching the property parser.
fn parse_aggregate(input: &str) -> PResult<'_, Expression<'_>> {
    let (rest, name) = parse_identifier(input)?;
    let (rest, _) = ws(char('(')).parse(rest)?;
    let Some(func) = AggregateFn::from_name(name) else {
        return Err(nom::Err::Error(CypherParsingError {
            errors: vec![(input, "unknown function name")],
        }));
    };
    let (rest, arg) = context("expected aggregate argument", cut(ws(parse_expression)))
        .parse(rest)?;
    let (rest, _) = context("expected closing parenthesis", cut(char(')'))).parse(rest)?;
    Ok((
        rest,
        Expression::Aggregate {
            func,
            arg: Box::new(arg),
        },
    ))
}

fn parse_property_access(input: &str) -> PResult<'_, Expression<'_>> {
    let (rest, var) = parse_identifier(input)?;
    let (rest, _) = char('.').parse(rest)?;
    let (rest, key) = context("expected property name", cut(parse_identifier)).parse(rest)?;
    Ok((rest, Expression::Property(PropertyAccess { var, key })))
}

pub fn parse_comparison_op(input: &str) -> PResult<'_, ComparisonOp> {
    // Longest operators first so `<=` is not read as `<`.
    alt((
        map(tag("<="), |_| ComparisonOp::Lte),
        map(tag(">="), |_| ComparisonOp::Gte),
        map(tag("<>"), |_| ComparisonOp::Neq),
        map(tag("="), |_| ComparisonOp::Eq),
        map(tag("<"), |_| ComparisonOp::Lt),
        map(tag(">"), |_| ComparisonOp::Gt),
    ))
    .parse(input)
}

pub fn parse_predicate(input: &str) -> PResult<'_, Predicate<'_>> {
    parse_or(input)
}

fn parse_or(input: &str) -> PResult<'_, Predicate<'_>> {
    let (mut rest, mut acc) = parse_and(input)?;
    loop {
        match ws(keyword::<CypherParsingError>("OR")).parse(rest) {
            Ok((after_kw, _)) => {
                let (after, right) =
                    context("expected predicate after OR", cut(parse_and)).parse(after_kw)?;
                acc = Predicate::Or(Box::new(acc), Box::new(right));
                rest = after;
            }
            Err(_) => return Ok((rest, acc)),
        }
    }
}

fn parse_and(input: &str) -> PResult<'_, Predicate<'_>> {
    let (mut rest, mut acc) = parse_unary(input)?;
    loop {
        match ws(keyword::<CypherParsingError>("AND")).parse(rest) {
            Ok((after_kw, _)) => {
                let (after, right) =
                    context("expected predicate after AND", cut(parse_unary)).parse(after_kw)?;
                acc = Predicate::And(Box::new(acc), Box::new(right));
                rest = after;
            }
            Err(_) => return Ok((rest, acc)),
        }
    }
}

fn parse_unary(input: &str) -> PResult<'_, Predicate<'_>> {
    if let Ok((rest, _)) = ws(keyword::<CypherParsingError>("NOT")).parse(input) {
        let (rest, sub) =
            context("expected predicate after NOT", cut(parse_unary)).parse(rest)?;
        return Ok((rest, Predicate::Not(Box::new(sub))));
    }
    if let Ok((rest, _)) = ws(char::<_, CypherParsingError>('(')).parse(input) {
        let (rest, inner) = parse_predicate(rest)?;
        let (rest, _) =
            context("expected closing parenthesis", cut(ws(char(')')))).parse(rest)?;
        return Ok((rest, inner));
    }
    parse_comparison(input)
}

fn parse_comparison(input: &str) -> PResult<'_, Predicate<'_>> {
    let (rest, left) = ws(parse_expression).parse(input)?;
    let (rest, op) = context("expected comparison operator", parse_comparison_op).parse(rest)?;
    let (rest, right) = context("expected right-hand expression", cut(ws(parse_expression)))
        .parse(rest)?;
    Ok((rest, Predicate::Comparison { left, op, right }))
}
