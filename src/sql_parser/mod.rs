//! Parser for the supported SQL subset: SELECT / FROM / INNER and LEFT JOIN
//! / WHERE / GROUP BY / HAVING / ORDER BY / UNION [ALL] plus WITH-style
//! CTEs. Strict by design; anything outside the subset is a parse error.

pub mod ast;
pub(crate) mod errors;
mod lower;

pub use errors::SqlParseError;
pub use lower::lower;

use lazy_static::lazy_static;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, opt, recognize},
    error::context,
    multi::{many0, separated_list1},
    sequence::delimited,
    Parser,
};
use std::collections::HashSet;

use crate::sql_ir::{AggregateFn, CastType, CompareOp, JoinKind, Sql, SqlExpr, SqlPred};
use ast::{Cte, JoinSpec, OrderSpec, SelectBody, SelectCore, SelectItem, SelectStatement, TableRef};
use errors::{offset_in, SResult, SqlParsingError};

lazy_static! {
    /// Words that cannot be used as implicit aliases or bare identifiers.
    static ref RESERVED: HashSet<&'static str> = [
        "SELECT", "FROM", "WHERE", "GROUP", "BY", "HAVING", "ORDER", "UNION", "ALL", "JOIN",
        "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "ON", "AS", "AND", "OR", "NOT",
        "ASC", "DESC", "WITH", "CAST", "NULL", "IS", "IN", "BETWEEN", "LIKE", "DISTINCT",
    ]
    .into_iter()
    .collect();
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = SqlParsingError<'a>>
where
    F: Parser<&'a str, Output = O, Error = SqlParsingError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> SResult<'_, &str> {
    use nom::bytes::complete::{take_while, take_while1};
    recognize((
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// Identifier that is not a reserved word.
fn plain_identifier(input: &str) -> SResult<'_, &str> {
    let (rest, id) = identifier(input)?;
    if RESERVED.contains(id.to_ascii_uppercase().as_str()) {
        return Err(nom::Err::Error(SqlParsingError {
            errors: vec![(input, "reserved word")],
        }));
    }
    Ok((rest, id))
}

fn keyword<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = SqlParsingError<'a>> {
    move |input: &'a str| {
        let (rest, matched) =
            nom::bytes::complete::tag_no_case::<_, _, SqlParsingError<'a>>(kw).parse(input)?;
        if rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(nom::Err::Error(SqlParsingError {
                errors: vec![(input, "keyword ran into identifier")],
            }));
        }
        Ok((rest, matched))
    }
}

fn integer(input: &str) -> SResult<'_, i64> {
    let (rest, text) = recognize((opt(char('-')), digit1)).parse(input)?;
    match text.parse::<i64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(SqlParsingError {
            errors: vec![(input, "integer out of range")],
        })),
    }
}

/// Single-quoted string literal; a doubled quote is an escaped quote.
fn string_literal(input: &str) -> SResult<'_, String> {
    let (mut rest, _) = char::<_, SqlParsingError>('\'').parse(input)?;
    let mut value = String::new();
    loop {
        match rest.find('\'') {
            Some(pos) => {
                value.push_str(&rest[..pos]);
                let after = &rest[pos + 1..];
                if let Some(stripped) = after.strip_prefix('\'') {
                    value.push('\'');
                    rest = stripped;
                } else {
                    return Ok((after, value));
                }
            }
            None => {
                return Err(nom::Err::Failure(SqlParsingError {
                    errors: vec![(input, "unterminated string literal")],
                }))
            }
        }
    }
}

// ---------------------------------------------------------------- expressions

fn parse_cast(input: &str) -> SResult<'_, SqlExpr> {
    let (rest, _) = keyword("CAST").parse(input)?;
    let (rest, _) = ws(char('(')).parse(rest)?;
    let (rest, expr) = context("expected expression in CAST", cut(parse_expr)).parse(rest)?;
    let (rest, _) = context("expected AS in CAST", cut(ws(keyword("AS")))).parse(rest)?;
    let (rest, ty_name) = context("expected cast type", cut(ws(identifier))).parse(rest)?;
    let Some(ty) = CastType::from_name(ty_name) else {
        return Err(nom::Err::Failure(SqlParsingError {
            errors: vec![(input, "unknown cast type")],
        }));
    };
    let (rest, _) = context("expected ')' after CAST", cut(ws(char(')')))).parse(rest)?;
    Ok((
        rest,
        SqlExpr::Cast {
            expr: Box::new(expr),
            ty,
        },
    ))
}

fn parse_aggregate(input: &str) -> SResult<'_, SqlExpr> {
    let (rest, name) = identifier(input)?;
    let (rest, _) = ws(char('(')).parse(rest)?;
    let Some(func) = AggregateFn::from_name(name) else {
        return Err(nom::Err::Error(SqlParsingError {
            errors: vec![(input, "unknown function name")],
        }));
    };
    let (rest, arg) = context(
        "expected aggregate argument",
        cut(alt((map(ws(char('*')), |_| SqlExpr::Star), ws(parse_expr)))),
    )
    .parse(rest)?;
    let (rest, _) = context("expected ')'", cut(ws(char(')')))).parse(rest)?;
    Ok((
        rest,
        SqlExpr::Aggregate {
            func,
            arg: Box::new(arg),
        },
    ))
}

fn parse_column(input: &str) -> SResult<'_, SqlExpr> {
    let (rest, first) = plain_identifier(input)?;
    if let Ok((after_dot, _)) = char::<_, SqlParsingError>('.').parse(rest) {
        let (rest, column) = context("expected column name", cut(identifier)).parse(after_dot)?;
        return Ok((
            rest,
            SqlExpr::Column {
                table: Some(first.to_string()),
                column: column.to_string(),
            },
        ));
    }
    Ok((
        rest,
        SqlExpr::Column {
            table: None,
            column: first.to_string(),
        },
    ))
}

pub(crate) fn parse_expr(input: &str) -> SResult<'_, SqlExpr> {
    alt((
        parse_cast,
        parse_aggregate,
        map(integer, SqlExpr::Number),
        map(string_literal, SqlExpr::StringLit),
        parse_column,
    ))
    .parse(input)
}

// ---------------------------------------------------------------- predicates

fn parse_compare_op(input: &str) -> SResult<'_, CompareOp> {
    alt((
        map(tag("<="), |_| CompareOp::Lte),
        map(tag(">="), |_| CompareOp::Gte),
        map(tag("<>"), |_| CompareOp::Neq),
        map(tag("!="), |_| CompareOp::Neq),
        map(tag("="), |_| CompareOp::Eq),
        map(tag("<"), |_| CompareOp::Lt),
        map(tag(">"), |_| CompareOp::Gt),
    ))
    .parse(input)
}

pub(crate) fn parse_pred(input: &str) -> SResult<'_, SqlPred> {
    parse_or(input)
}

fn parse_or(input: &str) -> SResult<'_, SqlPred> {
    let (mut rest, mut acc) = parse_and(input)?;
    while let Ok((after_kw, _)) = ws(keyword("OR")).parse(rest) {
        let (after, right) =
            context("expected predicate after OR", cut(parse_and)).parse(after_kw)?;
        acc = SqlPred::Or(Box::new(acc), Box::new(right));
        rest = after;
    }
    Ok((rest, acc))
}

fn parse_and(input: &str) -> SResult<'_, SqlPred> {
    let (mut rest, mut acc) = parse_unary_pred(input)?;
    while let Ok((after_kw, _)) = ws(keyword("AND")).parse(rest) {
        let (after, right) =
            context("expected predicate after AND", cut(parse_unary_pred)).parse(after_kw)?;
        acc = SqlPred::And(Box::new(acc), Box::new(right));
        rest = after;
    }
    Ok((rest, acc))
}

fn parse_unary_pred(input: &str) -> SResult<'_, SqlPred> {
    if let Ok((rest, _)) = ws(keyword("NOT")).parse(input) {
        let (rest, sub) =
            context("expected predicate after NOT", cut(parse_unary_pred)).parse(rest)?;
        return Ok((rest, SqlPred::Not(Box::new(sub))));
    }
    if let Ok((rest, _)) = ws(char::<_, SqlParsingError>('(')).parse(input) {
        let (rest, inner) = parse_pred(rest)?;
        let (rest, _) = context("expected ')'", cut(ws(char(')')))).parse(rest)?;
        return Ok((rest, inner));
    }
    let (rest, left) = ws(parse_expr).parse(input)?;
    let (rest, op) = context("expected comparison operator", parse_compare_op).parse(rest)?;
    let (rest, right) =
        context("expected right-hand expression", cut(ws(parse_expr))).parse(rest)?;
    Ok((rest, SqlPred::Compare { op, left, right }))
}

// ---------------------------------------------------------------- clauses

fn parse_table_ref(input: &str) -> SResult<'_, TableRef> {
    let (rest, table) = ws(plain_identifier).parse(input)?;
    if let Ok((rest, _)) = ws(keyword("AS")).parse(rest) {
        let (rest, alias) = context("expected alias after AS", cut(ws(identifier))).parse(rest)?;
        return Ok((
            rest,
            TableRef {
                table: table.to_string(),
                alias: Some(alias.to_string()),
            },
        ));
    }
    if let Ok((rest, alias)) = ws(plain_identifier).parse(rest) {
        return Ok((
            rest,
            TableRef {
                table: table.to_string(),
                alias: Some(alias.to_string()),
            },
        ));
    }
    Ok((
        rest,
        TableRef {
            table: table.to_string(),
            alias: None,
        },
    ))
}

fn parse_join(input: &str) -> SResult<'_, JoinSpec> {
    let (rest, kind) = alt((
        map((ws(keyword("LEFT")), opt(ws(keyword("OUTER"))), ws(keyword("JOIN"))), |_| {
            JoinKind::Left
        }),
        map((ws(keyword("INNER")), ws(keyword("JOIN"))), |_| JoinKind::Inner),
        map(ws(keyword("JOIN")), |_| JoinKind::Inner),
    ))
    .parse(input)?;
    let (rest, table) = context("expected joined table", cut(parse_table_ref)).parse(rest)?;
    let (rest, _) = context("expected ON after joined table", cut(ws(keyword("ON")))).parse(rest)?;
    let (rest, on) = context("expected join predicate", cut(parse_pred)).parse(rest)?;
    Ok((rest, JoinSpec { kind, table, on }))
}

fn parse_select_item(input: &str) -> SResult<'_, SelectItem> {
    if let Ok((rest, _)) = ws(char::<_, SqlParsingError>('*')).parse(input) {
        return Ok((
            rest,
            SelectItem {
                expr: SqlExpr::Star,
                alias: None,
            },
        ));
    }
    let (rest, expr) = ws(parse_expr).parse(input)?;
    if let Ok((rest, _)) = ws(keyword("AS")).parse(rest) {
        let (rest, alias) = context("expected alias after AS", cut(ws(identifier))).parse(rest)?;
        return Ok((
            rest,
            SelectItem {
                expr,
                alias: Some(alias.to_string()),
            },
        ));
    }
    if let Ok((rest, alias)) = ws(plain_identifier).parse(rest) {
        return Ok((
            rest,
            SelectItem {
                expr,
                alias: Some(alias.to_string()),
            },
        ));
    }
    Ok((rest, SelectItem { expr, alias: None }))
}

fn parse_select_core(input: &str) -> SResult<'_, SelectCore> {
    let (rest, _) = ws(keyword("SELECT")).parse(input)?;
    let (rest, items) = context(
        "expected select list",
        cut(separated_list1(ws(char(',')), parse_select_item)),
    )
    .parse(rest)?;
    let (rest, _) = context("expected FROM", cut(ws(keyword("FROM")))).parse(rest)?;
    let (rest, from) = context("expected table name", cut(parse_table_ref)).parse(rest)?;
    let (rest, joins) = many0(parse_join).parse(rest)?;

    let (rest, where_clause) = if let Ok((rest, _)) = ws(keyword("WHERE")).parse(rest) {
        let (rest, pred) =
            context("expected predicate after WHERE", cut(parse_pred)).parse(rest)?;
        (rest, Some(pred))
    } else {
        (rest, None)
    };

    let (rest, group_by) = if let Ok((rest, _)) = ws(keyword("GROUP")).parse(rest) {
        let (rest, _) = context("expected BY after GROUP", cut(ws(keyword("BY")))).parse(rest)?;
        let (rest, keys) = context(
            "expected GROUP BY expressions",
            cut(separated_list1(ws(char(',')), ws(parse_expr))),
        )
        .parse(rest)?;
        (rest, keys)
    } else {
        (rest, Vec::new())
    };

    let (rest, having) = if let Ok((rest, _)) = ws(keyword("HAVING")).parse(rest) {
        let (rest, pred) =
            context("expected predicate after HAVING", cut(parse_pred)).parse(rest)?;
        (rest, Some(pred))
    } else {
        (rest, None)
    };

    Ok((
        rest,
        SelectCore {
            items,
            from,
            joins,
            where_clause,
            group_by,
            having,
        },
    ))
}

fn parse_order_spec(input: &str) -> SResult<'_, OrderSpec> {
    let (rest, _) = ws(keyword("ORDER")).parse(input)?;
    let (rest, _) = context("expected BY after ORDER", cut(ws(keyword("BY")))).parse(rest)?;
    let (rest, key) =
        context("expected ORDER BY expression", cut(ws(parse_expr))).parse(rest)?;
    let (rest, ascending) = if let Ok((rest, _)) = ws(keyword("DESC")).parse(rest) {
        (rest, false)
    } else if let Ok((rest, _)) = ws(keyword("ASC")).parse(rest) {
        (rest, true)
    } else {
        (rest, true)
    };
    Ok((rest, OrderSpec { key, ascending }))
}

fn parse_select_body(input: &str) -> SResult<'_, SelectBody> {
    let (mut rest, first) = parse_select_core(input)?;
    let mut unions = Vec::new();
    loop {
        let Ok((after_kw, _)) = ws(keyword("UNION")).parse(rest) else {
            break;
        };
        let (after_kw, all) = match ws(keyword("ALL")).parse(after_kw) {
            Ok((r, _)) => (r, true),
            Err(_) => (after_kw, false),
        };
        let (after, core) =
            context("expected SELECT after UNION", cut(parse_select_core)).parse(after_kw)?;
        unions.push((all, core));
        rest = after;
    }
    let (rest, order_by) = opt(parse_order_spec).parse(rest)?;
    Ok((
        rest,
        SelectBody {
            first,
            unions,
            order_by,
        },
    ))
}

fn parse_cte(input: &str) -> SResult<'_, Cte> {
    let (rest, name) = ws(plain_identifier).parse(input)?;
    let (rest, _) = context("expected AS after CTE name", cut(ws(keyword("AS")))).parse(rest)?;
    let (rest, _) = context("expected '('", cut(ws(char('(')))).parse(rest)?;
    let (rest, query) = context("expected CTE query", cut(parse_select_statement)).parse(rest)?;
    let (rest, _) = context("expected ')' after CTE query", cut(ws(char(')')))).parse(rest)?;
    Ok((
        rest,
        Cte {
            name: name.to_string(),
            query,
        },
    ))
}

fn parse_select_statement(input: &str) -> SResult<'_, SelectStatement> {
    let (rest, ctes) = if let Ok((rest, _)) = ws(keyword("WITH")).parse(input) {
        context(
            "expected CTE definitions",
            cut(separated_list1(ws(char(',')), parse_cte)),
        )
        .parse(rest)?
    } else {
        (input, Vec::new())
    };
    let (rest, body) = parse_select_body(rest)?;
    Ok((rest, SelectStatement { ctes, body }))
}

/// Parse a complete SQL statement, requiring all input to be consumed.
pub fn parse_statement(input: &str) -> Result<SelectStatement, SqlParseError> {
    match parse_select_statement(input) {
        Ok((remainder, stmt)) => {
            let remainder = remainder.trim().trim_end_matches(';').trim();
            if !remainder.is_empty() {
                return Err(SqlParseError::Syntax {
                    offset: offset_in(input, remainder),
                    expected: "end of statement".to_string(),
                });
            }
            Ok(stmt)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(SqlParseError::from_parsing_error(input, &e))
        }
        Err(nom::Err::Incomplete(_)) => Err(SqlParseError::Syntax {
            offset: input.len(),
            expected: "more input".to_string(),
        }),
    }
}

/// Parse and lower to the IR in one step.
pub fn parse_sql(input: &str) -> Result<Sql, SqlParseError> {
    let stmt = parse_statement(input)?;
    Ok(lower(&stmt))
}
