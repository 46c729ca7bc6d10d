//! Parser for the supported Cypher subset.
//!
//! Grammar, roughly:
//!
//! ```text
//! query       := return_query (UNION [ALL] return_query)* [ORDER BY expr [ASC|DESC]] [;]
//! return_query:= [OPTIONAL] MATCH pattern [WHERE pred] RETURN expr AS name (, expr AS name)*
//! pattern     := node (edge node)*
//! ```
//!
//! Comments must be removed with [`strip_comments`] before calling
//! [`parse_query`]; reported offsets refer to the stripped text.

use nom::{
    character::complete::{char, multispace0},
    combinator::opt,
    Parser,
};

pub mod ast;
mod common;
pub(crate) mod errors;
mod expression;
mod match_clause;
mod order_by_clause;
mod path_pattern;
mod return_clause;

pub use common::strip_comments;
pub use errors::CypherParseError;

use ast::{Query, ReturnQuery};
use common::{keyword, ws};
use errors::{offset_in, CypherParsingError, PResult};

fn parse_return_query(input: &str) -> PResult<'_, Query<'_>> {
    let (rest, clause) = match_clause::parse_match_clause(input)?;
    let (rest, items) = return_clause::parse_return_clause(rest)?;
    Ok((rest, Query::Return(ReturnQuery { clause, items })))
}

fn parse_statement(input: &str) -> PResult<'_, Query<'_>> {
    let (rest, _) = multispace0.parse(input)?;
    let (mut rest, mut query) = parse_return_query(rest)?;

    // Zero or more UNION [ALL] branches, left-associative.
    loop {
        let Ok((after_kw, _)) = ws(keyword::<CypherParsingError>("UNION")).parse(rest) else {
            break;
        };
        let (after_kw, all) = match ws(keyword::<CypherParsingError>("ALL")).parse(after_kw) {
            Ok((r, _)) => (r, true),
            Err(_) => (after_kw, false),
        };
        let (after, right) = parse_return_query(after_kw)?;
        query = Query::Union {
            left: Box::new(query),
            right: Box::new(right),
            all,
        };
        rest = after;
    }

    // A trailing ORDER BY wraps whatever came before it.
    if let Ok((after, (key, ascending))) = order_by_clause::parse_order_by_clause(rest) {
        query = Query::OrderBy {
            sub: Box::new(query),
            key,
            ascending,
        };
        rest = after;
    }

    let (rest, _) = opt(ws(char(';'))).parse(rest)?;
    let (rest, _) = multispace0.parse(rest)?;
    Ok((rest, query))
}

/// Parse a complete query, requiring all input to be consumed.
pub fn parse_query(input: &str) -> Result<Query<'_>, CypherParseError> {
    match parse_statement(input) {
        Ok((remainder, query)) => {
            if !remainder.trim().is_empty() {
                return Err(CypherParseError::Syntax {
                    offset: offset_in(input, remainder),
                    expected: "end of query".to_string(),
                });
            }
            Ok(query)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(CypherParseError::from_parsing_error(input, &e))
        }
        Err(nom::Err::Incomplete(_)) => Err(CypherParseError::Syntax {
            offset: input.len(),
            expected: "more input".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::ast::*;
    use super::*;

    #[test]
    fn test_parse_simple_join_query() {
        let query = parse_query(
            "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid, c.cid AS cid",
        )
        .expect("query should parse");
        let Query::Return(rq) = query else {
            panic!("expected a plain return query");
        };
        assert_eq!(rq.clause.kind, MatchKind::Match);
        assert_eq!(rq.clause.pattern.hop_count(), 1);
        assert_eq!(rq.items.len(), 2);
        assert_eq!(rq.items[0].alias, "pid");
        assert_eq!(rq.items[1].alias, "cid");
    }

    #[test]
    fn test_parse_order_by_wraps_query() {
        let query =
            parse_query("MATCH (p:Person) RETURN p.name AS name ORDER BY p.name DESC").unwrap();
        match query {
            Query::OrderBy { sub, ascending, .. } => {
                assert!(!ascending);
                assert!(matches!(*sub, Query::Return(_)));
            }
            other => panic!("expected ORDER BY wrapper, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_union_all() {
        let query = parse_query(
            "MATCH (p:Person) RETURN p.name AS n UNION ALL MATCH (c:Company) RETURN c.title AS n",
        )
        .unwrap();
        match query {
            Query::Union { all, left, right } => {
                assert!(all);
                assert!(matches!(*left, Query::Return(_)));
                assert!(matches!(*right, Query::Return(_)));
            }
            other => panic!("expected UNION, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_union_then_order_by() {
        let query = parse_query(
            "MATCH (p:Person) RETURN p.name AS n \
             UNION MATCH (c:Company) RETURN c.title AS n \
             ORDER BY p.name",
        )
        .unwrap();
        match query {
            Query::OrderBy { sub, .. } => assert!(matches!(*sub, Query::Union { .. })),
            other => panic!("expected ORDER BY over UNION, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage_rejected_with_offset() {
        let err = parse_query("MATCH (p:Person) RETURN p.pid AS pid LIMIT 3").unwrap_err();
        match err {
            CypherParseError::Syntax { offset, .. } => {
                assert!(offset > 0, "offset should point into the input");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_return_rejected() {
        assert!(parse_query("MATCH (p:Person)").is_err());
    }

    #[test]
    fn test_strip_comments_then_parse() {
        let cleaned = strip_comments(
            "MATCH (p:Person) -- everyone\nRETURN p.pid AS pid /* done */;",
        );
        assert!(parse_query(&cleaned).is_ok());
    }

    #[test]
    fn test_optional_match_with_where() {
        let query = parse_query(
            "OPTIONAL MATCH (p:Person)-[w:WORKS_AT]->(c:Company) \
             WHERE p.age >= 18 AND c.title = 'Acme' \
             RETURN p.pid AS pid",
        )
        .unwrap();
        let Query::Return(rq) = query else {
            panic!("expected return query");
        };
        assert_eq!(rq.clause.kind, MatchKind::OptionalMatch);
        assert!(matches!(rq.clause.where_clause, Some(Predicate::And(_, _))));
    }
}
