//! `MATCH` / `OPTIONAL MATCH` clause parser.

use nom::{combinator::cut, error::context, Parser};

use super::ast::{MatchClause, MatchKind};
use super::common::{keyword, ws};
use super::errors::{CypherParsingError, PResult};
use super::expression::parse_predicate;
use super::path_pattern::parse_path_pattern;

pub fn parse_match_clause(input: &str) -> PResult<'_, MatchClause<'_>> {
    // OPTIONAL MATCH first: it starts with the longer keyword.
    let (rest, kind) =
        if let Ok((rest, _)) = ws(keyword::<CypherParsingError>("OPTIONAL")).parse(input) {
            let (rest, _) =
                context("expected MATCH after OPTIONAL", cut(ws(keyword("MATCH")))).parse(rest)?;
            (rest, MatchKind::OptionalMatch)
        } else {
            let (rest, _) = ws(keyword("MATCH")).parse(input)?;
            (rest, MatchKind::Match)
        };

    let (rest, pattern) =
        context("expected path pattern", cut(parse_path_pattern)).parse(rest)?;

    let (rest, where_clause) =
        if let Ok((rest, _)) = ws(keyword::<CypherParsingError>("WHERE")).parse(rest) {
            let (rest, pred) =
                context("expected predicate after WHERE", cut(parse_predicate)).parse(rest)?;
            (rest, Some(pred))
        } else {
            (rest, None)
        };

    Ok((
        rest,
        MatchClause {
            kind,
            pattern,
            where_clause,
        },
    ))
}
