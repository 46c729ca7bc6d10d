//! Trailing `ORDER BY expr [ASC|DESC]` parser.

use nom::{combinator::cut, error::context, Parser};

use super::ast::Expression;
use super::common::{keyword, ws};
use super::errors::{CypherParsingError, PResult};
use super::expression::parse_expression;

pub fn parse_order_by_clause(input: &str) -> PResult<'_, (Expression<'_>, bool)> {
    let (rest, _) = ws(keyword("ORDER")).parse(input)?;
    let (rest, _) = context("expected BY after ORDER", cut(ws(keyword("BY")))).parse(rest)?;
    let (rest, key) =
        context("expected ORDER BY expression", cut(ws(parse_expression))).parse(rest)?;
    if let Ok((rest, _)) = ws(keyword::<CypherParsingError>("DESC")).parse(rest) {
        return Ok((rest, (key, false)));
    }
    if let Ok((rest, _)) = ws(keyword::<CypherParsingError>("ASC")).parse(rest) {
        return Ok((rest, (key, true)));
    }
    Ok((rest, (key, true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::ast::PropertyAccess;

    #[test]
    fn test_order_by_defaults_to_ascending() {
        let (_, (key, asc)) = parse_order_by_clause("ORDER BY p.name").unwrap();
        assert_eq!(
            key,
            Expression::Property(PropertyAccess {
                var: "p",
                key: "name"
            })
        );
        assert!(asc);
    }

    #[test]
    fn test_order_by_desc() {
        let (_, (_, asc)) = parse_order_by_clause("order by p.name desc").unwrap();
        assert!(!asc);
    }
}
