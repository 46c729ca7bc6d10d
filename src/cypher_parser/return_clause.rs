//! `RETURN` clause parser. Every item must carry an explicit `AS alias`.

use nom::{
    character::complete::{char, multispace0},
    combinator::cut,
    error::context,
    multi::separated_list1,
    sequence::delimited,
    Parser,
};

use super::ast::ReturnItem;
use super::common::{keyword, parse_identifier, ws};
use super::errors::PResult;
use super::expression::parse_expression;

fn parse_return_item(input: &str) -> PResult<'_, ReturnItem<'_>> {
    let (rest, expression) = ws(parse_expression).parse(input)?;
    let (rest, _) = context("each RETURN item needs 'AS alias'", cut(ws(keyword("AS"))))
        .parse(rest)?;
    let (rest, alias) = context("expected alias identifier", cut(ws(parse_identifier)))
        .parse(rest)?;
    Ok((rest, ReturnItem { expression, alias }))
}

pub fn parse_return_clause(input: &str) -> PResult<'_, Vec<ReturnItem<'_>>> {
    let (rest, _) = ws(keyword("RETURN")).parse(input)?;
    context(
        "expected RETURN items",
        cut(separated_list1(
            delimited(multispace0, char(','), multispace0),
            parse_return_item,
        )),
    )
    .parse(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::ast::{AggregateFn, Expression, PropertyAccess};

    #[test]
    fn test_parse_return_items() {
        let (rest, items) =
            parse_return_clause("RETURN p.pid AS pid, COUNT(*) AS n ORDER").unwrap();
        assert_eq!(rest, "ORDER");
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            ReturnItem {
                expression: Expression::Property(PropertyAccess {
                    var: "p",
                    key: "pid"
                }),
                alias: "pid",
            }
        );
        match &items[1].expression {
            Expression::Aggregate { func, arg } => {
                assert_eq!(*func, AggregateFn::Count);
                assert_eq!(**arg, Expression::Star);
            }
            other => panic!("expected aggregate, got {:?}", other),
        }
        assert_eq!(items[1].alias, "n");
    }

    #[test]
    fn test_missing_alias_rejected() {
        assert!(matches!(
            parse_return_clause("RETURN p.pid"),
            Err(nom::Err::Failure(_))
        ));
    }
}
