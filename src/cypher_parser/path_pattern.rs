//! Node, relationship and path pattern parsers.
//!
//! A path is one node pattern followed by zero or more `(edge, node)`
//! segments: `(a:L1)-[e:R]->(b:L2)<-[f:S]-(c:L3)`.

use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::{cut, opt},
    error::context,
    multi::many0,
    Parser,
};

use super::ast::{Direction, EdgePattern, NodePattern, PathPattern};
use super::common::{parse_identifier, ws};
use super::errors::{CypherParsingError, PResult};

/// `(var:Label)`
pub fn parse_node_pattern(input: &str) -> PResult<'_, NodePattern<'_>> {
    let (rest, _) = ws(char('(')).parse(input)?;
    let (rest, var) = context("expected node variable", cut(ws(parse_identifier))).parse(rest)?;
    let (rest, _) = context("expected ':' after node variable", cut(char(':'))).parse(rest)?;
    let (rest, label) = context("expected node label", cut(ws(parse_identifier))).parse(rest)?;
    let (rest, _) = context("expected closing ')'", cut(ws(char(')')))).parse(rest)?;
    Ok((rest, NodePattern { var, label }))
}

/// The bracketed body shared by all edge forms: `[var:Label]`.
fn parse_edge_body(input: &str) -> PResult<'_, (&str, &str)> {
    let (rest, _) = char('[').parse(input)?;
    let (rest, var) = context("expected edge variable", cut(ws(parse_identifier))).parse(rest)?;
    let (rest, _) = context("expected ':' after edge variable", cut(char(':'))).parse(rest)?;
    let (rest, label) = context("expected edge label", cut(ws(parse_identifier))).parse(rest)?;
    // Variable-length specs like [e:KNOWS*1..3] are recognized and refused.
    let (rest, star) = opt(char('*')).parse(rest)?;
    if star.is_some() {
        return Err(nom::Err::Failure(CypherParsingError {
            errors: vec![(input, "unsupported: variable-length relationship pattern")],
        }));
    }
    let (rest, _) = context("expected closing ']'", cut(ws(char(']')))).parse(rest)?;
    Ok((rest, (var, label)))
}

/// One of `-[v:L]->`, `<-[v:L]-`, `-[v:L]-`.
pub fn parse_edge_pattern(input: &str) -> PResult<'_, EdgePattern<'_>> {
    let (rest, _) = nom::character::complete::multispace0.parse(input)?;
    if let Ok((rest, _)) = tag::<_, _, CypherParsingError>("<-").parse(rest) {
        let (rest, (var, label)) = parse_edge_body(rest)?;
        let (rest, _) = context("expected '-' to close edge", cut(tag("-"))).parse(rest)?;
        return Ok((
            rest,
            EdgePattern {
                var,
                label,
                direction: Direction::Incoming,
            },
        ));
    }
    let (rest, _) = tag("-").parse(rest)?;
    let (rest, (var, label)) = parse_edge_body(rest)?;
    if let Ok((rest, _)) = tag::<_, _, CypherParsingError>("->").parse(rest) {
        return Ok((
            rest,
            EdgePattern {
                var,
                label,
                direction: Direction::Outgoing,
            },
        ));
    }
    let (rest, _) = context("expected '-' or '->' to close edge", cut(tag("-"))).parse(rest)?;
    Ok((
        rest,
        EdgePattern {
            var,
            label,
            direction: Direction::Either,
        },
    ))
}

pub fn parse_path_pattern(input: &str) -> PResult<'_, PathPattern<'_>> {
    let (rest, start) = parse_node_pattern(input)?;
    let (rest, segments) = many0((parse_edge_pattern, parse_node_pattern)).parse(rest)?;
    Ok((rest, PathPattern { start, segments }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::errors::CypherParseError;

    #[test]
    fn test_parse_node() {
        let (rest, node) = parse_node_pattern("(p:Person) rest").unwrap();
        assert_eq!(node, NodePattern { var: "p", label: "Person" });
        assert_eq!(rest, "rest");
    }

    #[test]
    fn test_node_without_label_rejected() {
        assert!(parse_node_pattern("(p)").is_err());
    }

    #[test]
    fn test_parse_edge_directions() {
        let (_, e) = parse_edge_pattern("-[w:WORKS_AT]->").unwrap();
        assert_eq!(e.direction, Direction::Outgoing);
        assert_eq!(e.var, "w");
        assert_eq!(e.label, "WORKS_AT");

        let (_, e) = parse_edge_pattern("<-[w:WORKS_AT]-").unwrap();
        assert_eq!(e.direction, Direction::Incoming);

        let (_, e) = parse_edge_pattern("-[w:WORKS_AT]-").unwrap();
        assert_eq!(e.direction, Direction::Either);
    }

    #[test]
    fn test_parse_two_hop_path() {
        let input = "(p:Person)-[w:WORKS_AT]->(c:Company)<-[o:OWNS]-(b:Boss)";
        let (rest, path) = parse_path_pattern(input).unwrap();
        assert_eq!(rest, "");
        assert_eq!(path.start.var, "p");
        assert_eq!(path.hop_count(), 2);
        assert_eq!(path.segments[0].0.label, "WORKS_AT");
        assert_eq!(path.segments[0].1.var, "c");
        assert_eq!(path.segments[1].0.direction, Direction::Incoming);
        assert_eq!(path.segments[1].1.label, "Boss");
    }

    #[test]
    fn test_variable_length_is_not_supported() {
        let err = parse_path_pattern("(a:A)-[e:R*1..3]->(b:B)").unwrap_err();
        match err {
            nom::Err::Failure(e) => {
                let public = CypherParseError::from_parsing_error("", &e);
                assert!(matches!(public, CypherParseError::NotSupported { .. }));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
