//! Cypher AST → SQL IR, guided by the SDT and the induced schema.
//!
//! The pattern walk seeds the join tree with the first node's table and adds
//! two joins per path segment: previous node to edge table, then edge table
//! to the next node. For `<-` edges the previous node joins on `TGT` and the
//! next node on `SRC`; for `->` and `--` it is `SRC` then `TGT` (undirected
//! patterns are treated as forward). `OPTIONAL MATCH` turns both joins of
//! every segment into LEFT joins.

pub mod errors;

pub use errors::TranspileError;

use std::collections::HashMap;

use crate::cypher_parser::ast::{
    AggregateFn as CyAgg, ComparisonOp, Direction, Expression, MatchKind, NodePattern, Predicate,
    Query, ReturnQuery,
};
use crate::graph_catalog::{RelationalSchema, Sdt, SRC_COLUMN, TGT_COLUMN};
use crate::sql_ir::{
    AggregateFn, CompareOp, JoinKind, ProjectItem, Sql, SqlExpr, SqlPred,
};

/// What a pattern variable is bound to.
#[derive(Debug, Clone)]
struct Binding {
    table: String,
    pk: String,
}

type Bindings = HashMap<String, Binding>;

/// Transpile a parsed query into the relational IR.
pub fn transpile(
    query: &Query<'_>,
    sdt: &Sdt,
    schema: &RelationalSchema,
) -> Result<Sql, TranspileError> {
    match query {
        Query::Return(rq) => transpile_return_query(rq, sdt, schema),
        Query::OrderBy {
            sub,
            key,
            ascending,
        } => {
            let lowered = transpile(sub, sdt, schema)?;
            // Binding validation for the key only applies when the subquery
            // is a single MATCH; UNION branches each bind their own names.
            let key = match sub.as_ref() {
                Query::Return(rq) => {
                    let bindings = collect_bindings(rq, sdt, schema)?;
                    convert_expr(key, &bindings, ExprPosition::OrderBy)?
                }
                _ => convert_expr_unchecked(key)?,
            };
            Ok(Sql::OrderBy {
                sub: Box::new(lowered),
                key,
                ascending: *ascending,
            })
        }
        Query::Union { left, right, all } => Ok(Sql::Union {
            left: Box::new(transpile(left, sdt, schema)?),
            right: Box::new(transpile(right, sdt, schema)?),
            all: *all,
        }),
    }
}

fn transpile_return_query(
    rq: &ReturnQuery<'_>,
    sdt: &Sdt,
    schema: &RelationalSchema,
) -> Result<Sql, TranspileError> {
    let bindings = collect_bindings(rq, sdt, schema)?;
    let join_kind = match rq.clause.kind {
        MatchKind::Match => JoinKind::Inner,
        MatchKind::OptionalMatch => JoinKind::Left,
    };

    let mut relation = build_join_tree(rq, &bindings, join_kind)?;

    if let Some(pred) = &rq.clause.where_clause {
        let pred = convert_predicate(pred, &bindings)?;
        relation = Sql::Select {
            sub: Box::new(relation),
            pred,
        };
    }

    // Duplicate output names are rejected before lowering the items.
    let mut seen_aliases: Vec<&str> = Vec::new();
    for item in &rq.items {
        if seen_aliases.contains(&item.alias) {
            return Err(TranspileError::DuplicateAlias {
                alias: item.alias.to_string(),
            });
        }
        seen_aliases.push(item.alias);
    }

    let has_aggregate = rq.items.iter().any(|i| i.expression.contains_aggregate());
    let items = rq
        .items
        .iter()
        .map(|item| {
            Ok(ProjectItem::new(
                item.alias,
                convert_expr(&item.expression, &bindings, ExprPosition::Return)?,
            ))
        })
        .collect::<Result<Vec<_>, TranspileError>>()?;

    if has_aggregate {
        // Group keys are the non-aggregate RETURN expressions, deduplicated
        // by structural equality, in RETURN order.
        let mut keys: Vec<SqlExpr> = Vec::new();
        for item in &items {
            if !item.expr.contains_aggregate() && !keys.contains(&item.expr) {
                keys.push(item.expr.clone());
            }
        }
        Ok(Sql::GroupBy {
            sub: Box::new(relation),
            keys,
            items,
            having: None,
        })
    } else {
        Ok(Sql::Project {
            sub: Box::new(relation),
            items,
        })
    }
}

fn collect_bindings(
    rq: &ReturnQuery<'_>,
    sdt: &Sdt,
    schema: &RelationalSchema,
) -> Result<Bindings, TranspileError> {
    let mut bindings = Bindings::new();
    let pattern = &rq.clause.pattern;
    for node in pattern.nodes() {
        let binding = resolve_label(node.label, sdt, schema)?;
        bindings.insert(node.var.to_string(), binding);
    }
    for edge in pattern.edges() {
        let binding = resolve_label(edge.label, sdt, schema)?;
        bindings.insert(edge.var.to_string(), binding);
    }
    Ok(bindings)
}

fn resolve_label(
    label: &str,
    sdt: &Sdt,
    schema: &RelationalSchema,
) -> Result<Binding, TranspileError> {
    let table_name = sdt
        .table_for_label(label)
        .ok_or_else(|| TranspileError::SchemaMismatch {
            label: label.to_string(),
        })?;
    let table = schema
        .get(table_name)
        .ok_or_else(|| TranspileError::SchemaMismatch {
            label: label.to_string(),
        })?;
    Ok(Binding {
        table: table.name.clone(),
        pk: table.pk.clone(),
    })
}

fn build_join_tree(
    rq: &ReturnQuery<'_>,
    bindings: &Bindings,
    kind: JoinKind,
) -> Result<Sql, TranspileError> {
    let pattern = &rq.clause.pattern;
    let start_binding = &bindings[pattern.start.var];
    let mut tree = Sql::from_table(start_binding.table.clone(), pattern.start.var);

    let mut prev: &NodePattern<'_> = &pattern.start;
    for (edge, node) in &pattern.segments {
        let edge_binding = &bindings[edge.var];
        let node_binding = &bindings[node.var];
        let prev_binding = &bindings[prev.var];

        // Previous node joins the edge table on SRC, or TGT when the edge
        // points back at it.
        let first_edge_col = match edge.direction {
            Direction::Incoming => TGT_COLUMN,
            Direction::Outgoing | Direction::Either => SRC_COLUMN,
        };
        let on_first = SqlPred::Compare {
            op: CompareOp::Eq,
            left: SqlExpr::column(prev.var, prev_binding.pk.clone()),
            right: SqlExpr::column(edge.var, first_edge_col),
        };
        tree = Sql::join(
            tree,
            Sql::from_table(edge_binding.table.clone(), edge.var),
            on_first,
            kind,
        );

        let second_edge_col = match edge.direction {
            Direction::Incoming => SRC_COLUMN,
            Direction::Outgoing | Direction::Either => TGT_COLUMN,
        };
        let on_second = SqlPred::Compare {
            op: CompareOp::Eq,
            left: SqlExpr::column(edge.var, second_edge_col),
            right: SqlExpr::column(node.var, node_binding.pk.clone()),
        };
        tree = Sql::join(
            tree,
            Sql::from_table(node_binding.table.clone(), node.var),
            on_second,
            kind,
        );

        prev = node;
    }
    Ok(tree)
}

/// Where an expression appears, for positional restrictions.
#[derive(Clone, Copy, PartialEq)]
enum ExprPosition {
    Return,
    Where,
    OrderBy,
    InsideAggregate,
}

fn convert_predicate(
    pred: &Predicate<'_>,
    bindings: &Bindings,
) -> Result<SqlPred, TranspileError> {
    match pred {
        Predicate::Comparison { left, op, right } => Ok(SqlPred::Compare {
            op: convert_op(*op),
            left: convert_expr(left, bindings, ExprPosition::Where)?,
            right: convert_expr(right, bindings, ExprPosition::Where)?,
        }),
        Predicate::And(left, right) => Ok(SqlPred::And(
            Box::new(convert_predicate(left, bindings)?),
            Box::new(convert_predicate(right, bindings)?),
        )),
        Predicate::Or(left, right) => Ok(SqlPred::Or(
            Box::new(convert_predicate(left, bindings)?),
            Box::new(convert_predicate(right, bindings)?),
        )),
        Predicate::Not(sub) => Ok(SqlPred::Not(Box::new(convert_predicate(sub, bindings)?))),
    }
}

fn convert_op(op: ComparisonOp) -> CompareOp {
    match op {
        ComparisonOp::Eq => CompareOp::Eq,
        ComparisonOp::Neq => CompareOp::Neq,
        ComparisonOp::Lt => CompareOp::Lt,
        ComparisonOp::Lte => CompareOp::Lte,
        ComparisonOp::Gt => CompareOp::Gt,
        ComparisonOp::Gte => CompareOp::Gte,
    }
}

fn convert_agg(func: CyAgg) -> AggregateFn {
    match func {
        CyAgg::Count => AggregateFn::Count,
        CyAgg::Sum => AggregateFn::Sum,
        CyAgg::Avg => AggregateFn::Avg,
        CyAgg::Min => AggregateFn::Min,
        CyAgg::Max => AggregateFn::Max,
    }
}

fn convert_expr(
    expr: &Expression<'_>,
    bindings: &Bindings,
    position: ExprPosition,
) -> Result<SqlExpr, TranspileError> {
    match expr {
        Expression::Property(prop) => {
            if !bindings.contains_key(prop.var) {
                return Err(TranspileError::UnboundVariable {
                    var: prop.var.to_string(),
                });
            }
            Ok(SqlExpr::column(prop.var, prop.key))
        }
        Expression::Integer(n) => Ok(SqlExpr::Number(*n)),
        Expression::Str(s) => Ok(SqlExpr::StringLit((*s).to_string())),
        Expression::Star => Err(TranspileError::StarOutsideCount),
        Expression::Aggregate { func, arg } => {
            match position {
                ExprPosition::Return => {}
                ExprPosition::InsideAggregate => {
                    return Err(TranspileError::NestedAggregate);
                }
                ExprPosition::Where => {
                    return Err(TranspileError::AggregateNotAllowed { place: "WHERE" });
                }
                ExprPosition::OrderBy => {
                    return Err(TranspileError::AggregateNotAllowed { place: "ORDER BY" });
                }
            }
            let arg = match (func, arg.as_ref()) {
                (CyAgg::Count, Expression::Star) => SqlExpr::Star,
                (_, Expression::Star) => return Err(TranspileError::StarOutsideCount),
                (_, inner) => convert_expr(inner, bindings, ExprPosition::InsideAggregate)?,
            };
            Ok(SqlExpr::Aggregate {
                func: convert_agg(*func),
                arg: Box::new(arg),
            })
        }
    }
}

/// Expression conversion without binding validation, for ORDER BY keys over
/// UNION queries.
fn convert_expr_unchecked(expr: &Expression<'_>) -> Result<SqlExpr, TranspileError> {
    match expr {
        Expression::Property(prop) => Ok(SqlExpr::column(prop.var, prop.key)),
        Expression::Integer(n) => Ok(SqlExpr::Number(*n)),
        Expression::Str(s) => Ok(SqlExpr::StringLit((*s).to_string())),
        Expression::Star => Err(TranspileError::StarOutsideCount),
        Expression::Aggregate { .. } => {
            Err(TranspileError::AggregateNotAllowed { place: "ORDER BY" })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::parse_query;
    use crate::graph_catalog::{infer_sdt, EdgeType, GraphSchema, NodeType};
    use crate::sql_ir::ToSql;

    fn setup() -> (crate::graph_catalog::RelationalSchema, Sdt) {
        let mut gschema = GraphSchema::new();
        gschema
            .add_node(NodeType::new("Person", vec!["pid".into(), "name".into()]))
            .unwrap();
        gschema
            .add_node(NodeType::new("Company", vec!["cid".into(), "title".into()]))
            .unwrap();
        gschema
            .add_edge(EdgeType::new(
                "WORKS_AT",
                "Person",
                "Company",
                vec!["wid".into()],
            ))
            .unwrap();
        let result = infer_sdt(&gschema).unwrap();
        (result.schema, result.sdt)
    }

    fn transpile_text(text: &str) -> Result<Sql, TranspileError> {
        let (schema, sdt) = setup();
        let query = parse_query(text).expect("query should parse");
        transpile(&query, &sdt, &schema)
    }

    #[test]
    fn test_simple_join_transpile() {
        let sql = transpile_text(
            "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid, c.cid AS cid",
        )
        .unwrap();
        let text = sql.to_sql();
        assert!(text.contains("FROM (person AS p INNER JOIN works_at AS w ON p.pid = w.SRC)"));
        assert!(text.contains("INNER JOIN company AS c ON w.TGT = c.cid"));
        assert!(text.starts_with("SELECT p.pid AS pid, c.cid AS cid"));
    }

    #[test]
    fn test_optional_match_emits_left_joins() {
        let sql = transpile_text(
            "OPTIONAL MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid",
        )
        .unwrap();
        let text = sql.to_sql();
        assert_eq!(text.matches("LEFT JOIN").count(), 2);
        assert!(!text.contains("INNER JOIN"));
    }

    #[test]
    fn test_incoming_edge_swaps_join_columns() {
        let sql = transpile_text(
            "MATCH (c:Company)<-[w:WORKS_AT]-(p:Person) RETURN c.cid AS cid",
        )
        .unwrap();
        let text = sql.to_sql();
        assert!(text.contains("ON c.cid = w.TGT"));
        assert!(text.contains("ON w.SRC = p.pid"));
    }

    #[test]
    fn test_undirected_edge_is_treated_as_forward() {
        let forward = transpile_text(
            "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid",
        )
        .unwrap();
        let undirected = transpile_text(
            "MATCH (p:Person)-[w:WORKS_AT]-(c:Company) RETURN p.pid AS pid",
        )
        .unwrap();
        assert_eq!(forward, undirected);
    }

    #[test]
    fn test_join_count_is_two_per_segment() {
        fn count_joins(sql: &Sql) -> usize {
            match sql {
                Sql::Join { left, right, .. } => 1 + count_joins(left) + count_joins(right),
                Sql::Select { sub, .. }
                | Sql::Project { sub, .. }
                | Sql::GroupBy { sub, .. }
                | Sql::OrderBy { sub, .. } => count_joins(sub),
                _ => 0,
            }
        }
        let sql = transpile_text(
            "MATCH (p:Person)-[w:WORKS_AT]->(c:Company)<-[v:WORKS_AT]-(q:Person) \
             RETURN p.pid AS a, q.pid AS b",
        )
        .unwrap();
        assert_eq!(count_joins(&sql), 4);
    }

    #[test]
    fn test_where_becomes_select() {
        let sql = transpile_text(
            "MATCH (p:Person) WHERE p.pid > 5 RETURN p.name AS name",
        )
        .unwrap();
        match &sql {
            Sql::Project { sub, .. } => assert!(matches!(sub.as_ref(), Sql::Select { .. })),
            other => panic!("expected Project, got {:?}", other),
        }
        assert_eq!(
            sql.to_sql(),
            "SELECT p.name AS name FROM person AS p WHERE p.pid > 5"
        );
    }

    #[test]
    fn test_aggregate_forces_group_by() {
        let sql = transpile_text("MATCH (p:Person) RETURN p.pid AS pid, COUNT(*) AS n").unwrap();
        match &sql {
            Sql::GroupBy { keys, items, .. } => {
                assert_eq!(keys.len(), 1);
                assert_eq!(keys[0], SqlExpr::column("p", "pid"));
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].alias, "pid");
                assert_eq!(items[1].alias, "n");
            }
            other => panic!("expected GroupBy, got {:?}", other),
        }
    }

    #[test]
    fn test_group_keys_deduplicated() {
        let sql = transpile_text(
            "MATCH (p:Person) RETURN p.pid AS a, p.pid AS b, COUNT(*) AS n",
        )
        .unwrap();
        match &sql {
            Sql::GroupBy { keys, items, .. } => {
                assert_eq!(keys.len(), 1, "structurally equal keys collapse");
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected GroupBy, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_variable_is_rejected() {
        let err = transpile_text("MATCH (p:Person) RETURN q.pid AS pid").unwrap_err();
        assert_eq!(
            err,
            TranspileError::UnboundVariable {
                var: "q".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_label_is_schema_mismatch() {
        let err = transpile_text("MATCH (x:Robot) RETURN x.id AS id").unwrap_err();
        assert_eq!(
            err,
            TranspileError::SchemaMismatch {
                label: "Robot".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let err = transpile_text("MATCH (p:Person) RETURN p.pid AS x, p.name AS x").unwrap_err();
        assert_eq!(
            err,
            TranspileError::DuplicateAlias {
                alias: "x".to_string()
            }
        );
    }

    #[test]
    fn test_aggregate_in_where_rejected() {
        let err = transpile_text(
            "MATCH (p:Person) WHERE COUNT(*) > 1 RETURN p.pid AS pid",
        )
        .unwrap_err();
        assert_eq!(
            err,
            TranspileError::AggregateNotAllowed { place: "WHERE" }
        );
    }

    #[test]
    fn test_union_and_order_by() {
        let sql = transpile_text(
            "MATCH (p:Person) RETURN p.name AS n \
             UNION ALL MATCH (c:Company) RETURN c.title AS n \
             ORDER BY p.name",
        )
        .unwrap();
        match &sql {
            Sql::OrderBy { sub, .. } => {
                assert!(matches!(sub.as_ref(), Sql::Union { all: true, .. }));
            }
            other => panic!("expected OrderBy over Union, got {:?}", other),
        }
    }

    #[test]
    fn test_projection_count_matches_return() {
        let sql = transpile_text(
            "MATCH (p:Person) RETURN p.pid AS a, p.name AS b",
        )
        .unwrap();
        match &sql {
            Sql::Project { items, .. } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].alias, "a");
                assert_eq!(items[1].alias, "b");
            }
            other => panic!("expected Project, got {:?}", other),
        }
    }
}
