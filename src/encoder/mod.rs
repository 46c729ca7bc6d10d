//! Bounded symbolic encoding: base database construction, relational
//! translation of the IR, and the equivalence formula.

pub mod context;
pub mod database;
pub mod equivalence;
pub mod errors;
pub mod relation;

pub use context::EncodingContext;
pub use database::{build_database, BaseTable, SymbolicDatabase};
pub use equivalence::{check_cast_compatibility, equivalence_formula};
pub use errors::EncodeError;
pub use relation::{ColumnRef, RelationEncoder, SymRelation, SymRow, SymValue};

use crate::config::{Semantics, VerifyOptions};
use crate::graph_catalog::RelationalSchema;
use crate::solver::Term;
use crate::sql_ir::Sql;

/// Everything one bound's solver session needs.
pub struct EncodedPair {
    pub ctx: EncodingContext,
    pub db: SymbolicDatabase,
    pub left: SymRelation,
    pub right: SymRelation,
    pub formula: Term,
    pub semantics: Semantics,
}

/// Result of encoding a query pair at one bound.
pub enum EncodeOutcome {
    Encoded(Box<EncodedPair>),
    /// The two outputs have different widths; the queries cannot be
    /// equivalent on any database.
    ArityMismatch { left: usize, right: usize },
}

/// Encode both queries at the given bound and build the equivalence
/// formula. Bag semantics upgrades to list semantics when both outermost
/// queries carry an ORDER BY.
pub fn encode_pair(
    schema: &RelationalSchema,
    left_sql: &Sql,
    right_sql: &Sql,
    bound: usize,
    options: &VerifyOptions,
) -> Result<EncodeOutcome, EncodeError> {
    check_cast_compatibility(left_sql, right_sql)?;

    let mut ctx = EncodingContext::new();
    let db = build_database(&mut ctx, schema, bound, options.integrity_constraints);

    let left = {
        let mut encoder = RelationEncoder::new(&mut ctx, &db, schema);
        encoder.encode_query(left_sql)?
    };
    let right = {
        let mut encoder = RelationEncoder::new(&mut ctx, &db, schema);
        encoder.encode_query(right_sql)?
    };

    if left.arity() != right.arity() {
        return Ok(EncodeOutcome::ArityMismatch {
            left: left.arity(),
            right: right.arity(),
        });
    }

    let semantics = match options.semantics {
        Semantics::Bag
            if left.order_ascending.is_some() && right.order_ascending.is_some() =>
        {
            Semantics::List
        }
        other => other,
    };

    let formula = equivalence_formula(&left, &right, semantics);
    Ok(EncodeOutcome::Encoded(Box::new(EncodedPair {
        ctx,
        db,
        left,
        right,
        formula,
        semantics,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_catalog::{infer_sdt, GraphSchema, NodeType};
    use crate::sql_parser::parse_sql;

    fn person_schema() -> RelationalSchema {
        let mut gschema = GraphSchema::new();
        gschema
            .add_node(NodeType::new("Person", vec!["pid".into(), "age".into()]))
            .unwrap();
        infer_sdt(&gschema).unwrap().schema
    }

    #[test]
    fn test_identical_queries_encode() {
        let schema = person_schema();
        let sql = parse_sql("SELECT pid FROM person WHERE age > 30").unwrap();
        let outcome =
            encode_pair(&schema, &sql, &sql, 2, &VerifyOptions::default()).unwrap();
        match outcome {
            EncodeOutcome::Encoded(pair) => {
                assert_eq!(pair.left.arity(), 1);
                assert_eq!(pair.left.rows.len(), 2);
                assert_eq!(pair.semantics, Semantics::Bag);
                // The script has declarations and database constraints.
                assert!(!pair.ctx.script_lines().is_empty());
            }
            EncodeOutcome::ArityMismatch { .. } => panic!("arities match"),
        }
    }

    #[test]
    fn test_arity_mismatch_detected() {
        let schema = person_schema();
        let one = parse_sql("SELECT pid FROM person").unwrap();
        let two = parse_sql("SELECT pid, age FROM person").unwrap();
        let outcome =
            encode_pair(&schema, &one, &two, 1, &VerifyOptions::default()).unwrap();
        assert!(matches!(
            outcome,
            EncodeOutcome::ArityMismatch { left: 1, right: 2 }
        ));
    }

    #[test]
    fn test_ordered_pair_upgrades_to_list() {
        let schema = person_schema();
        let sql = parse_sql("SELECT pid FROM person ORDER BY pid").unwrap();
        let outcome =
            encode_pair(&schema, &sql, &sql, 1, &VerifyOptions::default()).unwrap();
        match outcome {
            EncodeOutcome::Encoded(pair) => assert_eq!(pair.semantics, Semantics::List),
            EncodeOutcome::ArityMismatch { .. } => panic!("arities match"),
        }
    }

    #[test]
    fn test_group_by_pair_encodes() {
        let schema = person_schema();
        let sql = parse_sql("SELECT age, COUNT(*) AS n FROM person GROUP BY age").unwrap();
        let outcome =
            encode_pair(&schema, &sql, &sql, 2, &VerifyOptions::default()).unwrap();
        match outcome {
            EncodeOutcome::Encoded(pair) => {
                assert_eq!(pair.left.arity(), 2);
                let script = pair.ctx.script_lines().join("\n");
                assert!(script.contains("agg_count"));
            }
            EncodeOutcome::ArityMismatch { .. } => panic!("arities match"),
        }
    }
}
