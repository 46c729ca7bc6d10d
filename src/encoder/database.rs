//! The bounded symbolic base database.
//!
//! For every induced table and bound `k`, this allocates `k` tuple
//! constants and asserts per-column type bounds. Integrity constraints
//! (primary-key uniqueness, foreign-key existence) are asserted when
//! enabled. A tuple may be logically absent: presence is `¬deleted(t)`.

use log::debug;

use crate::config::{DATE_LOWER_BOUND, DATE_UPPER_BOUND, INT_LOWER_BOUND, INT_UPPER_BOUND};
use crate::graph_catalog::{ColumnType, RelationalSchema};
use crate::solver::Term;

use super::context::EncodingContext;

#[derive(Debug, Clone)]
pub struct BaseTable {
    pub name: String,
    pub tuples: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolicDatabase {
    pub tables: Vec<BaseTable>,
}

impl SymbolicDatabase {
    pub fn table(&self, name: &str) -> Option<&BaseTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Build the symbolic database for one bound.
pub fn build_database(
    ctx: &mut EncodingContext,
    schema: &RelationalSchema,
    bound: usize,
    integrity_constraints: bool,
) -> SymbolicDatabase {
    let mut db = SymbolicDatabase::default();

    for table in schema.iter() {
        let tuples: Vec<String> = (0..bound).map(|_| ctx.fresh_tuple()).collect();
        debug!("table {}: tuples {:?}", table.name, tuples);

        for tuple in &tuples {
            for attr in &table.attrs {
                let value_fn = ctx.value_fun(&table.name, attr);
                // Null predicates are declared for every column so model
                // extraction can query them even when no query touches
                // the column.
                ctx.null_fun(&table.name, attr);
                let value = Term::app(value_fn.as_str(), vec![Term::var(tuple.as_str())]);
                match table.column_type(attr) {
                    ColumnType::Boolean => ctx.assert(Term::or(vec![
                        Term::eq(value.clone(), Term::IntLit(0)),
                        Term::eq(value, Term::IntLit(1)),
                    ])),
                    ColumnType::Int => {
                        ctx.assert(Term::and(vec![
                            Term::ge(value.clone(), Term::IntLit(INT_LOWER_BOUND)),
                            Term::le(value, Term::IntLit(INT_UPPER_BOUND)),
                        ]));
                    }
                    ColumnType::Date => {
                        ctx.assert(Term::and(vec![
                            Term::ge(value.clone(), Term::IntLit(DATE_LOWER_BOUND)),
                            Term::le(value, Term::IntLit(DATE_UPPER_BOUND)),
                        ]));
                    }
                    ColumnType::Varchar => {
                        // Strings live strictly above the integer range.
                        ctx.assert(Term::gt(value, Term::IntLit(INT_UPPER_BOUND)));
                    }
                }
            }
        }

        if integrity_constraints {
            assert_primary_key(ctx, &table.name, &table.pk, &tuples);
        }

        db.tables.push(BaseTable {
            name: table.name.clone(),
            tuples,
        });
    }

    if integrity_constraints {
        for table in schema.iter() {
            let base = db
                .table(&table.name)
                .expect("table registered above")
                .clone();
            for (attr, (ftable, fpk)) in &table.fks {
                let Some(referenced) = db.table(ftable).cloned() else {
                    continue;
                };
                assert_foreign_key(ctx, &base, attr, &referenced, fpk);
            }
        }
    }

    db
}

/// PK columns are non-null and pairwise distinct.
fn assert_primary_key(ctx: &mut EncodingContext, table: &str, pk: &str, tuples: &[String]) {
    let value_fn = ctx.value_fun(table, pk);
    let null_fn = ctx.null_fun(table, pk);
    for tuple in tuples {
        ctx.assert(Term::not(Term::app(
            null_fn.as_str(),
            vec![Term::var(tuple.as_str())],
        )));
    }
    let values: Vec<Term> = tuples
        .iter()
        .map(|t| Term::app(value_fn.as_str(), vec![Term::var(t.as_str())]))
        .collect();
    ctx.assert(Term::distinct(values));
}

/// Each live tuple either has a live referenced tuple with a matching
/// non-null key, or is itself deleted.
fn assert_foreign_key(
    ctx: &mut EncodingContext,
    base: &BaseTable,
    attr: &str,
    referenced: &BaseTable,
    fpk: &str,
) {
    let fk_value = ctx.value_fun(&base.name, attr);
    let fk_null = ctx.null_fun(&base.name, attr);
    let pk_value = ctx.value_fun(&referenced.name, fpk);
    let pk_null = ctx.null_fun(&referenced.name, fpk);

    for tuple in &base.tuples {
        let matches: Vec<Term> = referenced
            .tuples
            .iter()
            .map(|ref_tuple| {
                Term::and(vec![
                    Term::not(EncodingContext::deleted(ref_tuple)),
                    Term::not(Term::app(fk_null.as_str(), vec![Term::var(tuple.as_str())])),
                    Term::not(Term::app(
                        pk_null.as_str(),
                        vec![Term::var(ref_tuple.as_str())],
                    )),
                    Term::eq(
                        Term::app(fk_value.as_str(), vec![Term::var(tuple.as_str())]),
                        Term::app(pk_value.as_str(), vec![Term::var(ref_tuple.as_str())]),
                    ),
                ])
            })
            .collect();
        ctx.assert(Term::or(
            std::iter::once(EncodingContext::deleted(tuple))
                .chain(matches)
                .collect(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_catalog::{infer_sdt, EdgeType, GraphSchema, NodeType};

    fn induced() -> RelationalSchema {
        let mut gschema = GraphSchema::new();
        gschema
            .add_node(NodeType::new("Person", vec!["pid".into()]))
            .unwrap();
        gschema
            .add_node(NodeType::new("Company", vec!["cid".into()]))
            .unwrap();
        gschema
            .add_edge(EdgeType::new(
                "WORKS_AT",
                "Person",
                "Company",
                vec!["wid".into()],
            ))
            .unwrap();
        infer_sdt(&gschema).unwrap().schema
    }

    #[test]
    fn test_tuple_allocation_per_bound() {
        let mut ctx = EncodingContext::new();
        let db = build_database(&mut ctx, &induced(), 2, true);
        assert_eq!(db.tables.len(), 3);
        for table in &db.tables {
            assert_eq!(table.tuples.len(), 2);
        }
        // 3 tables x 2 tuples.
        assert_eq!(db.table("works_at").unwrap().tuples, vec!["t5", "t6"]);
    }

    #[test]
    fn test_integrity_constraints_can_be_disabled() {
        let mut with = EncodingContext::new();
        build_database(&mut with, &induced(), 2, true);
        let mut without = EncodingContext::new();
        build_database(&mut without, &induced(), 2, false);
        assert!(with.assertions().len() > without.assertions().len());
    }

    #[test]
    fn test_script_mentions_distinct_for_pk() {
        let mut ctx = EncodingContext::new();
        build_database(&mut ctx, &induced(), 2, true);
        let script = ctx.script_lines().join("\n");
        assert!(script.contains("(distinct (person__pid t1) (person__pid t2))"));
        // FK from works_at.SRC to person.pid.
        assert!(script.contains("works_at__SRC"));
    }
}
