//! Translate IR nodes into multisets of symbolic tuples.
//!
//! A relation is encoded as a fixed list of rows, each carrying a presence
//! predicate and per-column `(value, null)` term pairs. Joins build the
//! Cartesian pairing of their operands' rows; LEFT joins add one padded row
//! per left row, present exactly when no right match exists. GROUP BY
//! produces one candidate output row per input row, present when that row
//! is the first live member of its group.
//!
//! Predicates follow SQL's three-valued logic: evaluation produces a pair
//! of terms (is-true, is-false); `unknown` is whatever is neither.

use log::debug;

use crate::graph_catalog::RelationalSchema;
use crate::solver::{encode_equality, encode_inequality, encode_same, Term};
use crate::sql_ir::{AggregateFn, CompareOp, JoinKind, ProjectItem, Sql, SqlExpr, SqlPred};

use super::context::{
    EncodingContext, AGG_AVG_FN, AGG_COUNT_FN, AGG_MAX_FN, AGG_MIN_FN, AGG_SUM_FN,
    COUNT_ALL_LABEL,
};
use super::database::SymbolicDatabase;
use super::errors::EncodeError;

use std::collections::HashMap;

/// A symbolic column value: integer term plus null predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct SymValue {
    pub value: Term,
    pub null: Term,
}

impl SymValue {
    pub fn known(value: Term) -> Self {
        SymValue {
            value,
            null: Term::FALSE,
        }
    }

    pub fn null_value() -> Self {
        SymValue {
            value: Term::IntLit(0),
            null: Term::TRUE,
        }
    }
}

/// Output column identity used for reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SymRow {
    pub presence: Term,
    pub columns: Vec<SymValue>,
    /// Evaluated ORDER BY key, set only on the outermost ordered relation.
    pub order_key: Option<SymValue>,
}

#[derive(Debug, Clone, Default)]
pub struct SymRelation {
    pub columns: Vec<ColumnRef>,
    pub rows: Vec<SymRow>,
    /// `Some(ascending)` when the outermost query was ordered.
    pub order_ascending: Option<bool>,
}

impl SymRelation {
    pub fn arity(&self) -> usize {
        self.columns.len()
    }
}

/// Null-aware row equality across all columns.
pub fn row_same(a: &SymRow, b: &SymRow) -> Term {
    Term::and(
        a.columns
            .iter()
            .zip(b.columns.iter())
            .map(|(x, y)| {
                encode_same(
                    x.null.clone(),
                    y.null.clone(),
                    x.value.clone(),
                    y.value.clone(),
                )
            })
            .collect(),
    )
}

/// One group under construction inside a GROUP BY encoding.
struct GroupScope<'g> {
    group_tuple: String,
    /// Guard for aggregate definitions; false groups stay unconstrained.
    guard: Term,
    /// membership term per input row.
    members: Vec<Term>,
    input: &'g SymRelation,
    /// Input row the group keys are read from.
    representative: Option<usize>,
}

pub struct RelationEncoder<'a> {
    ctx: &'a mut EncodingContext,
    db: &'a SymbolicDatabase,
    schema: &'a RelationalSchema,
    ctes: HashMap<String, SymRelation>,
}

impl<'a> RelationEncoder<'a> {
    pub fn new(
        ctx: &'a mut EncodingContext,
        db: &'a SymbolicDatabase,
        schema: &'a RelationalSchema,
    ) -> Self {
        RelationEncoder {
            ctx,
            db,
            schema,
            ctes: HashMap::new(),
        }
    }

    /// Encode a full query. CTE bindings are installed first; an outermost
    /// ORDER BY is captured as per-row order keys instead of a relation.
    pub fn encode_query(&mut self, sql: &Sql) -> Result<SymRelation, EncodeError> {
        let mut node = sql;
        while let Sql::With { name, sub, body } = node {
            let bound = self.encode(sub)?;
            self.ctes.insert(name.clone(), bound);
            node = body.as_ref();
        }
        if let Sql::OrderBy {
            sub,
            key,
            ascending,
        } = node
        {
            let mut relation = self.encode(sub)?;
            for idx in 0..relation.rows.len() {
                let key_value = self.eval_expr(key, &relation.columns, &relation.rows[idx])?;
                relation.rows[idx].order_key = Some(key_value);
            }
            relation.order_ascending = Some(*ascending);
            return Ok(relation);
        }
        self.encode(node)
    }

    fn encode(&mut self, sql: &Sql) -> Result<SymRelation, EncodeError> {
        match sql {
            Sql::FromTable { table, alias } => self.encode_from_table(table, alias),
            Sql::Join {
                left,
                right,
                on,
                kind,
            } => self.encode_join(left, right, on, *kind),
            Sql::Select { sub, pred } => self.encode_select(sub, pred),
            Sql::Project { sub, items } => self.encode_project(sub, items),
            Sql::GroupBy {
                sub,
                keys,
                items,
                having,
            } => self.encode_group_by(sub, keys, items, having.as_ref()),
            Sql::OrderBy { sub, .. } => {
                // Intermediate ordering is not observable.
                debug!("dropping inner ORDER BY during encoding");
                self.encode(sub)
            }
            Sql::Union { left, right, all } => self.encode_union(left, right, *all),
            Sql::With { name, sub, body } => {
                let bound = self.encode(sub)?;
                self.ctes.insert(name.clone(), bound);
                self.encode(body)
            }
        }
    }

    fn encode_from_table(&mut self, table: &str, alias: &str) -> Result<SymRelation, EncodeError> {
        if let Some(cte) = self.ctes.get(table) {
            let mut relation = cte.clone();
            for column in &mut relation.columns {
                column.table = Some(alias.to_string());
            }
            relation.order_ascending = None;
            return Ok(relation);
        }

        let schema = self.schema;
        let db = self.db;
        let table_def = schema.get(table).ok_or_else(|| EncodeError::UnknownTable {
            name: table.to_string(),
        })?;
        let base = db.table(table).ok_or_else(|| {
            EncodeError::internal(format!("no symbolic tuples for table `{}`", table))
        })?;

        let columns: Vec<ColumnRef> = table_def
            .attrs
            .iter()
            .map(|attr| ColumnRef {
                table: Some(alias.to_string()),
                name: attr.clone(),
            })
            .collect();

        let mut rows = Vec::with_capacity(base.tuples.len());
        for tuple in &base.tuples {
            let mut row_columns = Vec::with_capacity(table_def.attrs.len());
            for attr in &table_def.attrs {
                let value_fn = self.ctx.value_fun(table, attr);
                let null_fn = self.ctx.null_fun(table, attr);
                row_columns.push(SymValue {
                    value: Term::app(value_fn, vec![Term::var(tuple.as_str())]),
                    null: Term::app(null_fn, vec![Term::var(tuple.as_str())]),
                });
            }
            rows.push(SymRow {
                presence: Term::not(EncodingContext::deleted(tuple)),
                columns: row_columns,
                order_key: None,
            });
        }

        Ok(SymRelation {
            columns,
            rows,
            order_ascending: None,
        })
    }

    fn encode_join(
        &mut self,
        left: &Sql,
        right: &Sql,
        on: &SqlPred,
        kind: JoinKind,
    ) -> Result<SymRelation, EncodeError> {
        let left_rel = self.encode(left)?;
        let right_rel = self.encode(right)?;

        let mut columns = left_rel.columns.clone();
        columns.extend(right_rel.columns.iter().cloned());

        let mut rows = Vec::new();
        for left_row in &left_rel.rows {
            for right_row in &right_rel.rows {
                let mut combined = left_row.columns.clone();
                combined.extend(right_row.columns.iter().cloned());
                let probe = SymRow {
                    presence: Term::TRUE,
                    columns: combined,
                    order_key: None,
                };
                let (on_true, _) = self.eval_pred(on, &columns, &probe)?;
                rows.push(SymRow {
                    presence: Term::and(vec![
                        left_row.presence.clone(),
                        right_row.presence.clone(),
                        on_true,
                    ]),
                    columns: probe.columns,
                    order_key: None,
                });
            }
        }

        if kind == JoinKind::Left {
            // One padded row per left row, present when nothing matched.
            for left_row in &left_rel.rows {
                let mut no_match = vec![left_row.presence.clone()];
                for right_row in &right_rel.rows {
                    let mut combined = left_row.columns.clone();
                    combined.extend(right_row.columns.iter().cloned());
                    let probe = SymRow {
                        presence: Term::TRUE,
                        columns: combined,
                        order_key: None,
                    };
                    let (on_true, _) = self.eval_pred(on, &columns, &probe)?;
                    no_match.push(Term::not(Term::and(vec![
                        right_row.presence.clone(),
                        on_true,
                    ])));
                }
                let mut padded = left_row.columns.clone();
                padded.extend(
                    std::iter::repeat_with(SymValue::null_value)
                        .take(right_rel.columns.len()),
                );
                rows.push(SymRow {
                    presence: Term::and(no_match),
                    columns: padded,
                    order_key: None,
                });
            }
        }

        Ok(SymRelation {
            columns,
            rows,
            order_ascending: None,
        })
    }

    fn encode_select(&mut self, sub: &Sql, pred: &SqlPred) -> Result<SymRelation, EncodeError> {
        let mut relation = self.encode(sub)?;
        for idx in 0..relation.rows.len() {
            let (is_true, _) = self.eval_pred(pred, &relation.columns, &relation.rows[idx])?;
            let presence = relation.rows[idx].presence.clone();
            relation.rows[idx].presence = Term::and(vec![presence, is_true]);
        }
        Ok(relation)
    }

    fn encode_project(
        &mut self,
        sub: &Sql,
        items: &[ProjectItem],
    ) -> Result<SymRelation, EncodeError> {
        let input = self.encode(sub)?;

        // `SELECT *` keeps the input relation as-is.
        if items.len() == 1 && items[0].expr == SqlExpr::Star {
            return Ok(input);
        }

        let columns: Vec<ColumnRef> = items
            .iter()
            .map(|item| ColumnRef {
                table: None,
                name: item.alias.clone(),
            })
            .collect();

        let mut rows = Vec::with_capacity(input.rows.len());
        for row in &input.rows {
            let mut out_columns = Vec::with_capacity(items.len());
            for item in items {
                if item.expr == SqlExpr::Star {
                    return Err(EncodeError::not_supported(
                        "`*` mixed with other projection items",
                    ));
                }
                out_columns.push(self.eval_expr(&item.expr, &input.columns, row)?);
            }
            rows.push(SymRow {
                presence: row.presence.clone(),
                columns: out_columns,
                order_key: None,
            });
        }

        Ok(SymRelation {
            columns,
            rows,
            order_ascending: None,
        })
    }

    fn encode_union(
        &mut self,
        left: &Sql,
        right: &Sql,
        all: bool,
    ) -> Result<SymRelation, EncodeError> {
        let left_rel = self.encode(left)?;
        let right_rel = self.encode(right)?;
        if left_rel.arity() != right_rel.arity() {
            return Err(EncodeError::ColumnCountMismatch {
                left: left_rel.arity(),
                right: right_rel.arity(),
            });
        }

        let mut rows = left_rel.rows;
        rows.extend(right_rel.rows);

        if !all {
            // Keep the first live occurrence of each row value.
            let originals = rows.clone();
            for idx in 0..rows.len() {
                let mut keep = vec![originals[idx].presence.clone()];
                for earlier in originals.iter().take(idx) {
                    keep.push(Term::not(Term::and(vec![
                        earlier.presence.clone(),
                        row_same(&originals[idx], earlier),
                    ])));
                }
                rows[idx].presence = Term::and(keep);
            }
        }

        Ok(SymRelation {
            columns: left_rel.columns,
            rows,
            order_ascending: None,
        })
    }

    fn encode_group_by(
        &mut self,
        sub: &Sql,
        keys: &[SqlExpr],
        items: &[ProjectItem],
        having: Option<&SqlPred>,
    ) -> Result<SymRelation, EncodeError> {
        let input = self.encode(sub)?;
        let n = input.rows.len();

        // Evaluate group keys once per input row.
        let mut key_values: Vec<Vec<SymValue>> = Vec::with_capacity(n);
        for row in &input.rows {
            let mut values = Vec::with_capacity(keys.len());
            for key in keys {
                values.push(self.eval_expr(key, &input.columns, row)?);
            }
            key_values.push(values);
        }

        let keys_same = |i: usize, j: usize| -> Term {
            Term::and(
                key_values[i]
                    .iter()
                    .zip(key_values[j].iter())
                    .map(|(a, b)| {
                        encode_same(
                            a.null.clone(),
                            b.null.clone(),
                            a.value.clone(),
                            b.value.clone(),
                        )
                    })
                    .collect(),
            )
        };

        let columns: Vec<ColumnRef> = items
            .iter()
            .map(|item| ColumnRef {
                table: None,
                name: item.alias.clone(),
            })
            .collect();
        let mut out_rows = Vec::new();

        if keys.is_empty() {
            // Global aggregate: one output row over all live input rows,
            // present even when the input is empty.
            let scope = GroupScope {
                group_tuple: self.ctx.fresh_tuple(),
                guard: Term::TRUE,
                members: input.rows.iter().map(|r| r.presence.clone()).collect(),
                input: &input,
                representative: if n > 0 { Some(0) } else { None },
            };
            let mut out_columns = Vec::with_capacity(items.len());
            for item in items {
                out_columns.push(self.eval_group_expr(&item.expr, &scope)?);
            }
            let mut presence = Term::TRUE;
            if let Some(having) = having {
                let (is_true, _) = self.eval_group_pred(having, &scope)?;
                presence = is_true;
            }
            out_rows.push(SymRow {
                presence,
                columns: out_columns,
                order_key: None,
            });
        } else {
            for i in 0..n {
                let members: Vec<Term> = (0..n)
                    .map(|j| {
                        Term::and(vec![input.rows[j].presence.clone(), keys_same(i, j)])
                    })
                    .collect();

                // The row is the group's representative when it is live and
                // no earlier live row shares its key; this yields exactly
                // one output tuple per group.
                let mut first = vec![input.rows[i].presence.clone()];
                for member in members.iter().take(i) {
                    first.push(Term::not(member.clone()));
                }
                let first_of_group = Term::and(first);

                let scope = GroupScope {
                    group_tuple: self.ctx.fresh_tuple(),
                    guard: input.rows[i].presence.clone(),
                    members,
                    input: &input,
                    representative: Some(i),
                };

                let mut out_columns = Vec::with_capacity(items.len());
                for item in items {
                    out_columns.push(self.eval_group_expr(&item.expr, &scope)?);
                }
                let mut presence = first_of_group;
                if let Some(having) = having {
                    let (is_true, _) = self.eval_group_pred(having, &scope)?;
                    presence = Term::and(vec![presence, is_true]);
                }
                out_rows.push(SymRow {
                    presence,
                    columns: out_columns,
                    order_key: None,
                });
            }
        }

        Ok(SymRelation {
            columns,
            rows: out_rows,
            order_ascending: None,
        })
    }

    // ------------------------------------------------------------ expressions

    fn resolve_column(
        columns: &[ColumnRef],
        table: &Option<String>,
        name: &str,
    ) -> Result<usize, EncodeError> {
        if let Some(table) = table {
            if let Some(idx) = columns
                .iter()
                .position(|c| c.table.as_deref() == Some(table.as_str()) && c.name == name)
            {
                return Ok(idx);
            }
        }
        let matches: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name == name)
            .map(|(idx, _)| idx)
            .collect();
        let display = match table {
            Some(table) => format!("{}.{}", table, name),
            None => name.to_string(),
        };
        match matches.len() {
            0 => Err(EncodeError::ColumnNotFound { column: display }),
            1 => Ok(matches[0]),
            _ => Err(EncodeError::AmbiguousColumn { column: display }),
        }
    }

    fn eval_expr(
        &mut self,
        expr: &SqlExpr,
        columns: &[ColumnRef],
        row: &SymRow,
    ) -> Result<SymValue, EncodeError> {
        match expr {
            SqlExpr::Column { table, column } => {
                let idx = Self::resolve_column(columns, table, column)?;
                Ok(row.columns[idx].clone())
            }
            SqlExpr::Number(n) => Ok(SymValue::known(Term::IntLit(*n))),
            SqlExpr::StringLit(s) => {
                let code = self.ctx.intern_string(s);
                Ok(SymValue::known(Term::IntLit(code)))
            }
            SqlExpr::Cast { expr, ty } => {
                if ty.is_unsupported() {
                    return Err(EncodeError::not_supported(format!(
                        "CAST to {}",
                        ty.name()
                    )));
                }
                // Int, boolean and date casts are identities over the
                // integer value space.
                self.eval_expr(expr, columns, row)
            }
            SqlExpr::Star => Err(EncodeError::not_supported(
                "`*` outside COUNT(*) or a bare projection",
            )),
            SqlExpr::Aggregate { .. } => Err(EncodeError::not_supported(
                "aggregate outside a GROUP BY output",
            )),
        }
    }

    /// Three-valued evaluation: returns (is-true, is-false).
    fn eval_pred(
        &mut self,
        pred: &SqlPred,
        columns: &[ColumnRef],
        row: &SymRow,
    ) -> Result<(Term, Term), EncodeError> {
        match pred {
            SqlPred::Compare { op, left, right } => {
                let l = self.eval_expr(left, columns, row)?;
                let r = self.eval_expr(right, columns, row)?;
                Ok(compare_terms(*op, &l, &r))
            }
            SqlPred::And(a, b) => {
                let (at, af) = self.eval_pred(a, columns, row)?;
                let (bt, bf) = self.eval_pred(b, columns, row)?;
                Ok((Term::and(vec![at, bt]), Term::or(vec![af, bf])))
            }
            SqlPred::Or(a, b) => {
                let (at, af) = self.eval_pred(a, columns, row)?;
                let (bt, bf) = self.eval_pred(b, columns, row)?;
                Ok((Term::or(vec![at, bt]), Term::and(vec![af, bf])))
            }
            SqlPred::Not(sub) => {
                let (st, sf) = self.eval_pred(sub, columns, row)?;
                Ok((sf, st))
            }
        }
    }

    // ------------------------------------------------------------ aggregates

    fn eval_group_expr(
        &mut self,
        expr: &SqlExpr,
        scope: &GroupScope<'_>,
    ) -> Result<SymValue, EncodeError> {
        match expr {
            SqlExpr::Aggregate { func, arg } => self.make_aggregate(*func, arg, scope),
            SqlExpr::Cast { expr, ty } => {
                if ty.is_unsupported() {
                    return Err(EncodeError::not_supported(format!(
                        "CAST to {}",
                        ty.name()
                    )));
                }
                self.eval_group_expr(expr, scope)
            }
            other => {
                let Some(rep) = scope.representative else {
                    return Err(EncodeError::not_supported(
                        "non-aggregate output over an empty grouped relation",
                    ));
                };
                self.eval_expr(other, &scope.input.columns, &scope.input.rows[rep])
            }
        }
    }

    fn eval_group_pred(
        &mut self,
        pred: &SqlPred,
        scope: &GroupScope<'_>,
    ) -> Result<(Term, Term), EncodeError> {
        match pred {
            SqlPred::Compare { op, left, right } => {
                let l = self.eval_group_expr(left, scope)?;
                let r = self.eval_group_expr(right, scope)?;
                Ok(compare_terms(*op, &l, &r))
            }
            SqlPred::And(a, b) => {
                let (at, af) = self.eval_group_pred(a, scope)?;
                let (bt, bf) = self.eval_group_pred(b, scope)?;
                Ok((Term::and(vec![at, bt]), Term::or(vec![af, bf])))
            }
            SqlPred::Or(a, b) => {
                let (at, af) = self.eval_group_pred(a, scope)?;
                let (bt, bf) = self.eval_group_pred(b, scope)?;
                Ok((Term::or(vec![at, bt]), Term::and(vec![af, bf])))
            }
            SqlPred::Not(sub) => {
                let (st, sf) = self.eval_group_pred(sub, scope)?;
                Ok((sf, st))
            }
        }
    }

    /// Build the symbolic value of one aggregate over a group, asserting
    /// its defining constraints into the context.
    fn make_aggregate(
        &mut self,
        func: AggregateFn,
        arg: &SqlExpr,
        scope: &GroupScope<'_>,
    ) -> Result<SymValue, EncodeError> {
        let group = Term::var(scope.group_tuple.as_str());

        // COUNT(*) counts live members regardless of nulls, under the
        // shared label.
        if func == AggregateFn::Count && *arg == SqlExpr::Star {
            let value = Term::app(
                AGG_COUNT_FN,
                vec![group, Term::var(COUNT_ALL_LABEL)],
            );
            let total = Term::add(
                scope
                    .members
                    .iter()
                    .map(|m| Term::count_if(m.clone()))
                    .collect(),
            );
            self.ctx.assert(Term::implies(
                scope.guard.clone(),
                Term::eq(value.clone(), total),
            ));
            return Ok(SymValue::known(value));
        }

        if *arg == SqlExpr::Star {
            return Err(EncodeError::not_supported(format!(
                "{}(*)",
                func.name()
            )));
        }

        // Evaluate the aggregated expression on every input row.
        let mut element: Vec<SymValue> = Vec::with_capacity(scope.members.len());
        for row in &scope.input.rows {
            element.push(self.eval_expr(arg, &scope.input.columns, row)?);
        }
        let live: Vec<Term> = scope
            .members
            .iter()
            .zip(element.iter())
            .map(|(member, e)| Term::and(vec![member.clone(), Term::not(e.null.clone())]))
            .collect();
        let live_count = Term::add(live.iter().map(|m| Term::count_if(m.clone())).collect());
        let all_null = Term::eq(live_count.clone(), Term::IntLit(0));

        let label = self.ctx.fresh_label();
        let label_term = Term::var(label.as_str());

        let value = match func {
            AggregateFn::Count => {
                let value = Term::app(AGG_COUNT_FN, vec![group, label_term]);
                self.ctx.assert(Term::implies(
                    scope.guard.clone(),
                    Term::eq(value.clone(), live_count),
                ));
                return Ok(SymValue::known(value));
            }
            AggregateFn::Sum => {
                let value = Term::app(AGG_SUM_FN, vec![group, label_term]);
                let total = Term::add(
                    live.iter()
                        .zip(element.iter())
                        .map(|(m, e)| Term::ite(m.clone(), e.value.clone(), Term::IntLit(0)))
                        .collect(),
                );
                self.ctx.assert(Term::implies(
                    scope.guard.clone(),
                    Term::eq(value.clone(), total),
                ));
                value
            }
            AggregateFn::Min | AggregateFn::Max => {
                let fn_name = if func == AggregateFn::Min {
                    AGG_MIN_FN
                } else {
                    AGG_MAX_FN
                };
                let value = Term::app(fn_name, vec![group, label_term]);
                // Bound constraints: the aggregate bounds every live
                // element and is witnessed by one of them.
                for (m, e) in live.iter().zip(element.iter()) {
                    let bound = if func == AggregateFn::Min {
                        Term::le(value.clone(), e.value.clone())
                    } else {
                        Term::ge(value.clone(), e.value.clone())
                    };
                    self.ctx.assert(Term::implies(
                        Term::and(vec![scope.guard.clone(), m.clone()]),
                        bound,
                    ));
                }
                let witnesses: Vec<Term> = live
                    .iter()
                    .zip(element.iter())
                    .map(|(m, e)| {
                        Term::and(vec![m.clone(), Term::eq(value.clone(), e.value.clone())])
                    })
                    .collect();
                self.ctx.assert(Term::implies(
                    Term::and(vec![scope.guard.clone(), Term::not(all_null.clone())]),
                    Term::or(witnesses),
                ));
                value
            }
            AggregateFn::Avg => {
                let value = Term::app(AGG_AVG_FN, vec![group, label_term]);
                let total = Term::add(
                    live.iter()
                        .zip(element.iter())
                        .map(|(m, e)| Term::ite(m.clone(), e.value.clone(), Term::IntLit(0)))
                        .collect(),
                );
                // Integer floor division: value = sum div count.
                let lower = Term::le(
                    Term::mul(value.clone(), live_count.clone()),
                    total.clone(),
                );
                let upper = Term::lt(
                    total,
                    Term::mul(
                        Term::add(vec![value.clone(), Term::IntLit(1)]),
                        live_count.clone(),
                    ),
                );
                self.ctx.assert(Term::implies(
                    Term::and(vec![
                        scope.guard.clone(),
                        Term::gt(live_count.clone(), Term::IntLit(0)),
                    ]),
                    Term::and(vec![lower, upper]),
                ));
                value
            }
        };

        // SUM/MIN/MAX/AVG over an all-null (or empty) group are NULL.
        Ok(SymValue {
            value,
            null: all_null,
        })
    }
}

fn compare_terms(op: CompareOp, l: &SymValue, r: &SymValue) -> (Term, Term) {
    let strict =
        |value_cmp: Term| -> Term {
            Term::and(vec![
                Term::not(l.null.clone()),
                Term::not(r.null.clone()),
                value_cmp,
            ])
        };
    match op {
        CompareOp::Eq => (
            encode_equality(
                l.null.clone(),
                r.null.clone(),
                l.value.clone(),
                r.value.clone(),
            ),
            encode_inequality(
                l.null.clone(),
                r.null.clone(),
                l.value.clone(),
                r.value.clone(),
            ),
        ),
        CompareOp::Neq => (
            encode_inequality(
                l.null.clone(),
                r.null.clone(),
                l.value.clone(),
                r.value.clone(),
            ),
            encode_equality(
                l.null.clone(),
                r.null.clone(),
                l.value.clone(),
                r.value.clone(),
            ),
        ),
        CompareOp::Lt => (
            strict(Term::lt(l.value.clone(), r.value.clone())),
            strict(Term::ge(l.value.clone(), r.value.clone())),
        ),
        CompareOp::Lte => (
            strict(Term::le(l.value.clone(), r.value.clone())),
            strict(Term::gt(l.value.clone(), r.value.clone())),
        ),
        CompareOp::Gt => (
            strict(Term::gt(l.value.clone(), r.value.clone())),
            strict(Term::le(l.value.clone(), r.value.clone())),
        ),
        CompareOp::Gte => (
            strict(Term::ge(l.value.clone(), r.value.clone())),
            strict(Term::lt(l.value.clone(), r.value.clone())),
        ),
    }
}
