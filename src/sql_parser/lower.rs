//! Lower the syntactic SQL AST into the algebraic IR.

use super::ast::{SelectCore, SelectStatement};
use crate::sql_ir::{ProjectItem, Sql, SqlExpr};

/// Default output name for an unaliased select item.
fn default_alias(expr: &SqlExpr, index: usize) -> String {
    match expr {
        SqlExpr::Column { column, .. } => column.clone(),
        SqlExpr::Aggregate { func, .. } => func.name().to_lowercase(),
        SqlExpr::Star => "*".to_string(),
        _ => format!("col{}", index + 1),
    }
}

fn lower_core(core: &SelectCore) -> Sql {
    let mut relation = Sql::from_table(core.from.table.clone(), core.from.binding_name());

    for join in &core.joins {
        relation = Sql::join(
            relation,
            Sql::from_table(join.table.table.clone(), join.table.binding_name()),
            join.on.clone(),
            join.kind,
        );
    }

    if let Some(pred) = &core.where_clause {
        relation = Sql::Select {
            sub: Box::new(relation),
            pred: pred.clone(),
        };
    }

    let items: Vec<ProjectItem> = core
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| ProjectItem {
            alias: item
                .alias
                .clone()
                .unwrap_or_else(|| default_alias(&item.expr, idx)),
            expr: item.expr.clone(),
        })
        .collect();

    let has_aggregate = items.iter().any(|i| i.expr.contains_aggregate());
    if has_aggregate || !core.group_by.is_empty() || core.having.is_some() {
        Sql::GroupBy {
            sub: Box::new(relation),
            keys: core.group_by.clone(),
            items,
            having: core.having.clone(),
        }
    } else {
        Sql::Project {
            sub: Box::new(relation),
            items,
        }
    }
}

/// Lower a full statement: cores joined by UNION, an optional trailing
/// ORDER BY, and CTEs wrapped outermost-first.
pub fn lower(stmt: &SelectStatement) -> Sql {
    let mut relation = lower_core(&stmt.body.first);
    for (all, core) in &stmt.body.unions {
        relation = Sql::Union {
            left: Box::new(relation),
            right: Box::new(lower_core(core)),
            all: *all,
        };
    }
    if let Some(order) = &stmt.body.order_by {
        relation = Sql::OrderBy {
            sub: Box::new(relation),
            key: order.key.clone(),
            ascending: order.ascending,
        };
    }
    for cte in stmt.ctes.iter().rev() {
        relation = Sql::With {
            name: cte.name.clone(),
            sub: Box::new(lower(&cte.query)),
            body: Box::new(relation),
        };
    }
    relation
}
