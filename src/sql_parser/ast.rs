//! Syntactic AST for the supported SQL subset. Expressions and predicates
//! reuse the IR forms directly; the statement layer keeps the clause
//! structure of the input until lowering.

use crate::sql_ir::{JoinKind, SqlExpr, SqlPred};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub ctes: Vec<Cte>,
    pub body: SelectBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub query: SelectStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectBody {
    pub first: SelectCore,
    /// `(all, core)` pairs for each UNION branch, in source order.
    pub unions: Vec<(bool, SelectCore)>,
    pub order_by: Option<OrderSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub key: SqlExpr,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectCore {
    pub items: Vec<SelectItem>,
    pub from: TableRef,
    pub joins: Vec<JoinSpec>,
    pub where_clause: Option<SqlPred>,
    pub group_by: Vec<SqlExpr>,
    pub having: Option<SqlPred>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: SqlExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// The name the relation is visible under.
    pub fn binding_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: SqlPred,
}
