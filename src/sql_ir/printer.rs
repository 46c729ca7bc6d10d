//! Render IR back to PostgreSQL-dialect text.
//!
//! A `Project` (or `GroupBy`) whose direct child is a `Select` fuses into a
//! single `SELECT … FROM … WHERE …`; any other child relation is wrapped as
//! a subquery with a synthetic alias. Non-union operands of a UNION are
//! parenthesized. String literals escape single quotes by doubling.

use super::{JoinKind, Sql, SqlExpr, SqlPred};

/// Render a node to a SQL string.
pub trait ToSql {
    fn to_sql(&self) -> String;
}

impl ToSql for SqlExpr {
    fn to_sql(&self) -> String {
        match self {
            SqlExpr::Column { table, column } => match table {
                Some(table) => format!("{}.{}", table, column),
                None => column.clone(),
            },
            SqlExpr::Star => "*".to_string(),
            SqlExpr::Number(n) => n.to_string(),
            SqlExpr::StringLit(s) => format!("'{}'", s.replace('\'', "''")),
            SqlExpr::Aggregate { func, arg } => {
                format!("{}({})", func.name(), arg.to_sql())
            }
            SqlExpr::Cast { expr, ty } => {
                format!("CAST({} AS {})", expr.to_sql(), ty.name())
            }
        }
    }
}

impl ToSql for SqlPred {
    fn to_sql(&self) -> String {
        match self {
            SqlPred::Compare { op, left, right } => {
                format!("{} {} {}", left.to_sql(), op.as_str(), right.to_sql())
            }
            SqlPred::And(left, right) => {
                format!("({} AND {})", left.to_sql(), right.to_sql())
            }
            SqlPred::Or(left, right) => {
                format!("({} OR {})", left.to_sql(), right.to_sql())
            }
            SqlPred::Not(sub) => format!("NOT({})", sub.to_sql()),
        }
    }
}

impl ToSql for Sql {
    fn to_sql(&self) -> String {
        match self {
            Sql::Project { sub, items } => {
                let select_list = select_list(items);
                match sub.as_ref() {
                    Sql::Select { sub: inner, pred } => format!(
                        "SELECT {} FROM {} WHERE {}",
                        select_list,
                        from_clause(inner, None),
                        pred.to_sql()
                    ),
                    other => format!(
                        "SELECT {} FROM {}",
                        select_list,
                        from_clause(other, Some("_proj"))
                    ),
                }
            }
            Sql::GroupBy {
                sub,
                keys,
                items,
                having,
            } => {
                let select_list = select_list(items);
                let (from_part, where_part) = match sub.as_ref() {
                    Sql::Select { sub: inner, pred } => (
                        from_clause(inner, None),
                        format!(" WHERE {}", pred.to_sql()),
                    ),
                    other => (from_clause(other, Some("_grp")), String::new()),
                };
                let mut sql = format!("SELECT {} FROM {}{}", select_list, from_part, where_part);
                if !keys.is_empty() {
                    let group_keys: Vec<String> = keys.iter().map(|k| k.to_sql()).collect();
                    sql.push_str(&format!(" GROUP BY {}", group_keys.join(", ")));
                }
                if let Some(having) = having {
                    sql.push_str(&format!(" HAVING {}", having.to_sql()));
                }
                sql
            }
            Sql::Select { sub, pred } => format!(
                "SELECT * FROM {} WHERE {}",
                from_clause(sub, Some("_sel")),
                pred.to_sql()
            ),
            Sql::Union { left, right, all } => {
                let op = if *all { "UNION ALL" } else { "UNION" };
                format!("{} {} {}", wrap_union(left), op, wrap_union(right))
            }
            Sql::OrderBy {
                sub,
                key,
                ascending,
            } => {
                let direction = if *ascending { "ASC" } else { "DESC" };
                format!(
                    "SELECT * FROM ({}) AS _ord ORDER BY {} {}",
                    sub.to_sql(),
                    key.to_sql(),
                    direction
                )
            }
            Sql::With { name, sub, body } => {
                format!("WITH {} AS ({}) {}", name, sub.to_sql(), body.to_sql())
            }
            Sql::Join { .. } => format!("SELECT * FROM {}", from_clause(self, None)),
            Sql::FromTable { table, alias } => {
                format!("SELECT * FROM {} AS {}", table, alias)
            }
        }
    }
}

fn select_list(items: &[super::ProjectItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} AS {}", item.expr.to_sql(), item.alias))
        .collect::<Vec<_>>()
        .join(", ")
}

fn wrap_union(node: &Sql) -> String {
    if matches!(node, Sql::Union { .. }) {
        node.to_sql()
    } else {
        format!("({})", node.to_sql())
    }
}

fn from_clause(node: &Sql, alias: Option<&str>) -> String {
    match node {
        Sql::FromTable { table, alias } => format!("{} AS {}", table, alias),
        Sql::Join {
            left,
            right,
            on,
            kind,
        } => {
            let join_kw = match kind {
                JoinKind::Inner => "INNER JOIN",
                JoinKind::Left => "LEFT JOIN",
            };
            format!(
                "{} {} {} ON {}",
                wrap_from(left),
                join_kw,
                wrap_from(right),
                on.to_sql()
            )
        }
        other => format!("({}) AS {}", other.to_sql(), alias.unwrap_or("_sub")),
    }
}

fn wrap_from(node: &Sql) -> String {
    match node {
        Sql::FromTable { .. } => from_clause(node, None),
        Sql::Join { .. } => from_clause(node, None),
        other => from_clause(other, Some("_wrap")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_ir::{AggregateFn, CompareOp, ProjectItem};

    fn sample_join() -> Sql {
        let on1 = SqlPred::Compare {
            op: CompareOp::Eq,
            left: SqlExpr::column("p", "pid"),
            right: SqlExpr::column("w", "SRC"),
        };
        let on2 = SqlPred::Compare {
            op: CompareOp::Eq,
            left: SqlExpr::column("w", "TGT"),
            right: SqlExpr::column("c", "cid"),
        };
        Sql::join(
            Sql::join(
                Sql::from_table("person", "p"),
                Sql::from_table("works_at", "w"),
                on1,
                JoinKind::Inner,
            ),
            Sql::from_table("company", "c"),
            on2,
            JoinKind::Inner,
        )
    }

    #[test]
    fn test_project_over_join() {
        let sql = Sql::Project {
            sub: Box::new(sample_join()),
            items: vec![
                ProjectItem::new("pid", SqlExpr::column("p", "pid")),
                ProjectItem::new("cid", SqlExpr::column("c", "cid")),
            ],
        };
        assert_eq!(
            sql.to_sql(),
            "SELECT p.pid AS pid, c.cid AS cid FROM \
             (person AS p INNER JOIN works_at AS w ON p.pid = w.SRC) \
             INNER JOIN company AS c ON w.TGT = c.cid"
        );
    }

    #[test]
    fn test_project_fuses_with_select() {
        let sql = Sql::Project {
            sub: Box::new(Sql::Select {
                sub: Box::new(Sql::from_table("person", "p")),
                pred: SqlPred::Compare {
                    op: CompareOp::Gt,
                    left: SqlExpr::column("p", "age"),
                    right: SqlExpr::Number(25),
                },
            }),
            items: vec![ProjectItem::new("name", SqlExpr::column("p", "name"))],
        };
        assert_eq!(
            sql.to_sql(),
            "SELECT p.name AS name FROM person AS p WHERE p.age > 25"
        );
    }

    #[test]
    fn test_group_by_with_keys() {
        let sql = Sql::GroupBy {
            sub: Box::new(Sql::from_table("person", "p")),
            keys: vec![SqlExpr::column("p", "pid")],
            items: vec![
                ProjectItem::new("pid", SqlExpr::column("p", "pid")),
                ProjectItem::new(
                    "n",
                    SqlExpr::Aggregate {
                        func: AggregateFn::Count,
                        arg: Box::new(SqlExpr::Star),
                    },
                ),
            ],
            having: None,
        };
        assert_eq!(
            sql.to_sql(),
            "SELECT p.pid AS pid, COUNT(*) AS n FROM person AS p GROUP BY p.pid"
        );
    }

    #[test]
    fn test_union_parenthesizes_operands() {
        let left = Sql::Project {
            sub: Box::new(Sql::from_table("person", "p")),
            items: vec![ProjectItem::new("n", SqlExpr::column("p", "name"))],
        };
        let right = Sql::Project {
            sub: Box::new(Sql::from_table("company", "c")),
            items: vec![ProjectItem::new("n", SqlExpr::column("c", "title"))],
        };
        let sql = Sql::Union {
            left: Box::new(left),
            right: Box::new(right),
            all: true,
        };
        let text = sql.to_sql();
        assert!(text.starts_with("(SELECT"));
        assert!(text.contains(") UNION ALL (SELECT"));
    }

    #[test]
    fn test_string_escaping() {
        let expr = SqlExpr::StringLit("O'Brien".into());
        assert_eq!(expr.to_sql(), "'O''Brien'");
    }

    #[test]
    fn test_order_by_wraps_subquery() {
        let sql = Sql::OrderBy {
            sub: Box::new(Sql::Project {
                sub: Box::new(Sql::from_table("person", "p")),
                items: vec![ProjectItem::new("name", SqlExpr::column("p", "name"))],
            }),
            key: SqlExpr::bare_column("name"),
            ascending: false,
        };
        assert_eq!(
            sql.to_sql(),
            "SELECT * FROM (SELECT p.name AS name FROM person AS p) AS _ord \
             ORDER BY name DESC"
        );
    }
}
