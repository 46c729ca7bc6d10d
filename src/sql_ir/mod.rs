//! Relational-algebra IR shared by the transpiler, the SQL front end, the
//! printer and the symbolic encoder.
//!
//! Structural equality (`PartialEq`) on these types is what GROUP BY key
//! deduplication uses.

pub mod printer;

pub use printer::ToSql;

/// Aggregate functions in the supported SQL subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFn {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFn::Count),
            "SUM" => Some(AggregateFn::Sum),
            "AVG" => Some(AggregateFn::Avg),
            "MIN" => Some(AggregateFn::Min),
            "MAX" => Some(AggregateFn::Max),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFn::Count => "COUNT",
            AggregateFn::Sum => "SUM",
            AggregateFn::Avg => "AVG",
            AggregateFn::Min => "MIN",
            AggregateFn::Max => "MAX",
        }
    }
}

/// Cast targets. Only `int`/`boolean`/`date` are encodable; the rest are
/// recognized so the encoder can refuse them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Int,
    Boolean,
    Date,
    Varchar,
    Time,
    Timestamp,
}

impl CastType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" => Some(CastType::Int),
            "BOOL" | "BOOLEAN" => Some(CastType::Boolean),
            "DATE" => Some(CastType::Date),
            "VARCHAR" | "TEXT" | "CHAR" => Some(CastType::Varchar),
            "TIME" => Some(CastType::Time),
            "TIMESTAMP" => Some(CastType::Timestamp),
            _ => None,
        }
    }

    /// Cast kinds the symbolic encoder has no integer model for.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CastType::Varchar | CastType::Time | CastType::Timestamp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CastType::Int => "INTEGER",
            CastType::Boolean => "BOOLEAN",
            CastType::Date => "DATE",
            CastType::Varchar => "VARCHAR",
            CastType::Time => "TIME",
            CastType::Timestamp => "TIMESTAMP",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// `alias.column` or a bare `column`
    Column {
        table: Option<String>,
        column: String,
    },
    Star,
    Number(i64),
    StringLit(String),
    Aggregate {
        func: AggregateFn,
        arg: Box<SqlExpr>,
    },
    Cast {
        expr: Box<SqlExpr>,
        ty: CastType,
    },
}

impl SqlExpr {
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        SqlExpr::Column {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    pub fn bare_column(column: impl Into<String>) -> Self {
        SqlExpr::Column {
            table: None,
            column: column.into(),
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        match self {
            SqlExpr::Aggregate { .. } => true,
            SqlExpr::Cast { expr, .. } => expr.contains_aggregate(),
            _ => false,
        }
    }

    /// The outermost cast type, if this output expression is a cast.
    pub fn cast_type(&self) -> Option<CastType> {
        match self {
            SqlExpr::Cast { ty, .. } => Some(*ty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlPred {
    Compare {
        op: CompareOp,
        left: SqlExpr,
        right: SqlExpr,
    },
    And(Box<SqlPred>, Box<SqlPred>),
    Or(Box<SqlPred>, Box<SqlPred>),
    Not(Box<SqlPred>),
}

impl SqlPred {
    pub fn and(left: SqlPred, right: SqlPred) -> Self {
        SqlPred::And(Box::new(left), Box::new(right))
    }

    /// Fold a list of predicates into a right-leaning AND chain.
    pub fn and_all(mut preds: Vec<SqlPred>) -> Option<SqlPred> {
        let mut acc = preds.pop()?;
        while let Some(pred) = preds.pop() {
            acc = SqlPred::And(Box::new(pred), Box::new(acc));
        }
        Some(acc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// One projected output column.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    pub alias: String,
    pub expr: SqlExpr,
}

impl ProjectItem {
    pub fn new(alias: impl Into<String>, expr: SqlExpr) -> Self {
        ProjectItem {
            alias: alias.into(),
            expr,
        }
    }
}

/// Relational-algebra nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Sql {
    FromTable {
        table: String,
        alias: String,
    },
    Join {
        left: Box<Sql>,
        right: Box<Sql>,
        on: SqlPred,
        kind: JoinKind,
    },
    Select {
        sub: Box<Sql>,
        pred: SqlPred,
    },
    Project {
        sub: Box<Sql>,
        items: Vec<ProjectItem>,
    },
    GroupBy {
        sub: Box<Sql>,
        keys: Vec<SqlExpr>,
        items: Vec<ProjectItem>,
        having: Option<SqlPred>,
    },
    OrderBy {
        sub: Box<Sql>,
        key: SqlExpr,
        ascending: bool,
    },
    Union {
        left: Box<Sql>,
        right: Box<Sql>,
        all: bool,
    },
    With {
        name: String,
        sub: Box<Sql>,
        body: Box<Sql>,
    },
}

impl Sql {
    pub fn from_table(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Sql::FromTable {
            table: table.into(),
            alias: alias.into(),
        }
    }

    pub fn join(left: Sql, right: Sql, on: SqlPred, kind: JoinKind) -> Self {
        Sql::Join {
            left: Box::new(left),
            right: Box::new(right),
            on,
            kind,
        }
    }

    /// Output columns of this relation, as `(alias, expr)` pairs, when the
    /// node has an explicit projection. `None` for raw join trees.
    pub fn output_items(&self) -> Option<&[ProjectItem]> {
        match self {
            Sql::Project { items, .. } | Sql::GroupBy { items, .. } => Some(items),
            Sql::OrderBy { sub, .. } | Sql::With { body: sub, .. } => sub.output_items(),
            Sql::Select { sub, .. } => sub.output_items(),
            Sql::Union { left, .. } => left.output_items(),
            Sql::FromTable { .. } | Sql::Join { .. } => None,
        }
    }
}
