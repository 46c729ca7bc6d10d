//! The induced relational schema: tables with columns, primary keys and
//! foreign keys, derived mechanically from a graph schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::SchemaError;

/// Reserved column holding the source-node key on edge tables.
pub const SRC_COLUMN: &str = "SRC";
/// Reserved column holding the target-node key on edge tables.
pub const TGT_COLUMN: &str = "TGT";

/// Column types recognized by the symbolic encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Int,
    Boolean,
    Date,
    Varchar,
}

impl ColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Int => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Varchar => "VARCHAR(20)",
        }
    }
}

/// Whether a table was induced from a node type or an edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Node,
    Edge,
}

/// One induced table. `name` is the lowercased label; `label` keeps the
/// original graph label for counterexample rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub label: String,
    pub kind: TableKind,
    pub attrs: Vec<String>,
    pub pk: String,
    /// attribute -> (foreign table, foreign primary key)
    pub fks: HashMap<String, (String, String)>,
    pub column_types: HashMap<String, ColumnType>,
}

impl Table {
    pub fn has_attr(&self, attr: &str) -> bool {
        self.attrs.iter().any(|a| a == attr)
    }

    /// Declared type of a column, defaulting to `int`.
    pub fn column_type(&self, attr: &str) -> ColumnType {
        self.column_types.get(attr).copied().unwrap_or_default()
    }
}

/// Ordered collection of induced tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationalSchema {
    tables: Vec<Table>,
}

impl RelationalSchema {
    pub fn new() -> Self {
        RelationalSchema::default()
    }

    pub fn add_table(&mut self, table: Table) -> Result<(), SchemaError> {
        if self.get(&table.name).is_some() {
            return Err(SchemaError::DuplicateTable { name: table.name });
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&Table, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownTable {
            name: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
