//! Schema induction: derive the relational schema and the SDT rule set
//! from a graph schema.
//!
//! Every node type becomes a table whose columns are the node keys and
//! whose primary key is the default key. Every edge type becomes a table
//! with the edge keys followed by the reserved `SRC`/`TGT` columns, which
//! are foreign keys into the endpoint tables.

use std::collections::HashMap;

use super::errors::SchemaError;
use super::graph_schema::GraphSchema;
use super::relational_schema::{
    ColumnType, RelationalSchema, Table, TableKind, SRC_COLUMN, TGT_COLUMN,
};
use super::sdt::{Sdt, SdtPredicate, SdtRule};

/// Induced schema plus transformation rules, grouped for convenience.
#[derive(Debug, Clone, PartialEq)]
pub struct InferResult {
    pub schema: RelationalSchema,
    pub sdt: Sdt,
}

/// Derive the induced relational schema and SDT. Deterministic: nodes are
/// processed in insertion order, then edges.
pub fn infer_sdt(gschema: &GraphSchema) -> Result<InferResult, SchemaError> {
    gschema.validate()?;

    let mut schema = RelationalSchema::new();
    let mut sdt = Sdt::new();

    for node in &gschema.nodes {
        let table_name = node.label.to_lowercase();
        schema.add_table(Table {
            name: table_name.clone(),
            label: node.label.clone(),
            kind: TableKind::Node,
            attrs: node.keys.clone(),
            pk: node.default_key().to_string(),
            fks: HashMap::new(),
            column_types: node.types.clone(),
        })?;
        sdt.add_rule(SdtRule {
            left: SdtPredicate::new(node.label.clone(), node.keys.clone()),
            right: SdtPredicate::new(table_name, node.keys.clone()),
        });
    }

    for edge in &gschema.edges {
        let table_name = edge.label.to_lowercase();
        let mut attrs = edge.keys.clone();
        attrs.push(SRC_COLUMN.to_string());
        attrs.push(TGT_COLUMN.to_string());

        let src_table = schema.require(&edge.src.to_lowercase())?.clone();
        let tgt_table = schema.require(&edge.tgt.to_lowercase())?.clone();

        let mut fks = HashMap::new();
        fks.insert(SRC_COLUMN.to_string(), (src_table.name, src_table.pk));
        fks.insert(TGT_COLUMN.to_string(), (tgt_table.name, tgt_table.pk));

        // SRC/TGT take the type of the key they reference.
        let mut column_types: HashMap<String, ColumnType> = edge.types.clone();
        if let Some((table, pk)) = fks.get(SRC_COLUMN) {
            let referenced = schema.require(table)?.column_type(pk);
            column_types.insert(SRC_COLUMN.to_string(), referenced);
        }
        if let Some((table, pk)) = fks.get(TGT_COLUMN) {
            let referenced = schema.require(table)?.column_type(pk);
            column_types.insert(TGT_COLUMN.to_string(), referenced);
        }

        schema.add_table(Table {
            name: table_name.clone(),
            label: edge.label.clone(),
            kind: TableKind::Edge,
            attrs: attrs.clone(),
            pk: edge.default_key().to_string(),
            fks,
            column_types,
        })?;

        let mut left_args = edge.keys.clone();
        left_args.push(SRC_COLUMN.to_string());
        left_args.push(TGT_COLUMN.to_string());
        sdt.add_rule(SdtRule {
            left: SdtPredicate::new(edge.label.clone(), left_args),
            right: SdtPredicate::new(table_name, attrs),
        });
    }

    Ok(InferResult { schema, sdt })
}
