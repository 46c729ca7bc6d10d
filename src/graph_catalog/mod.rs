//! Graph schema, induced relational schema, and the schema-dependent
//! transformation (SDT) relating the two worlds.

pub mod errors;
pub mod graph_schema;
pub mod infer;
pub mod relational_schema;
pub mod sdt;

pub use errors::SchemaError;
pub use graph_schema::{EdgeType, GraphSchema, NodeType};
pub use infer::{infer_sdt, InferResult};
pub use relational_schema::{
    ColumnType, RelationalSchema, Table, TableKind, SRC_COLUMN, TGT_COLUMN,
};
pub use sdt::{Sdt, SdtPredicate, SdtRule};
