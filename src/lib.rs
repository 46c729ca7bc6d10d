//! grapheq - bounded equivalence checking between Cypher queries and their
//! SQL translations.
//!
//! The pipeline:
//! - derive an induced relational schema and rewrite rules from a graph
//!   schema (`graph_catalog`),
//! - parse the Cypher and SQL inputs (`cypher_parser`, `sql_parser`) into a
//!   shared relational IR (`sql_ir`),
//! - transpile the Cypher side onto that IR (`transpiler`),
//! - encode both sides over a bounded symbolic database and ask an external
//!   SMT solver for a counterexample (`encoder`, `solver`),
//! - classify the result and render counterexamples (`verifier`).

pub mod config;
pub mod cypher_parser;
pub mod encoder;
pub mod graph_catalog;
pub mod solver;
pub mod sql_ir;
pub mod sql_parser;
pub mod table_compare;
pub mod transpiler;
pub mod verifier;
