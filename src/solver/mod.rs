//! Narrow interface to the external SMT solver: a term AST, SMT-LIB 2
//! printing, a cancellable process driver and a model-value reader.

pub mod errors;
pub mod model;
pub mod process;
pub mod smtlib;
pub mod term;

pub use errors::SolverError;
pub use model::SmtValue;
pub use process::{SmtResult, SmtSolver};
pub use smtlib::{assert_line, Decl};
pub use term::{encode_equality, encode_inequality, encode_same, Sort, Term};
