use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranspileError {
    /// A pattern label has no rule in the SDT / no induced table.
    #[error("No induced table for label `{label}` (check the graph schema)")]
    SchemaMismatch { label: String },

    /// An expression references a variable no pattern binds.
    #[error("Variable `{var}` is not bound by any MATCH pattern")]
    UnboundVariable { var: String },

    /// Two RETURN items share an output name.
    #[error("Duplicate RETURN alias `{alias}`")]
    DuplicateAlias { alias: String },

    /// `AGG(AGG(..))` has no SQL meaning here.
    #[error("Aggregates cannot be nested")]
    NestedAggregate,

    /// Aggregates are only allowed in RETURN items.
    #[error("Aggregates are not allowed in {place}")]
    AggregateNotAllowed { place: &'static str },

    /// `*` outside of COUNT(*).
    #[error("`*` is only valid inside COUNT(*)")]
    StarOutsideCount,
}
