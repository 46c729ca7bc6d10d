use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Label `{label}` is declared more than once")]
    DuplicateLabel { label: String },

    #[error("Label `{label}` is not a valid identifier")]
    InvalidLabel { label: String },

    #[error("Edge `{edge}` references unknown node label `{label}`")]
    MissingNodeLabel { edge: String, label: String },

    #[error("Type `{label}` must declare at least one key attribute")]
    NoKeys { label: String },

    #[error("Table `{name}` already exists in the relational schema")]
    DuplicateTable { name: String },

    #[error("No table named `{name}` in the relational schema")]
    UnknownTable { name: String },

    #[error("Failed to parse graph schema: {message}")]
    Parse { message: String },
}
