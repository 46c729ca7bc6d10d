use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EncodeError {
    /// Recognized construct the symbolic model cannot express.
    #[error("Not supported by the symbolic encoder: {feature}")]
    NotSupported { feature: String },

    #[error("Column `{column}` not found in the current relation")]
    ColumnNotFound { column: String },

    #[error("Column `{column}` is ambiguous in the current relation")]
    AmbiguousColumn { column: String },

    #[error("Table `{name}` is neither a base table nor a CTE")]
    UnknownTable { name: String },

    #[error("UNION operands have {left} and {right} columns")]
    ColumnCountMismatch { left: usize, right: usize },

    /// Invariant violation inside the encoder. Fatal.
    #[error("Internal encoder error: {message}")]
    Internal { message: String },
}

impl EncodeError {
    pub fn not_supported(feature: impl Into<String>) -> Self {
        EncodeError::NotSupported {
            feature: feature.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        EncodeError::Internal {
            message: message.into(),
        }
    }
}
