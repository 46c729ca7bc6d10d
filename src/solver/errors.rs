use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolverError {
    #[error("Failed to start solver `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("I/O error talking to the solver: {0}")]
    Io(String),

    #[error("Solver wall-clock deadline exceeded")]
    Timeout,

    #[error("Solver stream closed unexpectedly")]
    ClosedStream,

    #[error("Unexpected solver output: {0}")]
    Unexpected(String),

    #[error("Malformed model response: {0}")]
    Model(String),
}
