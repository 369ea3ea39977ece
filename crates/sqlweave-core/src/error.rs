use thiserror::Error;

/// Core error type shared across sqlweave crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A constraint or call-shape check rejected the operation before
    /// any SQL was sent.
    #[error("validation error: {0}")]
    Validation(String),
    /// The translate stage received an operation shape validation
    /// should have caught.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The operation requires an open connection, or the database is in
    /// the wrong lifecycle state.
    #[error("state error: {0}")]
    State(String),
    /// A column definition could not be parsed.
    #[error("invalid column definition: {0}")]
    Definition(String),
    /// Failure reported by the driver boundary. Propagated unchanged.
    #[error("driver error: {0}")]
    Driver(String),
}

/// Convenience alias for results returned by sqlweave crates.
pub type Result<T> = std::result::Result<T, Error>;
