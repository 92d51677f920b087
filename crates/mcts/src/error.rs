use thiserror::Error;

#[derive(Error, Debug)]
pub enum MctsError {
    #[error("Terminal position cannot be searched")]
    TerminalPosition,

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Invalid node ID: {0}")]
    InvalidNodeId(usize),

    #[error("Root node not initialized")]
    RootNotInitialized,

    #[error("Dirichlet sampling error: {0}")]
    DirichletError(String),

    #[error("Search cancelled")]
    Cancelled,
}

/// Failures reported by an evaluator. The search never surfaces these; it
/// falls back to the material estimate instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    #[error("No evaluator available")]
    Unavailable,

    #[error("Expected policy of length {expected}, got {actual}")]
    BadPolicyLength { expected: usize, actual: usize },

    #[error("Evaluation failed: {0}")]
    Failed(String),

    #[error("Batching worker stopped")]
    WorkerStopped,
}

pub type Result<T> = std::result::Result<T, MctsError>;
