use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to (de)serialize saved game: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Saved game is inconsistent: {0}")]
    InconsistentRecord(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
