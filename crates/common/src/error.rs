use thiserror::Error;

#[derive(Debug, Error)]
pub enum TandemError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type TandemResult<T> = Result<T, TandemError>;
