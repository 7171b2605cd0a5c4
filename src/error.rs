//! Error types for Workfolio.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Review text is empty")]
    EmptyReview,

    #[error("Faculty member {0} not found")]
    FacultyNotFound(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
