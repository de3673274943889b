use thiserror::Error;

use crate::patterns::Field;

#[derive(Error, Debug)]
pub enum BirrError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Missing field: {0}")]
    MissingField(Field),

    #[error("Invalid amount for {field}: {value:?}")]
    InvalidAmount { field: Field, value: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BirrError>;
