//! Error types for csv2zaim

use thiserror::Error;

use crate::models::ReferenceKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not resolve {kind}: {name}")]
    Unresolved { kind: ReferenceKind, name: String },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid date on line {line}: {value}")]
    InvalidDate { line: u64, value: String },

    #[error("Invalid amount on line {line}: {value}")]
    InvalidAmount { line: u64, value: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zaim API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
