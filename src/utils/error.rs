// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the engine
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unknown filing type: {0}")]
    UnknownFilingType(String),

    #[error("Unknown item id '{item}' for filing type {filing_type}")]
    UnknownItemId { filing_type: String, item: String },

    #[error("Invalid heading pattern for item {item}: {source}")]
    Pattern {
        item: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Document is empty after normalization")]
    EmptyDocument,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}
