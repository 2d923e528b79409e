use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PanelError {
    #[error("invalid metric: {0}")]
    InvalidMetric(String),

    #[error("invalid region selection: {0}")]
    InvalidScope(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    ConfigValue(String),

    #[error("source request failed: {0}")]
    SourceHttp(String),

    #[error("source returned status {status}: {message}")]
    SourceStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("{table}: missing column {column}")]
    MissingColumn { table: String, column: String },

    #[error("{table}: malformed date header {header:?}")]
    MalformedDateHeader { table: String, header: String },

    #[error("{table}: line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        table: String,
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("{table}: line {line} has non-numeric value {value:?}")]
    InvalidValue {
        table: String,
        line: usize,
        value: String,
    },

    #[error("{0}: table has no date columns")]
    EmptyTable(String),

    #[error("panel has not been loaded yet")]
    PanelNotReady,
}
