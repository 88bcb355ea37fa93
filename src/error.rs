//! Error types shared by the calculation engines

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the calculation engines and their configuration loaders
#[derive(Debug, Error)]
pub enum CalcError {
    /// One or more Monte Carlo inputs are out of bounds. Carries every violation.
    #[error("invalid simulation input: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("claim age {0} is outside 62..=70")]
    InvalidClaimAge(u8),

    #[error("failed to read table {path}: {source}")]
    TableLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("bad row in {path} at line {line}: {message}")]
    TableRow {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("table {table} has an invalid entry for {year}: {message}")]
    InvalidTableValue {
        table: &'static str,
        year: i32,
        message: &'static str,
    },

    #[error("table {0} has no rows")]
    EmptyTable(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CalcResult<T> = Result<T, CalcError>;
