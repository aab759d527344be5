use thiserror::Error;

/// Failures raised while loading the listings or building a chart from them.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("Failed to load dataset: {0}")]
    Load(String),

    #[error("Dataset must contain at least one data row")]
    EmptyData,

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Failed to parse '{value}' as number in column '{column}' at row {row}")]
    NotNumeric {
        column: String,
        value: String,
        row: usize,
    },

    #[error("Invalid date '{value}' in column '{column}' at row {row}")]
    InvalidDate {
        column: String,
        value: String,
        row: usize,
    },

    #[error("Failed to render chart: {0}")]
    Render(String),
}

pub type DashResult<T> = std::result::Result<T, DashError>;
