use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreasurerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read workbook: {0}")]
    Xlsx(String),

    #[error("Missing required columns: {}. Make sure the file has at least 'Description' and 'Amount' columns.", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unsupported file type: {0} (expected .csv or .xlsx)")]
    UnsupportedFile(String),

    #[error("Invalid reporting period: {0}")]
    InvalidPeriod(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Review sheet refers to unknown row id {0}")]
    UnknownRow(usize),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TreasurerError>;
