use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown surgery value: {0}")]
    UnknownSurgery(String),

    #[error("Cartridge count {0} is out of range: must be between 0 and 10")]
    CartridgeCountOutOfRange(u8),

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid numeric cell '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("Row index {0} is out of range for the active ledger")]
    RowIndexOutOfRange(usize),

    #[cfg(feature = "sheets")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
