//! Error types for the remb-core library.

use thiserror::Error;

use crate::models::care::AmountField;
use crate::summary::Month;

/// Main error type for the remb library.
#[derive(Error, Debug)]
pub enum RembError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Statement extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Monthly aggregation error.
    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// PDF support was not compiled in.
    #[error("PDF support is disabled in this build")]
    Unsupported,
}

/// Errors that abort a whole extraction call.
///
/// Per-record problems never show up here; they are collected as
/// [`CoercionError`]s on the extraction result instead.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The source bytes could not be turned into text.
    #[error("undecodable input: {0}")]
    UndecodableInput(String),
}

impl From<PdfError> for ExtractionError {
    fn from(err: PdfError) -> Self {
        ExtractionError::UndecodableInput(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ExtractionError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ExtractionError::UndecodableInput(err.to_string())
    }
}

/// Errors raised while coercing one matched record into typed values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The date is malformed or does not exist on the calendar.
    #[error("invalid date: {value:?}")]
    InvalidDate { value: String },

    /// An amount is malformed or negative.
    #[error("invalid amount for {field}: {value:?}")]
    InvalidAmount { field: AmountField, value: String },
}

/// Errors related to the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be serialized.
    #[error("failed to encode row: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored row could not be decoded.
    #[error("corrupt row at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}

/// Errors raised while aggregating stored records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// A monthly sum does not fit in a decimal.
    #[error("{field} total for {month} overflows")]
    Overflow { month: Month, field: AmountField },
}

/// Result type for the remb library.
pub type Result<T> = std::result::Result<T, RembError>;
