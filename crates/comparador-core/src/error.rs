//! Error types for the comparador-core library.

use thiserror::Error;

/// Main error type for the comparador library.
#[derive(Error, Debug)]
pub enum ComparadorError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Tariff comparison error.
    #[error("comparison error: {0}")]
    Comparison(#[from] ComparisonError),

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

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A required field's label was not found in the text.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The label was found but its value could not be used.
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },
}

impl ExtractionError {
    /// Label of the field that caused the failure.
    pub fn field(&self) -> &str {
        match self {
            ExtractionError::MissingField(field) => field,
            ExtractionError::InvalidValue { field, .. } => field,
        }
    }
}

/// Errors related to loading rates and ranking tariffs.
#[derive(Error, Debug)]
pub enum ComparisonError {
    /// The rate source could not be read.
    #[error("rate source unavailable: {0}")]
    Source(String),

    /// The rate source is not valid CSV.
    #[error("malformed rate source: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while reading the rate source.
    #[error("I/O error reading rate source: {0}")]
    Io(#[from] std::io::Error),

    /// The consumption to price is out of range.
    #[error("invalid consumption: {0}")]
    InvalidConsumption(String),

    /// No tariff survived row exclusion and cost computation.
    #[error("rate source contains no complete tariff")]
    NoValidRates,
}

/// Result type for the comparador library.
pub type Result<T> = std::result::Result<T, ComparadorError>;
