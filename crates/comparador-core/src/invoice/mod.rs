//! Bill field extraction module.

mod parser;
pub mod rules;

pub use parser::{extract_invoice_fields, labels, ExtractionResult, InvoiceParser, RuleInvoiceParser};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
