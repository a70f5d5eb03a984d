//! Rule-based field extractors for Spanish electricity bills.

pub mod amounts;
pub mod fields;
pub mod patterns;

pub use amounts::{format_spanish_amount, parse_bill_decimal, parse_spanish_decimal};
pub use fields::{extract, FieldSpec, FieldValue, ValueKind};
pub use patterns::*;

use crate::error::ExtractionError;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text, applying the default policy.
    fn extract(&self, text: &str) -> Result<Self::Output, ExtractionError>;

    /// Extract all parseable occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<Self::Output>>;
}

/// A value found in the text, with where it was found.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
