//! Configuration structures for extraction and comparison.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ComparadorError;

/// Main configuration for the comparador pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparadorConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Rate catalog configuration.
    pub rates: RatesConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Label pattern overrides, keyed by field label (e.g. "dias_factura").
    ///
    /// Each pattern must have one capture group holding the value.
    pub patterns: BTreeMap<String, String>,
}

/// Rate catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Default CSV file holding the catalog.
    pub source: PathBuf,

    /// Field delimiter of the CSV file.
    pub delimiter: char,

    /// Skip the first CSV row (spreadsheet column headers).
    pub has_header_row: bool,

    /// Where prices live in the grid.
    pub layout: RateLayout,

    /// Price mid-period energy at the peak price when the catalog leaves it
    /// blank, instead of dropping the tariff.
    pub llano_fallback: bool,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("comparador.csv"),
            delimiter: ',',
            has_header_row: true,
            layout: RateLayout::default(),
            llano_fallback: true,
        }
    }
}

/// Positions of the pricing bands in a rate grid.
///
/// Rows are counted from the first data row; each plan occupies one column
/// starting at `first_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLayout {
    /// First column holding a plan.
    pub first_column: usize,

    /// Row with plan names.
    pub name_row: usize,

    /// Rows with peak and off-peak power prices.
    pub potencia_rows: [usize; 2],

    /// Rows with peak, mid and off-peak energy prices.
    pub energia_rows: [usize; 3],

    /// Row with offer links, if the catalog has one.
    pub link_row: Option<usize>,
}

impl Default for RateLayout {
    fn default() -> Self {
        Self {
            first_column: 4,
            name_row: 0,
            potencia_rows: [6, 7],
            energia_rows: [11, 12, 13],
            link_row: Some(1),
        }
    }
}

impl RateLayout {
    /// Check that every pricing band has its own row, apart from the name and
    /// link rows.
    pub fn validate(&self) -> Result<(), ComparadorError> {
        let mut rows: Vec<(&str, usize)> = vec![
            ("name_row", self.name_row),
            ("potencia_rows[0]", self.potencia_rows[0]),
            ("potencia_rows[1]", self.potencia_rows[1]),
            ("energia_rows[0]", self.energia_rows[0]),
            ("energia_rows[1]", self.energia_rows[1]),
            ("energia_rows[2]", self.energia_rows[2]),
        ];
        if let Some(link_row) = self.link_row {
            rows.push(("link_row", link_row));
        }

        for (i, (name, row)) in rows.iter().enumerate() {
            if let Some((other, _)) = rows[..i].iter().find(|(_, r)| r == row) {
                return Err(ComparadorError::Config(format!(
                    "rates.layout.{} and rates.layout.{} both point at row {}",
                    other, name, row
                )));
            }
        }

        Ok(())
    }
}

impl ComparadorConfig {
    /// Reject settings that would make every comparison meaningless.
    pub fn validate(&self) -> Result<(), ComparadorError> {
        if !self.rates.delimiter.is_ascii() {
            return Err(ComparadorError::Config(format!(
                "rates.delimiter {:?} is not a single-byte character",
                self.rates.delimiter
            )));
        }
        self.rates.layout.validate()
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"rates": {"delimiter": ";", "layout": {"first_column": 2}}}"#;
        let config: ComparadorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.rates.delimiter, ';');
        assert_eq!(config.rates.layout.first_column, 2);
        assert_eq!(config.rates.layout.potencia_rows, [6, 7]);
        assert!(config.rates.llano_fallback);
        assert_eq!(config.pdf.min_text_length, 50);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ComparadorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_layout_rows_must_be_distinct() {
        let mut layout = RateLayout::default();
        layout.energia_rows = [11, 7, 13];

        let err = layout.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: rates.layout.potencia_rows[1] and rates.layout.energia_rows[1] both point at row 7"
        );

        layout.energia_rows = [11, 12, 13];
        layout.link_row = Some(0);
        assert!(matches!(layout.validate(), Err(ComparadorError::Config(_))));

        layout.link_row = None;
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_multibyte_delimiter_rejected() {
        let mut config = ComparadorConfig::default();
        config.rates.delimiter = '€';
        assert!(matches!(config.validate(), Err(ComparadorError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ComparadorConfig::default();
        config
            .extraction
            .patterns
            .insert("dias_factura".to_string(), r"D[IÍ]AS:\s*(\d+)".to_string());
        config.save(&path).unwrap();

        let loaded = ComparadorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.patterns, config.extraction.patterns);
        assert_eq!(loaded.rates.layout, RateLayout::default());
    }
}
