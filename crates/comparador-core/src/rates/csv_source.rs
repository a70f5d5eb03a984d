//! CSV-backed rate catalog.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Cell, Grid, Result, TabularSource};
use crate::error::ComparisonError;
use crate::models::config::RatesConfig;

#[derive(Debug, Clone)]
enum CsvInput {
    Path(PathBuf),
    Text(String),
}

/// Rate catalog exported from a spreadsheet as CSV.
///
/// CSV carries no hyperlink annotations; links come from the layout's link
/// row instead.
#[derive(Debug, Clone)]
pub struct CsvSource {
    input: CsvInput,
    delimiter: u8,
    has_header_row: bool,
}

impl CsvSource {
    /// Read the catalog from a file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::Path(path.into()),
            delimiter: b',',
            has_header_row: true,
        }
    }

    /// Read the catalog from in-memory CSV text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            input: CsvInput::Text(text.into()),
            delimiter: b',',
            has_header_row: true,
        }
    }

    /// Catalog file and format from configuration.
    pub fn from_config(config: &RatesConfig) -> Result<Self> {
        Self::from_path(&config.source)
            .with_delimiter(config.delimiter)
            .map(|s| s.with_header_row(config.has_header_row))
    }

    /// Set the field delimiter; it must be a single-byte character.
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self> {
        self.delimiter = u8::try_from(delimiter).map_err(|_| {
            ComparisonError::Source(format!("delimiter {:?} is not a single byte", delimiter))
        })?;
        Ok(self)
    }

    /// Whether the first row is a header to skip.
    pub fn with_header_row(mut self, has_header_row: bool) -> Self {
        self.has_header_row = has_header_row;
        self
    }

    /// Path of a file-backed source.
    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            CsvInput::Path(path) => Some(path),
            CsvInput::Text(_) => None,
        }
    }

    fn read_from<R: Read>(&self, reader: R) -> Result<Grid> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header_row)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::from_raw).collect());
        }

        let grid = Grid::new(rows);
        debug!("Read rate grid: {} rows x {} columns", grid.height(), grid.width());
        Ok(grid)
    }
}

impl TabularSource for CsvSource {
    fn read_grid(&self) -> Result<Grid> {
        match &self.input {
            CsvInput::Path(path) => {
                let file = std::fs::File::open(path).map_err(|e| {
                    ComparisonError::Source(format!("{}: {}", path.display(), e))
                })?;
                self.read_from(file)
            }
            CsvInput::Text(text) => self.read_from(text.as_bytes()),
        }
    }
}
