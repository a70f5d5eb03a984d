//! Rate catalogs: tabular sources and the rate table built from them.

mod csv_source;
mod table;

pub use csv_source::CsvSource;
pub use table::{RateOptions, RateTable};

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ComparisonError;
use crate::invoice::rules::parse_spanish_decimal;

lazy_static! {
    static ref NUMERIC_CELL: Regex = Regex::new(r"^[-+]?\d+(?:[.,]\d+)*$").unwrap();
}

/// Result type for rate operations.
pub type Result<T> = std::result::Result<T, ComparisonError>;

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(Decimal),
    Text(String),
}

impl Cell {
    /// Classify raw cell text. Only text that is entirely a number (with
    /// either decimal separator) becomes [`Cell::Number`].
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if NUMERIC_CELL.is_match(trimmed) {
            if let Some(value) = parse_spanish_decimal(trimmed) {
                return Cell::Number(value);
            }
        }
        Cell::Text(raw.to_string())
    }

    /// Numeric value; text and empty cells have none.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Cell content as text.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) => value.to_string(),
            Cell::Text(text) => text.clone(),
        }
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(raw: &str) -> Self {
        Cell::from_raw(raw)
    }
}

/// Rows of cells plus optional per-column link annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    links: Vec<Option<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self {
            rows,
            links: Vec::new(),
        }
    }

    /// Build a grid from raw cell text.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|s| Cell::from_raw(s.as_ref())).collect())
                .collect(),
        )
    }

    /// Attach link annotations, indexed by column.
    pub fn with_links(mut self, links: Vec<Option<String>>) -> Self {
        self.links = links;
        self
    }

    /// Cell at `(row, col)`, `None` outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Link annotation of a column, if any.
    pub fn link(&self, col: usize) -> Option<&str> {
        self.links
            .get(col)
            .and_then(|l| l.as_deref())
            .filter(|l| !l.trim().is_empty())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Provider of a rate grid, read in full on every call.
pub trait TabularSource {
    /// Read the whole grid.
    fn read_grid(&self) -> Result<Grid>;
}

impl TabularSource for Grid {
    fn read_grid(&self) -> Result<Grid> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cell_classification() {
        assert_eq!(Cell::from_raw("  "), Cell::Empty);
        assert_eq!(
            Cell::from_raw("0,1234"),
            Cell::Number(Decimal::from_str("0.1234").unwrap())
        );
        assert_eq!(
            Cell::from_raw(" 0.05 "),
            Cell::Number(Decimal::from_str("0.05").unwrap())
        );
        assert_eq!(Cell::from_raw("2.0 TD"), Cell::Text("2.0 TD".to_string()));
        assert_eq!(Cell::from_raw("n/d").as_decimal(), None);
    }

    #[test]
    fn test_grid_access() {
        let grid = Grid::from_rows(vec![vec!["a", "b"], vec!["1"]])
            .with_links(vec![None, Some("https://example.com".to_string())]);

        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.cell(1, 1), None);
        assert_eq!(grid.cell(1, 0).and_then(Cell::as_decimal), Some(Decimal::ONE));
        assert_eq!(grid.link(0), None);
        assert_eq!(grid.link(1), Some("https://example.com"));
    }
}
