use crate::calendar;
use crate::error::{DashError, DashResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Column names the dashboard sections read.
pub mod columns {
    pub const PRICE: &str = "price";
    pub const SERVICE_FEE: &str = "service fee";
    pub const ROOM_TYPE: &str = "room type";
    pub const NEIGHBOURHOOD_GROUP: &str = "neighbourhood group";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";
    pub const NUMBER_OF_REVIEWS: &str = "number of reviews";
    pub const REVIEW_RATE: &str = "review rate number";
    pub const AVAILABILITY: &str = "availability 365";
    pub const MINIMUM_NIGHTS: &str = "minimum nights";
    pub const HOST_LISTINGS: &str = "calculated host listings count";
    pub const ROAD: &str = "road";
    pub const LAST_REVIEW: &str = "last review";
    pub const REVIEW_YEAR: &str = "last_review_(year)";
    pub const REVIEW_MONTH: &str = "last_review_(month)";
    pub const REVIEW_DAY_NAME: &str = "last_review_(day_name)";
}

/// The listings table. Loaded once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Load listings from a CSV file on disk, deriving review calendar columns if needed.
    pub fn load(path: &Path) -> DashResult<Self> {
        let file = File::open(path)
            .map_err(|e| DashError::Load(format!("{}: {}", path.display(), e)))?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} listings with {} columns from {}",
            dataset.len(),
            dataset.headers.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader. The first record is the header row.
    pub fn from_reader<R: Read>(reader: R) -> DashResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DashError::Load(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| DashError::Load(e.to_string()))?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if rows.is_empty() {
            return Err(DashError::EmptyData);
        }

        calendar::derive_review_columns(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.eq_ignore_ascii_case(name))
    }

    /// Find a column index by name (case-insensitive)
    pub fn column_index(&self, name: &str) -> DashResult<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| DashError::MissingColumn(name.to_string()))
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }

    /// Numeric value of a cell. `None` when the cell is empty.
    pub fn numeric_cell(&self, row: usize, col: usize) -> DashResult<Option<f64>> {
        let raw = self.cell(row, col);
        parse_number(raw).map_err(|_| DashError::NotNumeric {
            column: self.headers[col].clone(),
            value: raw.to_string(),
            row: row + 1,
        })
    }

    /// Append a column. Used only while the dataset is being assembled.
    pub(crate) fn with_column(mut self, name: &str, values: Vec<String>) -> Self {
        debug!("Adding derived column '{}'", name);
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self
    }
}

/// Cell contents read as a missing value, as pandas does by default.
const MISSING_MARKERS: &[&str] = &[
    "NaN", "nan", "-NaN", "-nan", "NA", "N/A", "n/a", "#N/A", "<NA>", "NULL", "null", "None",
];

/// Parse a numeric cell, tolerating a leading `$` and thousands separators.
/// Empty cells, missing markers and non-finite values are `Ok(None)`.
pub fn parse_number(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return Ok(None);
    }
    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|&c| c != ',')
        .collect();
    let value: f64 = cleaned.trim().parse()?;
    Ok(value.is_finite().then_some(value))
}
