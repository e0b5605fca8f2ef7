mod csv_io;
mod excel_io;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::models::{normalize_province, Record};

pub use csv_io::{read_csv_from_bytes, CsvFormat};
pub use excel_io::ExcelFormat;

/// One spreadsheet cell before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(t) => t.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }
}

/// The four canonical columns, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Species,
    Count,
    Year,
    Province,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Species, Column::Count, Column::Year, Column::Province];

    /// Recognize a header cell, in Spanish or English, ignoring case and padding.
    pub fn from_header(name: &str) -> Option<Column> {
        let name = name.trim_start_matches('\u{feff}').trim().to_lowercase();
        match name.as_str() {
            "especie" | "species" => Some(Column::Species),
            "cantidad" | "count" => Some(Column::Count),
            "año" | "ano" | "anio" | "year" => Some(Column::Year),
            "provincia" | "province" => Some(Column::Province),
            _ => None,
        }
    }

    fn position(self) -> usize {
        match self {
            Column::Species => 0,
            Column::Count => 1,
            Column::Year => 2,
            Column::Province => 3,
        }
    }
}

/// Language of the header row written on save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    #[default]
    Spanish,
    English,
}

impl HeaderStyle {
    pub fn headers(&self) -> [&'static str; 4] {
        match self {
            HeaderStyle::Spanish => ["Especie", "Cantidad", "Año", "Provincia"],
            HeaderStyle::English => ["species", "count", "year", "province"],
        }
    }
}

/// Trait for reading raw spreadsheet rows from a file.
pub trait DatasetReader {
    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<RawCell>>, TrackerError>;
}

/// Trait for writing records to a spreadsheet file.
pub trait DatasetWriter {
    fn write(
        &self,
        records: &[Record],
        headers: HeaderStyle,
        path: &Path,
    ) -> Result<(), TrackerError>;
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Pick a reader from the file extension.
pub fn reader_for(path: &Path) -> Result<Box<dyn DatasetReader>, TrackerError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(ExcelFormat)),
        other => Err(TrackerError::UnsupportedFormat(format!(
            ".{other} (use .csv, .xlsx, .xls or .ods)"
        ))),
    }
}

/// Pick a writer from the file extension.
pub fn writer_for(path: &Path) -> Result<Box<dyn DatasetWriter>, TrackerError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "xlsx" => Ok(Box::new(ExcelFormat)),
        other => Err(TrackerError::UnsupportedFormat(format!(
            ".{other} (save as .csv or .xlsx)"
        ))),
    }
}

/// Read a spreadsheet and normalize it into records.
///
/// When `provinces` is given, province values are fuzzy-matched onto it.
pub fn read_records(
    path: impl AsRef<Path>,
    provinces: Option<&[String]>,
) -> Result<Vec<Record>, TrackerError> {
    let path = path.as_ref();
    let rows = reader_for(path)?.read_rows(path)?;
    Ok(rows_to_records(rows, provinces))
}

/// Write records to a spreadsheet chosen by extension.
pub fn write_records(
    records: &[Record],
    headers: HeaderStyle,
    path: impl AsRef<Path>,
) -> Result<(), TrackerError> {
    let path = path.as_ref();
    writer_for(path)?.write(records, headers, path)
}

/// Map raw rows onto the canonical schema.
///
/// A first row naming at least one known column is a header: known columns
/// are picked by name, unknown ones dropped and absent ones backfilled.
/// Without a header the first four cells are taken in canonical order.
/// Blank rows are skipped.
pub(crate) fn rows_to_records(
    rows: Vec<Vec<RawCell>>,
    provinces: Option<&[String]>,
) -> Vec<Record> {
    let mut rows = rows.into_iter().peekable();

    let mut mapping: [Option<usize>; 4] = [Some(0), Some(1), Some(2), Some(3)];
    if let Some(first) = rows.peek() {
        let mut header_mapping: [Option<usize>; 4] = [None; 4];
        let mut is_header = false;
        for (idx, cell) in first.iter().enumerate() {
            if let RawCell::Text(name) = cell {
                if let Some(col) = Column::from_header(name) {
                    is_header = true;
                    header_mapping[col.position()].get_or_insert(idx);
                }
            }
        }
        if is_header {
            for col in Column::ALL {
                if header_mapping[col.position()].is_none() {
                    tracing::warn!(column = ?col, "column missing from file, filling with empty values");
                }
            }
            mapping = header_mapping;
            rows.next();
        }
    }

    let mut records = Vec::new();
    for (line, row) in rows.enumerate() {
        if row.iter().all(RawCell::is_blank) {
            continue;
        }
        let cell = |col: Column| pick(&row, mapping[col.position()]);

        let count = coerce_integer(cell(Column::Count));
        let count = u64::try_from(count).unwrap_or_else(|_| {
            tracing::warn!(line, count, "negative count replaced with 0");
            0
        });
        let year = coerce_integer(cell(Column::Year));
        let year = i32::try_from(year).unwrap_or_else(|_| {
            tracing::warn!(line, year, "year out of range replaced with 0");
            0
        });

        let raw_province = cell_text(cell(Column::Province));
        let province = match provinces {
            Some(known) => normalize_province(&raw_province, known),
            None => raw_province,
        };

        records.push(Record::new(
            cell_text(cell(Column::Species)),
            count,
            year,
            province,
        ));
    }
    records
}

static EMPTY_CELL: RawCell = RawCell::Empty;

fn pick(row: &[RawCell], idx: Option<usize>) -> &RawCell {
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY_CELL)
}

/// Coerce a cell to an integer: numbers are truncated, text is parsed as a
/// decimal number and truncated, anything else is 0.
pub(crate) fn coerce_integer(cell: &RawCell) -> i64 {
    let value = match cell {
        RawCell::Number(n) => Some(*n),
        RawCell::Text(t) => t.trim().parse::<f64>().ok(),
        RawCell::Empty => None,
    };
    match value {
        Some(v) if v.is_finite() => v.trunc() as i64,
        Some(_) | None => {
            if !cell.is_blank() {
                tracing::debug!(?cell, "non-numeric value coerced to 0");
            }
            0
        }
    }
}

/// Render a cell as trimmed text; whole numbers lose their decimal point.
pub(crate) fn cell_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(t) => t.trim().to_string(),
        RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        RawCell::Number(n) => n.to_string(),
    }
}
