use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::TrackerError;
use crate::models::Record;

use super::{DatasetReader, DatasetWriter, HeaderStyle, RawCell};

/// Spreadsheet workbooks: any calamine format on read, `.xlsx` on write.
pub struct ExcelFormat;

fn to_raw(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::Bool(b) => RawCell::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => RawCell::Text(s.clone()),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "spreadsheet error cell treated as empty");
            RawCell::Empty
        }
    }
}

impl DatasetReader for ExcelFormat {
    /// Read the first worksheet of a workbook.
    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<RawCell>>, TrackerError> {
        let mut workbook = open_workbook_auto(path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| TrackerError::Excel("No sheets found in workbook".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        tracing::debug!(sheet = %sheet_name, rows = range.height(), "reading worksheet");

        Ok(range
            .rows()
            .map(|row| row.iter().map(to_raw).collect())
            .collect())
    }
}

impl DatasetWriter for ExcelFormat {
    fn write(
        &self,
        records: &[Record],
        headers: HeaderStyle,
        path: &Path,
    ) -> Result<(), TrackerError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        for (col, header) in headers.headers().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        for (idx, record) in records.iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet.write_string(row, 0, &record.species)?;
            worksheet.write_number(row, 1, record.count as f64)?;
            worksheet.write_number(row, 2, f64::from(record.year))?;
            worksheet.write_string(row, 3, &record.province)?;
        }

        worksheet.set_column_width(0, 28)?;
        worksheet.set_column_width(3, 18)?;

        workbook.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw_conversions() {
        assert_eq!(to_raw(&Data::Empty), RawCell::Empty);
        assert_eq!(to_raw(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(to_raw(&Data::Float(2.5)), RawCell::Number(2.5));
        assert_eq!(
            to_raw(&Data::String("Jaguar".to_string())),
            RawCell::Text("Jaguar".to_string())
        );
        assert_eq!(to_raw(&Data::Bool(true)), RawCell::Number(1.0));
    }

    #[test]
    fn test_write_then_read_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animals.xlsx");
        let records = vec![Record::new("Jaguar", 5, 2020, "Darién")];
        ExcelFormat
            .write(&records, HeaderStyle::Spanish, &path)
            .unwrap();

        let rows = ExcelFormat.read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], RawCell::Text("Especie".to_string()));
        assert_eq!(rows[0][2], RawCell::Text("Año".to_string()));
        assert_eq!(rows[1][1], RawCell::Number(5.0));
        assert_eq!(rows[1][2], RawCell::Number(2020.0));
    }

    #[test]
    fn test_read_missing_workbook_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExcelFormat.read_rows(&dir.path().join("missing.xlsx"));
        assert!(result.is_err());
    }
}
