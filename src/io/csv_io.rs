use std::io::Read;
use std::path::Path;

use crate::error::TrackerError;
use crate::models::Record;

use super::{rows_to_records, DatasetReader, DatasetWriter, HeaderStyle, RawCell};

/// Comma-separated values, read and written with the `csv` crate.
pub struct CsvFormat;

fn parse_csv_rows<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<Vec<RawCell>>, TrackerError> {
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true).trim(csv::Trim::All);
    builder
}

impl DatasetReader for CsvFormat {
    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<RawCell>>, TrackerError> {
        let mut rdr = reader_builder().from_path(path)?;
        parse_csv_rows(&mut rdr)
    }
}

impl DatasetWriter for CsvFormat {
    fn write(
        &self,
        records: &[Record],
        headers: HeaderStyle,
        path: &Path,
    ) -> Result<(), TrackerError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(headers.headers())?;
        for record in records {
            let count = record.count.to_string();
            let year = record.year.to_string();
            wtr.write_record([
                record.species.as_str(),
                count.as_str(),
                year.as_str(),
                record.province.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Parse CSV bytes into records using the same schema rules as file loads.
pub fn read_csv_from_bytes(
    data: &[u8],
    provinces: Option<&[String]>,
) -> Result<Vec<Record>, TrackerError> {
    let mut rdr = reader_builder().from_reader(data);
    let rows = parse_csv_rows(&mut rdr)?;
    Ok(rows_to_records(rows, provinces))
}
