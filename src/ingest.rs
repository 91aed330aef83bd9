//! Turns uploaded bytes into a [`RawTable`].
//!
//! The filename extension selects the parser: `.csv` goes through the
//! `csv` crate, `.xlsx` through `calamine`. Anything else is rejected
//! up front so callers can surface it as a client error.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::IngestError;
use crate::table::{RawCell, RawTable};

/// Parses `content` according to the extension of `filename`.
pub fn load_table(content: &[u8], filename: &str) -> Result<RawTable, IngestError> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        read_csv(content)
    } else if lower.ends_with(".xlsx") {
        read_xlsx(content)
    } else {
        Err(IngestError::UnsupportedFormat(filename.to_string()))
    }
}

fn read_csv(content: &[u8]) -> Result<RawTable, IngestError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(content);

    let names: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| header_name(h.trim(), idx))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(string_cell).collect());
    }

    debug!(rows = rows.len(), columns = names.len(), "parsed CSV upload");
    Ok(RawTable::from_cells(names, rows))
}

fn read_xlsx(content: &[u8]) -> Result<RawTable, IngestError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(content))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptyWorkbook)??;

    let mut row_iter = range.rows();
    let names: Vec<String> = match row_iter.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_name(cell.to_string().trim(), idx))
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<RawCell>> = row_iter
        .map(|row| row.iter().map(xlsx_cell).collect())
        .collect();

    debug!(rows = rows.len(), columns = names.len(), "parsed XLSX upload");
    Ok(RawTable::from_cells(names, rows))
}

fn header_name(raw: &str, idx: usize) -> String {
    if raw.is_empty() {
        format!("column_{}", idx)
    } else {
        raw.to_string()
    }
}

fn string_cell(field: &str) -> RawCell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        RawCell::Missing
    } else {
        RawCell::Str(trimmed.to_string())
    }
}

fn xlsx_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Missing,
        Data::Float(v) => RawCell::Num(*v),
        Data::Int(v) => RawCell::Num(*v as f64),
        Data::Bool(v) => RawCell::Num(if *v { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => RawCell::Num(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => string_cell(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_round_trip() {
        let bytes = b"Revenue,Cost,Region\n100,60,US\n120,,EU\n";
        let table = load_table(bytes, "upload.csv").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);

        let clean = table.clean();
        // missing cost imputed with the median of the present values
        assert_eq!(clean.numeric("cost"), Some(&[60.0, 60.0][..]));
        assert_eq!(clean.numeric("revenue"), Some(&[100.0, 120.0][..]));
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        let bytes = b"a\n1\n";
        assert!(load_table(bytes, "DATA.CSV").is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_table(b"whatever", "notes.txt").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_malformed_csv_is_an_error() {
        // ragged record: three fields under a two-field header
        let bytes = b"a,b\n1,2,3\n";
        assert!(matches!(
            load_table(bytes, "bad.csv"),
            Err(IngestError::Csv(_))
        ));
    }

    #[test]
    fn test_garbage_xlsx_is_an_error() {
        let err = load_table(b"not a zip archive", "bad.xlsx").unwrap_err();
        assert!(matches!(err, IngestError::Xlsx(_)));
    }

    #[test]
    fn test_empty_csv_parses_to_empty_table() {
        let table = load_table(b"", "empty.csv").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_blank_header_gets_positional_name() {
        let bytes = b"a,,c\n1,2,3\n";
        let clean = load_table(bytes, "gaps.csv").unwrap().clean();
        assert!(clean.has_column("column_1"));
    }
}
