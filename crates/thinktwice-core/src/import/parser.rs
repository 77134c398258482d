//! Tabular file readers producing [`RawRow`]s in file order

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use tracing::debug;

use super::{FileFormat, RawRow, RowError};
use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Error message when a workbook header lacks required columns
pub const EXCEL_HEADERS_MESSAGE: &str = "Excel must contain headers: amount, type, merchant, mode";

/// Lazy, single-pass sequence of rows from one upload
pub struct RowSource {
    inner: Inner,
}

enum Inner {
    Csv {
        headers: Vec<String>,
        records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    },
    Sheet {
        headers: Vec<Option<String>>,
        rows: std::vec::IntoIter<Vec<Data>>,
    },
}

impl RowSource {
    pub fn headers(&self) -> Vec<&str> {
        match &self.inner {
            Inner::Csv { headers, .. } => headers.iter().map(String::as_str).collect(),
            Inner::Sheet { headers, .. } => headers.iter().flatten().map(String::as_str).collect(),
        }
    }
}

impl Iterator for RowSource {
    type Item = std::result::Result<RawRow, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Csv { headers, records } => {
                let record = records.next()?;
                Some(
                    record
                        .map(|rec| {
                            headers
                                .iter()
                                .zip(rec.iter())
                                .map(|(h, v)| (h.clone(), v.to_string()))
                                .collect()
                        })
                        .map_err(|e| RowError::Malformed(e.to_string())),
                )
            }
            Inner::Sheet { headers, rows } => {
                // fully blank rows are skipped, like blank CSV lines
                let cells = rows.find(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))?;
                Some(Ok(sheet_row(headers, &cells)))
            }
        }
    }
}

/// Open an upload for row-by-row reading.
///
/// Fails with [`Error::Format`] when the input has no header row or cannot be
/// read as the declared format. Individual bad rows are not errors here.
pub fn parse_rows(bytes: Vec<u8>, format: FileFormat) -> Result<RowSource> {
    match format {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Xlsx => parse_xlsx(bytes),
    }
}

fn parse_csv(mut bytes: Vec<u8>) -> Result<RowSource> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(Cursor::new(bytes));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| Error::Format(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::Format("CSV file has no header row".into()));
    }

    debug!(?headers, "Parsed CSV header");

    Ok(RowSource {
        inner: Inner::Csv {
            headers,
            records: rdr.into_records(),
        },
    })
}

fn parse_xlsx(bytes: Vec<u8>) -> Result<RowSource> {
    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes))
        .map_err(|e| {
            debug!("Failed to open workbook: {}", e);
            Error::Format("Invalid Excel file".into())
        })?;

    // first sheet in workbook order; the active tab is not exposed by the reader
    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            debug!("Failed to read first worksheet: {}", e);
            return Err(Error::Format("Invalid Excel file".into()));
        }
        None => return Err(Error::Format("Excel file has no worksheets".into())),
    };

    rows_from_range(&range)
}

/// Split a worksheet range into a header and data rows, checking required headers
pub(crate) fn rows_from_range(range: &Range<Data>) -> Result<RowSource> {
    let mut rows = range.rows();
    let header_cells = rows
        .next()
        .ok_or_else(|| Error::Format("Excel file has no header row".into()))?;

    let headers: Vec<Option<String>> = header_cells
        .iter()
        .map(|cell| render_cell(cell).map(|h| h.trim().to_string()))
        .map(|h| h.filter(|h| !h.is_empty()))
        .collect();

    if headers.iter().all(Option::is_none) {
        return Err(Error::Format("Excel file has no header row".into()));
    }

    let missing = FileFormat::Xlsx
        .required_fields()
        .iter()
        .any(|field| !headers.iter().flatten().any(|h| h.as_str() == *field));
    if missing {
        return Err(Error::Format(EXCEL_HEADERS_MESSAGE.into()));
    }

    debug!(?headers, "Parsed worksheet header");

    let data: Vec<Vec<Data>> = rows.map(|row| row.to_vec()).collect();

    Ok(RowSource {
        inner: Inner::Sheet {
            headers,
            rows: data.into_iter(),
        },
    })
}

/// Key a data row by header. A blank cell under a named header becomes an
/// empty value, the same as an empty CSV field.
fn sheet_row(headers: &[Option<String>], cells: &[Data]) -> RawRow {
    headers
        .iter()
        .zip(cells.iter())
        .filter_map(|(header, cell)| {
            let header = header.as_ref()?;
            Some((header.clone(), render_cell(cell).unwrap_or_default()))
        })
        .collect()
}

/// Render a cell as the string a CSV cell would have held. Empty cells are `None`.
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(excel_serial_to_datetime(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("{:?}", e)),
    }
}

/// Convert an Excel serial date (days since 1899-12-30) to `YYYY-MM-DD HH:MM:SS`
fn excel_serial_to_datetime(serial: f64) -> String {
    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };
    let seconds = (serial * 86_400.0).round() as i64;
    (base + Duration::seconds(seconds))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
