//! Tabular workbook export.
//!
//! Records are flattened through `serde_json` with key order preserved, so
//! columns come out in field order. A sheet's columns are the union of its
//! records' keys in order of first appearance; row 0 holds the headers.

use std::borrow::Cow;
use std::path::PathBuf;

use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet, XlsxError};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ErrorCode;

/// Default artifact name for a full export.
pub const EXPORT_FILE_NAME: &str = "JD_Modern_Solutions_Data.xlsx";

/// Most characters a spreadsheet cell may hold.
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to flatten record {index} of sheet '{sheet}': {source}")]
    Flatten {
        sheet: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {index} of sheet '{sheet}' is not an object")]
    NotAnObject { sheet: String, index: usize },

    #[error("sheet '{sheet}' exceeds the worksheet size limit")]
    TooLarge { sheet: String },

    #[error("failed to encode workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ExportFailed
    }
}

/// One cell of a flattened record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Flatten `records` into a sheet.
    ///
    /// # Errors
    ///
    /// Fails if a record does not serialize to a JSON object.
    pub fn from_records<T: Serialize>(
        name: impl Into<String>,
        records: &[T],
    ) -> Result<Self, ExportError> {
        let name = name.into();
        let mut objects = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let value = serde_json::to_value(record).map_err(|source| ExportError::Flatten {
                sheet: name.clone(),
                index,
                source,
            })?;
            match value {
                Value::Object(map) => objects.push(map),
                _ => {
                    return Err(ExportError::NotAnObject {
                        sheet: name,
                        index,
                    });
                }
            }
        }

        let mut headers: Vec<String> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = objects
            .iter()
            .map(|object| {
                headers
                    .iter()
                    .map(|header| object.get(header).map_or(Cell::Empty, Cell::from))
                    .collect()
            })
            .collect();

        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    fn to_worksheet(&self) -> Result<Worksheet, ExportError> {
        let too_large = || ExportError::TooLarge {
            sheet: self.name.clone(),
        };

        let mut worksheet = Worksheet::new();
        worksheet.set_name(&self.name)?;

        for (col, header) in self.headers.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| too_large())?;
            worksheet.write_string(0, col, header)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let row_num = u32::try_from(index + 1).map_err(|_| too_large())?;
            for (col, cell) in row.iter().enumerate() {
                let col = u16::try_from(col).map_err(|_| too_large())?;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        let text = fit_cell(text);
                        if let Cow::Owned(_) = text {
                            warn!(
                                sheet = %self.name,
                                row = row_num,
                                column = %self.headers[usize::from(col)],
                                limit = MAX_CELL_CHARS,
                                "truncated oversized cell"
                            );
                        }
                        worksheet.write_string(row_num, col, text.as_ref())?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col, *number)?;
                    }
                    Cell::Bool(flag) => {
                        worksheet.write_boolean(row_num, col, *flag)?;
                    }
                }
            }
        }

        Ok(worksheet)
    }
}

/// Cut `text` down to [`MAX_CELL_CHARS`] characters if it is longer.
fn fit_cell(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => Cow::Owned(text[..end].to_string()),
        None => Cow::Borrowed(text),
    }
}

/// An ordered set of sheets, encodable as `.xlsx`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet built from `records`.
    ///
    /// # Errors
    ///
    /// See [`Sheet::from_records`].
    pub fn add_records<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        records: &[T],
    ) -> Result<&mut Sheet, ExportError> {
        self.sheets.push(Sheet::from_records(name, records)?);
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Encode as an Office Open XML spreadsheet.
    ///
    /// # Errors
    ///
    /// Fails when a sheet is too large or the encoder rejects it.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        let mut workbook = XlsxWorkbook::new();
        for sheet in &self.sheets {
            workbook.push_worksheet(sheet.to_worksheet()?);
        }
        Ok(workbook.save_to_buffer()?)
    }
}
