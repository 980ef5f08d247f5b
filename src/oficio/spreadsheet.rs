//! Spreadsheet loading.
//!
//! The payment workbooks carry two title rows; the real column names live on
//! the third worksheet row. Only the three required columns are kept.

use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, info};
use thiserror::Error;

/// Zero-based worksheet row holding the column names.
pub const HEADER_ROW: u32 = 2;

pub const COLUMN_IDENTIFIER: &str = "N";
pub const COLUMN_MUNICIPALITY: &str = "MUNICÍPIO";
pub const COLUMN_TOTAL_AMOUNT: &str = "VLR. TOTAL";

pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_IDENTIFIER, COLUMN_MUNICIPALITY, COLUMN_TOTAL_AMOUNT];

/// Required columns absent from the header row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("As seguintes colunas estão faltando na planilha: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("failed to read spreadsheet: {0}")]
    Open(#[from] calamine::Error),
    #[error("spreadsheet has no worksheets")]
    NoWorksheet,
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Raw cell as seen by the row validator.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.clone())
                }
            }
            Data::Int(v) => CellValue::Number(*v as f64),
            Data::Float(v) => CellValue::Number(*v),
            Data::DateTime(v) => CellValue::Number(v.as_f64()),
            Data::Bool(v) => CellValue::Bool(*v),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s.trim()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One data row, restricted to the required columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetRow {
    /// 1-based position among the data rows.
    pub index: usize,
    /// 1-based worksheet row number.
    pub sheet_row: u32,
    pub identifier: CellValue,
    pub municipality: CellValue,
    pub total_amount: CellValue,
}

impl SpreadsheetRow {
    /// Names of the required columns whose cell is empty.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        [
            (COLUMN_IDENTIFIER, &self.identifier),
            (COLUMN_MUNICIPALITY, &self.municipality),
            (COLUMN_TOTAL_AMOUNT, &self.total_amount),
        ]
        .into_iter()
        .filter(|(_, cell)| cell.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

struct ColumnPositions {
    identifier: u32,
    municipality: u32,
    total_amount: u32,
}

impl ColumnPositions {
    fn resolve(header: &[String]) -> Result<Self, SchemaError> {
        let position = |name: &str| header.iter().position(|h| h == name).map(|p| p as u32);

        let mut missing = Vec::new();
        let mut found = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            match position(name) {
                Some(p) => found.push(p),
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SchemaError { missing });
        }

        Ok(Self {
            identifier: found[0],
            municipality: found[1],
            total_amount: found[2],
        })
    }
}

pub struct SpreadsheetLoader;

impl SpreadsheetLoader {
    /// Read the first worksheet of the workbook at `path`.
    ///
    /// Fails with [`SchemaError`] before yielding any row when a required
    /// column is missing.
    pub fn load(path: &Path) -> Result<Vec<SpreadsheetRow>, SpreadsheetError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(SpreadsheetError::NoWorksheet)?;
        debug!("Reading worksheet '{}' from {}", sheet_name, path.display());

        let range = workbook.worksheet_range(&sheet_name)?;
        let rows = Self::rows_from_range(&range)?;
        info!("Loaded {} data rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Extract the data rows of an already parsed worksheet.
    ///
    /// Positions are absolute worksheet coordinates, so leading blank rows
    /// do not shift the header.
    pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<SpreadsheetRow>, SchemaError> {
        let Some((last_row, last_col)) = range.end() else {
            return Err(SchemaError {
                missing: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            });
        };

        let header: Vec<String> = (0..=last_col)
            .map(|col| {
                range
                    .get_value((HEADER_ROW, col))
                    .map(|data| CellValue::from_data(data).to_string().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();
        let columns = ColumnPositions::resolve(&header)?;

        let cell = |row: u32, col: u32| {
            range
                .get_value((row, col))
                .map(CellValue::from_data)
                .unwrap_or(CellValue::Empty)
        };

        let rows = (HEADER_ROW + 1..=last_row)
            .enumerate()
            .map(|(i, row)| SpreadsheetRow {
                index: i + 1,
                sheet_row: row + 1,
                identifier: cell(row, columns.identifier),
                municipality: cell(row, columns.municipality),
                total_amount: cell(row, columns.total_amount),
            })
            .collect();

        Ok(rows)
    }
}
