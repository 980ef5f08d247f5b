//! Per-row validation.
//!
//! A row that fails any check is skipped with a [`SkipReason`]; it never
//! aborts the batch.

use thiserror::Error;

use super::locale::{FormatError, LocaleFormatter};
use super::spreadsheet::{CellValue, SpreadsheetRow};

/// A row that passed every check, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    /// 1-based data row this record came from.
    pub row: usize,
    pub office_number: i64,
    pub municipality_name: String,
    pub formatted_amount: String,
}

/// Why a row was left out of the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("dados incompletos (faltando: {})", .columns.join(", "))]
    MissingFields { columns: Vec<&'static str> },
    #[error("valor inválido em 'N': {value}")]
    InvalidIdentifier { value: String },
    #[error("valor inválido em 'VLR. TOTAL': {0}")]
    InvalidAmount(#[from] FormatError),
}

/// A skipped row and the reason it was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct RowValidator {
    formatter: LocaleFormatter,
}

impl RowValidator {
    pub fn new(formatter: LocaleFormatter) -> Self {
        Self { formatter }
    }

    /// Check and coerce one row.
    ///
    /// Order matters: emptiness first, then identifier and municipality,
    /// then the amount.
    pub fn validate(&self, row: &SpreadsheetRow) -> Result<ValidatedRecord, SkipReason> {
        let missing = row.missing_columns();
        if !missing.is_empty() {
            return Err(SkipReason::MissingFields { columns: missing });
        }

        let office_number =
            coerce_identifier(&row.identifier).ok_or_else(|| SkipReason::InvalidIdentifier {
                value: row.identifier.to_string(),
            })?;
        let municipality_name = row.municipality.to_string();

        let amount = self.formatter.parse_amount(&row.total_amount)?;
        let formatted_amount = self.formatter.format_amount(amount)?;

        Ok(ValidatedRecord {
            row: row.index,
            office_number,
            municipality_name,
            formatted_amount,
        })
    }
}

/// Numbers truncate toward zero; text must be a plain base-10 integer.
fn coerce_identifier(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Number(n) => {
            let truncated = n.trunc();
            if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Some(truncated as i64)
            } else {
                None
            }
        }
        CellValue::Text(s) => s.trim().parse::<i64>().ok(),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}
