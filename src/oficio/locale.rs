//! Monetary formatting for the amount placeholder.
//!
//! The locale is an explicit [`MonetaryFormat`] value handed to the formatter,
//! so formatting never depends on process-wide locale state.

use thiserror::Error;

use super::spreadsheet::CellValue;

/// Errors raised while coercing or formatting an amount.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("'{0}' não é um número")]
    NotANumber(String),
    #[error("valor não finito: {0}")]
    NonFinite(f64),
    #[error("célula vazia")]
    Empty,
}

/// Monetary convention of a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonetaryFormat {
    pub currency_symbol: &'static str,
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// Digits per thousands group.
    pub grouping: usize,
    /// Fractional digits.
    pub precision: usize,
}

impl MonetaryFormat {
    /// Brazilian Portuguese (`pt_BR`) convention, e.g. `R$ 1.234,56`.
    pub const PT_BR: MonetaryFormat = MonetaryFormat {
        currency_symbol: "R$",
        decimal_separator: ',',
        grouping_separator: '.',
        grouping: 3,
        precision: 2,
    };
}

impl Default for MonetaryFormat {
    fn default() -> Self {
        Self::PT_BR
    }
}

/// Formats amounts according to a [`MonetaryFormat`].
#[derive(Debug, Clone, Default)]
pub struct LocaleFormatter {
    format: MonetaryFormat,
}

impl LocaleFormatter {
    pub fn new(format: MonetaryFormat) -> Self {
        Self { format }
    }

    /// Coerce a raw spreadsheet cell into an amount.
    ///
    /// Numbers are taken as-is; text must parse with `.` as the decimal point.
    pub fn parse_amount(&self, cell: &CellValue) -> Result<f64, FormatError> {
        let amount = match cell {
            CellValue::Empty => return Err(FormatError::Empty),
            CellValue::Number(n) => *n,
            CellValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| FormatError::NotANumber(text.clone()))?,
            CellValue::Bool(b) => return Err(FormatError::NotANumber(b.to_string())),
        };

        if !amount.is_finite() {
            return Err(FormatError::NonFinite(amount));
        }
        Ok(amount)
    }

    /// Full currency string, e.g. `R$ 1.234,56` or `-R$ 1.234,56`.
    pub fn currency(&self, amount: f64) -> Result<String, FormatError> {
        let (negative, digits) = self.grouped_digits(amount)?;
        let sign = if negative { "-" } else { "" };
        Ok(format!("{sign}{} {digits}", self.format.currency_symbol))
    }

    /// Currency string with the symbol and surrounding whitespace stripped,
    /// e.g. `1.234,56`.
    pub fn format_amount(&self, amount: f64) -> Result<String, FormatError> {
        let currency = self.currency(amount)?;
        Ok(currency
            .replace(self.format.currency_symbol, "")
            .split_whitespace()
            .collect())
    }

    fn grouped_digits(&self, amount: f64) -> Result<(bool, String), FormatError> {
        if !amount.is_finite() {
            return Err(FormatError::NonFinite(amount));
        }

        let fixed = format!("{:.*}", self.format.precision, amount.abs());
        let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3);
        let group = self.format.grouping.max(1);
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % group == 0 {
                grouped.push(self.format.grouping_separator);
            }
            grouped.push(ch);
        }
        if !fraction.is_empty() {
            grouped.push(self.format.decimal_separator);
            grouped.push_str(fraction);
        }

        // "-0,00" is not a thing
        let negative = amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
        Ok((negative, grouped))
    }
}
