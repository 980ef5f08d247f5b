//! Oficio generation - business logic turning a payment spreadsheet and a
//! DOCX model into one letter per row.
//!
//! - `spreadsheet` - workbook loading and the required-column check
//! - `validation` - per-row coercion and skip decisions
//! - `locale` - monetary formatting (pt_BR)
//! - `renderer` - placeholder substitution inside the DOCX package
//! - `output` - output file naming and writing
//! - `archive` - zip packaging of a run directory
//! - `pipeline` - the whole run, start to finish

pub mod archive;
pub mod locale;
pub mod output;
pub mod pipeline;
pub mod renderer;
pub mod spreadsheet;
pub mod validation;

pub use archive::{ArchiveError, Archiver, ARCHIVE_NAME};
pub use locale::{FormatError, LocaleFormatter, MonetaryFormat};
pub use output::{output_file_name, OutputWriter};
pub use pipeline::{GenerationReport, OficioPipeline};
pub use renderer::{DocumentRenderer, RenderError, Template};
pub use spreadsheet::{CellValue, SchemaError, SpreadsheetError, SpreadsheetLoader, SpreadsheetRow};
pub use validation::{RowValidator, SkipReason, SkippedRow, ValidatedRecord};

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole run. Per-row problems are [`SkippedRow`]s.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("template not found: {0}")]
    TemplateMissing(PathBuf),
    #[error(transparent)]
    Template(RenderError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
    #[error("failed to render row {row}: {source}")]
    Render {
        row: usize,
        #[source]
        source: RenderError,
    },
    #[error("failed to create output directory: {0}")]
    OutputDir(#[source] std::io::Error),
    #[error("failed to write document for row {row}: {source}")]
    WriteDocument {
        row: usize,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl GenerationError {
    /// True when the uploaded spreadsheet itself is at fault.
    pub fn is_input_error(&self) -> bool {
        matches!(self, GenerationError::Spreadsheet(_))
    }
}

/// A document written during a run.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub row: usize,
    pub file_name: String,
    pub path: PathBuf,
}
