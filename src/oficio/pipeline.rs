//! One generation run: spreadsheet in, documents and archive out.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use uuid::Uuid;

use super::archive::{Archiver, ARCHIVE_NAME};
use super::locale::LocaleFormatter;
use super::output::OutputWriter;
use super::renderer::{DocumentRenderer, Template};
use super::spreadsheet::SpreadsheetLoader;
use super::validation::{RowValidator, SkippedRow};
use super::{GeneratedDocument, GenerationError};

/// Outcome of a successful run. Skipped rows are part of a normal outcome.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub run_dir: PathBuf,
    pub archive_path: PathBuf,
    pub documents: Vec<GeneratedDocument>,
    pub skipped: Vec<SkippedRow>,
}

impl GenerationReport {
    pub fn generated_count(&self) -> usize {
        self.documents.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Runs the generation pipeline. Each [`run`](Self::run) writes into its own
/// fresh directory below `generated_root`.
#[derive(Debug, Clone)]
pub struct OficioPipeline {
    generated_root: PathBuf,
    formatter: LocaleFormatter,
}

impl OficioPipeline {
    pub fn new(generated_root: impl Into<PathBuf>) -> Self {
        Self {
            generated_root: generated_root.into(),
            formatter: LocaleFormatter::default(),
        }
    }

    pub fn with_formatter(mut self, formatter: LocaleFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn generated_root(&self) -> &Path {
        &self.generated_root
    }

    /// A run that fails removes its directory again, partial documents included.
    pub fn run(&self, spreadsheet: &Path, template: &Path) -> Result<GenerationReport, GenerationError> {
        let run_dir = self.generated_root.join(Uuid::new_v4().to_string());
        let result = self.run_into(spreadsheet, template, &run_dir);
        if result.is_err() && run_dir.exists() {
            match fs::remove_dir_all(&run_dir) {
                Ok(()) => debug!("Removed failed run directory {}", run_dir.display()),
                Err(e) => warn!("Failed to remove run directory {}: {}", run_dir.display(), e),
            }
        }
        result
    }

    /// Run with an explicit output directory.
    ///
    /// The template and the spreadsheet schema are checked before the output
    /// directory is touched.
    pub fn run_into(
        &self,
        spreadsheet: &Path,
        template: &Path,
        output_dir: &Path,
    ) -> Result<GenerationReport, GenerationError> {
        if !template.is_file() {
            return Err(GenerationError::TemplateMissing(template.to_path_buf()));
        }
        let template = Template::load(template).map_err(GenerationError::Template)?;
        let rows = SpreadsheetLoader::load(spreadsheet)?;

        fs::create_dir_all(output_dir).map_err(GenerationError::OutputDir)?;

        let validator = RowValidator::new(self.formatter.clone());
        let renderer = DocumentRenderer::new(&template);
        let mut writer = OutputWriter::new(output_dir);
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for row in &rows {
            let record = match validator.validate(row) {
                Ok(record) => record,
                Err(reason) => {
                    warn!(
                        "Pulando linha {} (linha {} da planilha): {}",
                        row.index, row.sheet_row, reason
                    );
                    skipped.push(SkippedRow {
                        row: row.index,
                        reason,
                    });
                    continue;
                }
            };

            let document = renderer
                .render(&record)
                .map_err(|source| GenerationError::Render {
                    row: record.row,
                    source,
                })?;
            let path = writer
                .write(&record, &document)
                .map_err(|source| GenerationError::WriteDocument {
                    row: record.row,
                    source,
                })?;
            info!("Documento salvo: {}", path.display());

            documents.push(GeneratedDocument {
                row: record.row,
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path,
            });
        }

        let archive_path = output_dir.join(ARCHIVE_NAME);
        Archiver::archive_dir(output_dir, &archive_path)?;
        info!(
            "Run finished: {} documents, {} rows skipped, archive at {}",
            documents.len(),
            skipped.len(),
            archive_path.display()
        );

        Ok(GenerationReport {
            run_dir: output_dir.to_path_buf(),
            archive_path,
            documents,
            skipped,
        })
    }
}
