//! Packaging of generated documents into a single zip.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::{debug, warn};
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::output::OUTPUT_EXTENSION;

pub const ARCHIVE_NAME: &str = "oficios.zip";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to walk output directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub struct Archiver;

impl Archiver {
    /// Zip every document under `dir` into `archive_path`, replacing any
    /// previous archive there. Entries use the bare file name and are added in
    /// file-name order.
    ///
    /// Returns the entry names written.
    pub fn archive_dir(dir: &Path, archive_path: &Path) -> Result<Vec<String>, ArchiveError> {
        let mut zip = ZipWriter::new(File::create(archive_path)?);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut entries: Vec<String> = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_document(entry.path()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if entries.contains(&name) {
                warn!(
                    "Skipping {}: an entry named '{}' is already in the archive",
                    entry.path().display(),
                    name
                );
                continue;
            }

            debug!("Adding {} to {}", name, archive_path.display());
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&fs::read(entry.path())?)?;
            entries.push(name);
        }

        zip.finish()?;
        Ok(entries)
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION))
}
