//! Output file naming and writing.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use sanitize_filename::{sanitize_with_options, Options};

use super::validation::ValidatedRecord;

pub const OUTPUT_EXTENSION: &str = "docx";

const FALLBACK_MUNICIPALITY: &str = "municipio";
const MAX_MUNICIPALITY_CHARS: usize = 200;

/// `Oficio de {municipality}.docx`, with filesystem-reserved characters
/// replaced by `_`.
pub fn output_file_name(municipality: &str) -> String {
    build_file_name(municipality, None)
}

fn build_file_name(municipality: &str, suffix: Option<&str>) -> String {
    let name: String = municipality.trim().chars().take(MAX_MUNICIPALITY_CHARS).collect();
    let name = sanitize_with_options(
        &name,
        Options {
            windows: true,
            truncate: false,
            replacement: "_",
        },
    );
    let name = match name.trim() {
        "" => FALLBACK_MUNICIPALITY,
        trimmed => trimmed,
    };

    match suffix {
        None => format!("Oficio de {name}.{OUTPUT_EXTENSION}"),
        Some(suffix) => format!("Oficio de {name} ({suffix}).{OUTPUT_EXTENSION}"),
    }
}

/// Writes rendered documents into one output directory.
///
/// Names are unique per writer: a second record with the same municipality
/// gets its source row appended instead of overwriting the first file.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
    used: HashSet<String>,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            used: HashSet::new(),
        }
    }

    /// Reserve the file name for `record`.
    pub fn file_name_for(&mut self, record: &ValidatedRecord) -> String {
        let preferred = build_file_name(&record.municipality_name, None);
        // case-insensitive filesystems would still collide
        if self.used.insert(preferred.to_lowercase()) {
            return preferred;
        }

        // another municipality may already be named "X (linha N)"
        let mut suffix = format!("linha {}", record.row);
        let mut attempt = 1;
        loop {
            let candidate = build_file_name(&record.municipality_name, Some(&suffix));
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            attempt += 1;
            suffix = format!("linha {} #{}", record.row, attempt);
        }
    }

    pub fn write(&mut self, record: &ValidatedRecord, document: &[u8]) -> std::io::Result<PathBuf> {
        let name = self.file_name_for(record);
        let path = self.dir.join(name);
        fs::write(&path, document)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, municipality: &str) -> ValidatedRecord {
        ValidatedRecord {
            row,
            office_number: row as i64,
            municipality_name: municipality.to_string(),
            formatted_amount: "1,00".to_string(),
        }
    }

    #[test]
    fn test_literal_pattern() {
        assert_eq!(output_file_name("Springfield"), "Oficio de Springfield.docx");
        assert_eq!(output_file_name("São João del-Rei"), "Oficio de São João del-Rei.docx");
    }

    #[test]
    fn test_reserved_characters_replaced() {
        assert_eq!(output_file_name("Norte/Sul"), "Oficio de Norte_Sul.docx");
        assert_eq!(output_file_name("A:B*C?"), "Oficio de A_B_C_.docx");
        assert_eq!(output_file_name("   "), "Oficio de municipio.docx");
    }

    #[test]
    fn test_collision_appends_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());

        let first = writer.write(&record(1, "Springfield"), b"one").unwrap();
        let second = writer.write(&record(4, "springfield"), b"two").unwrap();

        assert_eq!(first.file_name().unwrap(), "Oficio de Springfield.docx");
        assert_eq!(second.file_name().unwrap(), "Oficio de springfield (linha 4).docx");
        assert_eq!(fs::read(first).unwrap(), b"one");
        assert_eq!(fs::read(second).unwrap(), b"two");
    }

    #[test]
    fn test_row_suffix_collision_keeps_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());

        writer.write(&record(1, "Springfield"), b"one").unwrap();
        let literal = writer.write(&record(2, "Springfield (linha 3)"), b"two").unwrap();
        let third = writer.write(&record(3, "Springfield"), b"three").unwrap();

        assert_eq!(literal.file_name().unwrap(), "Oficio de Springfield (linha 3).docx");
        assert_eq!(third.file_name().unwrap(), "Oficio de Springfield (linha 3 #2).docx");
        assert_eq!(fs::read(literal).unwrap(), b"two");
        assert_eq!(fs::read(third).unwrap(), b"three");
    }

    #[test]
    fn test_writes_stay_inside_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());

        let path = writer.write(&record(2, "../../etc/passwd"), b"x").unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
    }
}
