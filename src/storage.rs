use std::io::Write;
use std::path::{Path, PathBuf};

use actix_multipart::Field;
use actix_web::web;
use futures_util::TryStreamExt;
use log::{debug, warn};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::upload::multipart_parser::UploadError;

const FALLBACK_UPLOAD_NAME: &str = "planilha.xlsx";

/// `<uuid>_<sanitized original name>`. The extension survives, which the
/// workbook reader relies on to pick a format.
pub fn stored_file_name(original: &str) -> String {
    let sanitized = sanitize_filename::sanitize(original.trim());
    let sanitized = if sanitized.trim().is_empty() {
        FALLBACK_UPLOAD_NAME.to_string()
    } else {
        sanitized
    };
    format!("{}_{}", Uuid::new_v4(), sanitized)
}

/// Stream one multipart file field into `upload_dir`.
///
/// The bytes go to a temp file in the same directory and are renamed into
/// place only once the whole field arrived within `max_bytes`.
pub async fn save_upload(
    mut field: Field,
    original_name: &str,
    upload_dir: &Path,
    max_bytes: usize,
) -> Result<PathBuf, UploadError> {
    let target = upload_dir.join(stored_file_name(original_name));

    let dir = upload_dir.to_path_buf();
    let mut temp = web::block(move || NamedTempFile::new_in(dir)).await??;

    let mut written = 0usize;
    while let Some(chunk) = field.try_next().await? {
        written += chunk.len();
        if written > max_bytes {
            return Err(UploadError::TooLarge { limit: max_bytes });
        }
        temp = web::block(move || {
            let mut file = temp;
            file.write_all(&chunk).map(|_| file)
        })
        .await??;
    }

    if written == 0 {
        return Err(UploadError::EmptyFile);
    }

    let path = target.clone();
    web::block(move || temp.persist(&path).map(|_| ()).map_err(|e| e.error)).await??;
    debug!("Stored upload '{}' as {} ({} bytes)", original_name, target.display(), written);
    Ok(target)
}

/// Remove a run directory and the upload that fed it. Failures are logged.
pub async fn cleanup_run(run_dir: &Path, upload: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(run_dir).await {
        warn!("Failed to remove run directory {}: {}", run_dir.display(), e);
    }
    remove_upload(upload).await;
}

pub async fn remove_upload(upload: &Path) {
    if let Err(e) = tokio::fs::remove_file(upload).await {
        warn!("Failed to remove upload {}: {}", upload.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_file_name_keeps_extension() {
        let name = stored_file_name("pagamentos 2024.xlsx");
        let (prefix, rest) = name.split_once('_').unwrap();
        assert!(Uuid::parse_str(prefix).is_ok());
        assert_eq!(rest, "pagamentos 2024.xlsx");
    }

    #[test]
    fn test_stored_file_name_strips_path() {
        let name = stored_file_name("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(name.contains("etcpasswd"));

        let fallback = stored_file_name("  ");
        assert!(fallback.ends_with("_planilha.xlsx"));
    }

    #[actix_web::test]
    async fn test_cleanup_run_removes_both() {
        let root = tempfile::tempdir().unwrap();
        let run_dir = root.path().join("run");
        std::fs::create_dir(&run_dir).unwrap();
        std::fs::write(run_dir.join("Oficio de A.docx"), b"a").unwrap();
        let upload = root.path().join("up.xlsx");
        std::fs::write(&upload, b"x").unwrap();

        cleanup_run(&run_dir, &upload).await;
        assert!(!run_dir.exists());
        assert!(!upload.exists());
    }
}
