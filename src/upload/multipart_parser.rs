use std::path::{Path, PathBuf};

use actix_multipart::{Multipart, MultipartError};
use actix_web::error::BlockingError;
use actix_web::HttpResponse;
use futures_util::TryStreamExt;
use log::debug;

use crate::storage;
use crate::ErrorResponse;

/// Form field carrying the spreadsheet.
pub const SPREADSHEET_FIELD: &str = "spreadsheet";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Multipart field error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Nenhuma planilha enviada no campo 'spreadsheet'")]
    MissingFile,
    #[error("A planilha enviada está vazia")]
    EmptyFile,
    #[error("A planilha excede o limite de {limit} bytes")]
    TooLarge { limit: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

impl From<UploadError> for HttpResponse {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::Multipart(_) | UploadError::MissingFile | UploadError::EmptyFile => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string()))
            }
            UploadError::TooLarge { .. } => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &error.to_string())),
            _ => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&error.to_string())),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Persist the `spreadsheet` file field and return where it landed.
    ///
    /// Other fields are drained and ignored. A field without a file name
    /// counts as no file, as a browser sends one when nothing was picked.
    pub async fn parse_spreadsheet_upload(
        mut multipart: Multipart,
        upload_dir: &Path,
        max_bytes: usize,
    ) -> Result<PathBuf, UploadError> {
        while let Some(field) = multipart.try_next().await? {
            let (name, file_name) = match field.content_disposition() {
                Some(cd) => (
                    cd.get_name().map(str::to_string),
                    cd.get_filename().map(str::to_string),
                ),
                None => (None, None),
            };

            match (name.as_deref(), file_name) {
                (Some(SPREADSHEET_FIELD), Some(file_name)) if !file_name.trim().is_empty() => {
                    return storage::save_upload(field, &file_name, upload_dir, max_bytes).await;
                }
                _ => {
                    debug!("Ignoring multipart field {:?}", name);
                    drain(field).await?;
                }
            }
        }

        Err(UploadError::MissingFile)
    }
}

async fn drain(mut field: actix_multipart::Field) -> Result<(), UploadError> {
    while field.try_next().await?.is_some() {}
    Ok(())
}
