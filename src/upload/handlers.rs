use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info};

use crate::oficio::{GenerationError, ARCHIVE_NAME};
use crate::state::AppState;
use crate::storage;
use crate::upload::models::{
    GenerateOficiosRequest, HEADER_GENERATED, HEADER_SKIPPED, TEMPLATE_MISSING_MESSAGE,
};
use crate::upload::multipart_parser::MultipartParser;
use crate::upload::page::INDEX_HTML;
use crate::ErrorResponse;

#[utoipa::path(
    tag = "Oficios",
    get,
    path = "/",
    responses(
        (status = 200, description = "Upload form", body = String, content_type = "text/html")
    )
)]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

#[utoipa::path(
    tag = "Oficios",
    post,
    path = "/",
    request_body(content = inline(GenerateOficiosRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip with one document per valid row, or a plain-text message when the template is missing", body = Vec<u8>, content_type = "application/zip",
            headers(
                ("X-Oficios-Gerados" = usize, description = "Documents generated"),
                ("X-Linhas-Ignoradas" = usize, description = "Rows skipped")
            )
        ),
        (status = 400, description = "No spreadsheet, unreadable spreadsheet or missing columns", body = ErrorResponse),
        (status = 413, description = "Spreadsheet over the upload limit", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn generate_oficios(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing generate_oficios handler");
    let config = &data.config;

    let upload = match MultipartParser::parse_spreadsheet_upload(
        payload,
        &config.upload_dir,
        config.max_upload_bytes,
    )
    .await
    {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to receive spreadsheet: {}", e);
            return HttpResponse::from(e);
        }
    };
    info!("Spreadsheet saved to {}", upload.display());

    if !config.template_path.is_file() {
        error!("Template not found at {}", config.template_path.display());
        if !config.keep_generated {
            storage::remove_upload(&upload).await;
        }
        return template_missing();
    }

    let pipeline = data.pipeline.clone();
    let spreadsheet = upload.clone();
    let template = config.template_path.clone();
    let report = match web::block(move || pipeline.run(&spreadsheet, &template)).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            error!("Generation failed for {}: {}", upload.display(), e);
            if !config.keep_generated {
                storage::remove_upload(&upload).await;
            }
            return match e {
                GenerationError::TemplateMissing(_) => template_missing(),
                e if e.is_input_error() => {
                    HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
                }
                e => HttpResponse::InternalServerError()
                    .json(ErrorResponse::internal_error(&e.to_string())),
            };
        }
        Err(e) => {
            error!("Generation task failed: {}", e);
            if !config.keep_generated {
                storage::remove_upload(&upload).await;
            }
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&e.to_string()));
        }
    };

    let archive = match tokio::fs::read(&report.archive_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read archive {}: {}", report.archive_path.display(), e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to read generated archive"));
        }
    };

    if config.keep_generated {
        debug!("Keeping {} and {}", report.run_dir.display(), upload.display());
    } else {
        storage::cleanup_run(&report.run_dir, &upload).await;
    }

    info!(
        "Returning {} ({} documents, {} rows skipped)",
        ARCHIVE_NAME,
        report.generated_count(),
        report.skipped_count()
    );
    HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(ARCHIVE_NAME.to_string())],
        })
        .insert_header((HEADER_GENERATED, report.generated_count().to_string()))
        .insert_header((HEADER_SKIPPED, report.skipped_count().to_string()))
        .body(archive)
}

fn template_missing() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(TEMPLATE_MISSING_MESSAGE)
}
