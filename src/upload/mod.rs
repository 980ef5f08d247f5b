//! HTTP surface: the upload form and the generation endpoint.

pub mod handlers;
pub mod models;
pub mod multipart_parser;
pub mod page;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(handlers::index))
            .route(web::post().to(handlers::generate_oficios)),
    );
}
