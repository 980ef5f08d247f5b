use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod oficio;
pub mod state;
pub mod storage;
pub mod upload;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::upload::handlers::index,
        crate::upload::handlers::generate_oficios
    ),
    components(
        schemas(
            upload::models::GenerateOficiosRequest,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Oficios", description = "Spreadsheet upload and letter generation.")
    )
)]
pub struct ApiDoc;

/// Routes and docs, shared by the server and the HTTP tests.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.configure(upload::config).service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
    );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("Failed to read configuration")?;
    let app_state = AppState::bootstrap(config.clone())
        .context("Failed to create upload and generated directories")?;
    let app_state = web::Data::new(app_state);

    let prometheus = PrometheusMetricsBuilder::new("gerador_oficios")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    log::info!(
        "Starting server at http://{}:{}",
        config.bind_address,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(configure_app)
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.bind_address.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.bind_address, config.port))?
    .run()
    .await
    .context("Server terminated with an error")
}
