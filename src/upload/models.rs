use utoipa::ToSchema;

/// Multipart body of `POST /`.
#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct GenerateOficiosRequest {
    /// Payment spreadsheet (`.xlsx`, `.xls` or `.ods`). Headers on row 3.
    #[allow(unused)]
    #[schema(value_type = String, format = Binary)]
    pub spreadsheet: Vec<u8>,
}

/// Response header with the number of generated documents.
pub const HEADER_GENERATED: &str = "X-Oficios-Gerados";
/// Response header with the number of skipped rows.
pub const HEADER_SKIPPED: &str = "X-Linhas-Ignoradas";

pub const TEMPLATE_MISSING_MESSAGE: &str = "Erro: Arquivo modelo.docx não encontrado.";
