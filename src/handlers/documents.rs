// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

// GET /api/requests/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/requests/{id}/pdf",
    tag = "Requests",
    responses(
        (status = 200, description = "Ficha da solicitação em PDF", content_type = "application/pdf"),
        (status = 403, description = "Solicitação de outro vendedor"),
        (status = 404, description = "Não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn generate_request_pdf(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let entry = app_state.request_service.find_visible(&user, id).await?;
    let pdf_bytes = app_state.document_service.generate_request_pdf(&entry)?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"demo_request_{}.pdf\"", entry.request.readable_id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
