// src/handlers/requests.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{Admin, RequireRole, Sales},
    },
    models::requests::{
        CreateRequestPayload, DeleteResponse, DemoRequest, DemoRequestDetail, RequestListEntry,
        StatusUpdatePayload,
    },
};

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Solicitação criada com readableId", body = DemoRequest),
        (status = 403, description = "Apenas vendedores"),
        (status = 409, description = "Não foi possível emitir um readableId livre")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    RequireRole(salesperson, _): RequireRole<Sales>,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = app_state.request_service.create(&salesperson, &payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/requests
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    responses((status = 200, description = "Admin: todas. Vendedor: as próprias", body = Vec<RequestListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<RequestListEntry>>, AppError> {
    let requests = app_state.request_service.list(&user).await?;
    Ok(Json(requests))
}

// GET /api/requests/{id}
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    tag = "Requests",
    responses(
        (status = 200, description = "Detalhe com histórico", body = DemoRequestDetail),
        (status = 403, description = "Solicitação de outro vendedor"),
        (status = 404, description = "Não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn get_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DemoRequestDetail>, AppError> {
    let detail = app_state.request_service.detail(&user, id).await?;
    Ok(Json(detail))
}

// PATCH /api/requests/{id}/status
#[utoipa::path(
    patch,
    path = "/api/requests/{id}/status",
    tag = "Requests",
    request_body = StatusUpdatePayload,
    responses(
        (status = 200, description = "Status/logística atualizados", body = DemoRequest),
        (status = 400, description = "Despacho sem número de série ou transição inválida")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn update_request_status(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<Admin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdatePayload>,
) -> Result<Json<DemoRequest>, AppError> {
    let request = app_state.request_service.update_status(&admin, id, payload).await?;
    Ok(Json(request))
}

// PATCH /api/requests/{id}/receive
#[utoipa::path(
    patch,
    path = "/api/requests/{id}/receive",
    tag = "Requests",
    responses(
        (status = 200, description = "Marcada como recebida", body = DemoRequest),
        (status = 400, description = "Solicitação não está despachada"),
        (status = 403, description = "Não é o vendedor dono")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn receive_request(
    State(app_state): State<AppState>,
    RequireRole(salesperson, _): RequireRole<Sales>,
    Path(id): Path<Uuid>,
) -> Result<Json<DemoRequest>, AppError> {
    let request = app_state.request_service.receive(&salesperson, id).await?;
    Ok(Json(request))
}

// DELETE /api/requests/{id}
#[utoipa::path(
    delete,
    path = "/api/requests/{id}",
    tag = "Requests",
    responses(
        (status = 200, description = "Solicitação excluída", body = DeleteResponse),
        (status = 403, description = "Solicitação de outro vendedor"),
        (status = 404, description = "Não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn delete_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    app_state.request_service.delete(&user, id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Request deleted successfully".into(),
    }))
}
