// src/handlers/master_data.rs

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
        rbac::{Admin, RequireRole},
    },
    models::{
        master_data::{
            CreateDistributorPayload, Distributor, KitParameter, KitParameterPayload, Machine,
            MachinePayload, MasterData,
        },
        requests::DeleteResponse,
    },
};

fn deleted(what: &str) -> Json<DeleteResponse> {
    Json(DeleteResponse {
        success: true,
        message: format!("{} deleted successfully", what),
    })
}

// GET /api/master-data
#[utoipa::path(
    get,
    path = "/api/master-data",
    tag = "Master Data",
    responses((status = 200, description = "Cadastros para os formulários", body = MasterData)),
    security(("api_jwt" = []))
)]
pub async fn get_master_data(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<MasterData>, AppError> {
    let data = app_state.master_data_service.get_all().await?;
    Ok(Json(data))
}

// =============================================================================
//  DISTRIBUIDORES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/master-data/distributors",
    tag = "Master Data",
    request_body = CreateDistributorPayload,
    responses((status = 201, description = "Distribuidor criado", body = Distributor)),
    security(("api_jwt" = []))
)]
pub async fn create_distributor(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Json(payload): Json<CreateDistributorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let distributor = app_state.master_data_service.create_distributor(&payload).await?;
    Ok((StatusCode::CREATED, Json(distributor)))
}

#[utoipa::path(
    delete,
    path = "/api/master-data/distributors/{id}",
    tag = "Master Data",
    responses(
        (status = 200, description = "Distribuidor excluído", body = DeleteResponse),
        (status = 409, description = "Distribuidor em uso")
    ),
    params(("id" = Uuid, Path, description = "ID do distribuidor")),
    security(("api_jwt" = []))
)]
pub async fn delete_distributor(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    app_state.master_data_service.delete_distributor(id).await?;
    Ok(deleted("Distributor"))
}

// =============================================================================
//  MÁQUINAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/master-data/machines",
    tag = "Master Data",
    request_body = MachinePayload,
    responses((status = 201, description = "Máquina criada", body = Machine)),
    security(("api_jwt" = []))
)]
pub async fn create_machine(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Json(payload): Json<MachinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let machine = app_state.master_data_service.create_machine(&payload).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

#[utoipa::path(
    put,
    path = "/api/master-data/machines/{id}",
    tag = "Master Data",
    request_body = MachinePayload,
    responses((status = 200, description = "Máquina atualizada", body = Machine)),
    params(("id" = Uuid, Path, description = "ID da máquina")),
    security(("api_jwt" = []))
)]
pub async fn update_machine(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MachinePayload>,
) -> Result<Json<Machine>, AppError> {
    payload.validate()?;
    let machine = app_state.master_data_service.update_machine(id, &payload).await?;
    Ok(Json(machine))
}

#[utoipa::path(
    delete,
    path = "/api/master-data/machines/{id}",
    tag = "Master Data",
    responses(
        (status = 200, description = "Máquina excluída", body = DeleteResponse),
        (status = 409, description = "Máquina em uso")
    ),
    params(("id" = Uuid, Path, description = "ID da máquina")),
    security(("api_jwt" = []))
)]
pub async fn delete_machine(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    app_state.master_data_service.delete_machine(id).await?;
    Ok(deleted("Machine"))
}

// =============================================================================
//  PARÂMETROS DE KIT
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/master-data/kit-parameters",
    tag = "Master Data",
    request_body = KitParameterPayload,
    responses((status = 201, description = "Parâmetro criado", body = KitParameter)),
    security(("api_jwt" = []))
)]
pub async fn create_kit_parameter(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Json(payload): Json<KitParameterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let kit = app_state.master_data_service.create_kit_parameter(&payload).await?;
    Ok((StatusCode::CREATED, Json(kit)))
}

#[utoipa::path(
    put,
    path = "/api/master-data/kit-parameters/{id}",
    tag = "Master Data",
    request_body = KitParameterPayload,
    responses((status = 200, description = "Parâmetro atualizado", body = KitParameter)),
    params(("id" = Uuid, Path, description = "ID do parâmetro")),
    security(("api_jwt" = []))
)]
pub async fn update_kit_parameter(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<KitParameterPayload>,
) -> Result<Json<KitParameter>, AppError> {
    payload.validate()?;
    let kit = app_state.master_data_service.update_kit_parameter(id, &payload).await?;
    Ok(Json(kit))
}

#[utoipa::path(
    delete,
    path = "/api/master-data/kit-parameters/{id}",
    tag = "Master Data",
    responses((status = 200, description = "Parâmetro excluído", body = DeleteResponse)),
    params(("id" = Uuid, Path, description = "ID do parâmetro")),
    security(("api_jwt" = []))
)]
pub async fn delete_kit_parameter(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    app_state.master_data_service.delete_kit_parameter(id).await?;
    Ok(deleted("Kit parameter"))
}
