// src/handlers/auth.rs

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
        auth::{
            AuthResponse, CreateUserPayload, LoginUserPayload, UpdateUserPayload,
            UpdateUserStatusPayload, User,
        },
        requests::DeleteResponse,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "E-mail ou senha inválidos"),
        (status = 403, description = "Conta desativada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(response))
}

// GET /api/auth/profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    responses((status = 200, description = "Usuário autenticado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn get_profile(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn register(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.create_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/auth/users/{id}
#[utoipa::path(
    put,
    path = "/api/auth/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    _admin: RequireRole<Admin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.update_user(id, &payload).await?;
    Ok(Json(user))
}

// PATCH /api/auth/users/{id}/status
#[utoipa::path(
    patch,
    path = "/api/auth/users/{id}/status",
    tag = "Users",
    request_body = UpdateUserStatusPayload,
    responses((status = 200, description = "Status alterado", body = User)),
    params(("id" = Uuid, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn set_user_status(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<Admin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusPayload>,
) -> Result<Json<User>, AppError> {
    let user = app_state
        .auth_service
        .set_active(&admin, id, payload.active)
        .await?;
    Ok(Json(user))
}

// DELETE /api/auth/users/{id}
#[utoipa::path(
    delete,
    path = "/api/auth/users/{id}",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário excluído", body = DeleteResponse),
        (status = 409, description = "Usuário ainda possui solicitações")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    app_state.auth_service.delete_user(&admin, id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "User deleted successfully".into(),
    }))
}
