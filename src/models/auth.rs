// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Sales,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Rahul Sharma")]
    pub name: String,
    #[schema(example = "rahul@quicklab.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,
    pub active: bool,

    // Prefixo dos readableId das solicitações deste vendedor. Admin criado
    // como admin fica com 0; vendedor rebaixado a admin mantém o índice, que
    // volta a valer se ele for promovido de novo.
    #[schema(example = 1)]
    pub user_index: i32,

    #[schema(example = "North")]
    pub region: Option<String>,
    pub phone: Option<String>,

    // Marca d'água das sequências já emitidas; uso interno
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub request_seq: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "The e-mail provided is invalid."))]
    #[schema(example = "admin@quicklab.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// Dados para o admin cadastrar um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    pub role: UserRole,
    pub region: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub email: Option<String>,
    pub region: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusPayload {
    pub active: bool,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub role: UserRole, // Papel no momento da emissão
    pub exp: usize,     // Expiration time
    pub iat: usize,     // Issued At
}
