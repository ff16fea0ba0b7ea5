use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante tem um status HTTP e um código estável que o frontend pode checar.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("One or more fields are invalid.")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    // Separado do InvalidInput para o vendedor entender que falta o número de série
    #[error("machine serial number required")]
    SerialNumberRequired,

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("This e-mail is already in use.")]
    EmailAlreadyExists,

    #[error("{0}")]
    Conflict(String),

    // Colisão no readableId; o serviço de solicitações tenta de novo antes de expor
    #[error("Readable id {0} is already taken.")]
    ReadableIdTaken(String),

    #[error("Invalid e-mail or password.")]
    InvalidCredentials,

    #[error("Account is disabled.")]
    AccountDisabled,

    #[error("Missing or invalid authentication token.")]
    InvalidToken,

    #[error("{0} not found.")]
    ResourceNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Falha ao gerar o PDF: {0}")]
    DocumentError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::SerialNumberRequired
            | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::AccountDisabled => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::Conflict(_) | AppError::ReadableIdTaken(_) => {
                StatusCode::CONFLICT
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::DocumentError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => "VALIDATION_ERROR",
            AppError::SerialNumberRequired => "SERIAL_NUMBER_REQUIRED",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::AccountDisabled => "ACCOUNT_DISABLED",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::Conflict(_) | AppError::ReadableIdTaken(_) => "CONFLICT",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "UNAUTHENTICATED",
            AppError::ResourceNotFound(_) => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }

    // Traduz violações de integridade do Postgres nos erros de domínio.
    // `on_unique` decide o erro para cada constraint única conhecida.
    pub fn from_db(e: sqlx::Error, on_unique: impl Fn(&str) -> Option<AppError>) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                if let Some(mapped) = db_err.constraint().and_then(&on_unique) {
                    return mapped;
                }
                return AppError::Conflict("A record with these values already exists.".into());
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict(
                    "The record is referenced by, or references, data that does not allow this change."
                        .into(),
                );
            }
        }
        e.into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        if let AppError::ValidationError(errors) = &self {
            // Retorna todos os detalhes da validação, campo a campo
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": self.to_string(),
                "code": code,
                "details": details,
            }));
            return (status, body).into_response();
        }

        let message = if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada; o cliente recebe só a genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
            "An unexpected error occurred.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message, "code": code }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(AppError::SerialNumberRequired, StatusCode::BAD_REQUEST, "SERIAL_NUMBER_REQUIRED")]
    #[case(AppError::InvalidState("x".into()), StatusCode::BAD_REQUEST, "INVALID_STATE")]
    #[case(AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(AppError::ResourceNotFound("Request".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(AppError::ReadableIdTaken("100001".into()), StatusCode::CONFLICT, "CONFLICT")]
    #[case(AppError::InvalidToken, StatusCode::UNAUTHORIZED, "UNAUTHENTICATED")]
    #[case(AppError::AccountDisabled, StatusCode::FORBIDDEN, "ACCOUNT_DISABLED")]
    fn maps_variants_to_status_and_code(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.code(), code);
    }

    #[tokio::test]
    async fn serial_number_message_is_distinguishable() {
        let (status, body) = body_json(AppError::SerialNumberRequired).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "machine serial number required");
        assert_eq!(body["code"], "SERIAL_NUMBER_REQUIRED");
    }

    #[tokio::test]
    async fn server_errors_do_not_leak_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("connection refused on 10.0.0.3"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected error occurred.");
        assert_eq!(body["code"], "INTERNAL_ERROR");
    }
}
