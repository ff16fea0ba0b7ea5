// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// O papel exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
    fn label() -> &'static str;
}

/// Guardião de papel: entrega o usuário autenticado se ele tiver o papel `R`.
///
/// Depende do `auth_guard` ter rodado antes na mesma rota.
pub struct RequireRole<R: RoleDef>(pub User, pub PhantomData<R>);

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        if user.role != R::role() {
            return Err(AppError::Forbidden(format!(
                "This action requires the '{}' role.",
                R::label()
            )));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn role() -> UserRole { UserRole::Admin }
    fn label() -> &'static str { "admin" }
}

pub struct Sales;
impl RoleDef for Sales {
    fn role() -> UserRole { UserRole::Sales }
    fn label() -> &'static str { "sales" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::Request,
        http::{Request as HttpRequest, StatusCode},
        middleware::{from_fn, Next},
        routing::get,
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Rahul".into(),
            email: "rahul@example.com".into(),
            password_hash: String::new(),
            role,
            active: true,
            user_index: 1,
            region: None,
            phone: None,
            request_seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    async fn admin_only(RequireRole(admin, _): RequireRole<Admin>) -> String {
        admin.name
    }

    async fn sales_only(RequireRole(sales, _): RequireRole<Sales>) -> String {
        sales.email
    }

    // Faz o papel do auth_guard: injeta o usuário nas extensions
    fn router(role: Option<UserRole>) -> Router {
        Router::new()
            .route("/admin", get(admin_only))
            .route("/sales", get(sales_only))
            .layer(from_fn(move |mut req: Request, next: Next| async move {
                if let Some(role) = role {
                    req.extensions_mut().insert(user(role));
                }
                next.run(req).await
            }))
    }

    async fn status(role: Option<UserRole>, uri: &str) -> StatusCode {
        router(role)
            .oneshot(HttpRequest::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn sales_is_forbidden_on_admin_routes() {
        assert_eq!(status(Some(UserRole::Sales), "/admin").await, StatusCode::FORBIDDEN);
        assert_eq!(status(Some(UserRole::Admin), "/admin").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_is_forbidden_on_sales_routes() {
        assert_eq!(status(Some(UserRole::Admin), "/sales").await, StatusCode::FORBIDDEN);
        assert_eq!(status(Some(UserRole::Sales), "/sales").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_user_is_unauthenticated() {
        assert_eq!(status(None, "/admin").await, StatusCode::UNAUTHORIZED);
    }
}
