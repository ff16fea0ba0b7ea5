// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        user_repo::{NewUser, UserChanges},
        UserRepository,
    },
    models::auth::{AuthResponse, Claims, CreateUserPayload, UpdateUserPayload, User, UserRole},
};

// Validade do token emitido no login
const TOKEN_TTL_HOURS: i64 = 24;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn encode_token(secret: &str, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(TOKEN_TTL_HOURS);

    let claims = Claims {
        sub: user.id,
        role: user.role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

// Assinatura e expiração; qualquer falha vira 401
pub fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if !user.active {
            return Err(AppError::AccountDisabled);
        }

        let token = encode_token(&self.jwt_secret, &user)?;
        tracing::info!(user = %user.id, role = ?user.role, "🔑 Login efetuado");
        Ok(AuthResponse { token, user })
    }

    // O papel vem sempre do banco, não do token: troca de papel vale na hora
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_claims(&self.jwt_secret, token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.active {
            return Err(AppError::AccountDisabled);
        }
        Ok(user)
    }

    pub async fn create_user(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let hashed_password = hash_password(&payload.password).await?;
        let email = normalize_email(&payload.email);

        let mut tx = self.pool.begin().await?;

        // Só vendedores recebem userIndex; admins ficam com 0
        let user_index = match payload.role {
            UserRole::Sales => self.user_repo.allocate_user_index(&mut *tx).await?,
            UserRole::Admin => 0,
        };

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                NewUser {
                    name: payload.name.trim(),
                    email: &email,
                    password_hash: &hashed_password,
                    role: payload.role,
                    user_index,
                    region: trimmed(payload.region.as_deref()),
                    phone: trimmed(payload.phone.as_deref()),
                    active: payload.active.unwrap_or(true),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user = %user.id, role = ?user.role, user_index, "👤 Usuário criado");
        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, payload: &UpdateUserPayload) -> Result<User, AppError> {
        let email = payload.email.as_deref().map(normalize_email);

        let mut tx = self.pool.begin().await?;

        let current = self
            .user_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("User".into()))?;

        // Admin promovido a vendedor ganha um índice novo; um índice já
        // emitido nunca muda, para não reescrever o prefixo dos ids antigos.
        let user_index = match payload.role {
            Some(UserRole::Sales) if current.user_index == 0 => {
                Some(self.user_repo.allocate_user_index(&mut *tx).await?)
            }
            _ => None,
        };

        let updated = self
            .user_repo
            .update_user(
                &mut *tx,
                id,
                UserChanges {
                    name: trimmed(payload.name.as_deref()),
                    email: email.as_deref(),
                    region: trimmed(payload.region.as_deref()),
                    phone: trimmed(payload.phone.as_deref()),
                    role: payload.role,
                    user_index,
                },
            )
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("User".into()))?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn set_active(&self, caller: &User, id: Uuid, active: bool) -> Result<User, AppError> {
        if caller.id == id && !active {
            return Err(AppError::InvalidInput("You cannot deactivate your own account.".into()));
        }
        let user = self
            .user_repo
            .set_active(id, active)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("User".into()))?;
        tracing::info!(user = %id, active, "Status do usuário alterado");
        Ok(user)
    }

    pub async fn delete_user(&self, caller: &User, id: Uuid) -> Result<(), AppError> {
        if caller.id == id {
            return Err(AppError::InvalidInput("You cannot delete your own account.".into()));
        }
        if !self.user_repo.delete_user(id).await? {
            return Err(AppError::ResourceNotFound("User".into()));
        }
        tracing::info!(user = %id, "Usuário excluído");
        Ok(())
    }

    // Cria o primeiro admin a partir do ambiente, só se ainda não houver nenhum
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.any_admin_exists().await? {
            return Ok(());
        }

        let payload = CreateUserPayload {
            name: "Administrator".into(),
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::Admin,
            region: None,
            phone: None,
            active: Some(true),
        };
        let admin = self.create_user(&payload).await?;
        tracing::info!(user = %admin.id, email = %admin.email, "Admin inicial criado");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures::insert_user;
    use rstest::rstest;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Priya".into(),
            email: "priya@example.com".into(),
            password_hash: String::new(),
            role,
            active: true,
            user_index: 2,
            region: None,
            phone: None,
            request_seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(UserRole::Admin)]
    #[case(UserRole::Sales)]
    fn token_carries_subject_and_role(#[case] role: UserRole) {
        let u = user(role);
        let token = encode_token("test-secret", &u).unwrap();
        let claims = decode_claims("test-secret", &token).unwrap();
        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.role, role);
        assert_eq!(claims.exp - claims.iat, (TOKEN_TTL_HOURS * 3600) as usize);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = encode_token("one-secret", &user(UserRole::Sales)).unwrap();
        let err = decode_claims("other-secret", &token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(decode_claims("s", "not.a.jwt"), Err(AppError::InvalidToken)));
    }

    fn role_change(role: UserRole) -> UpdateUserPayload {
        UpdateUserPayload { name: None, email: None, region: None, phone: None, role: Some(role) }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn demoted_salesperson_keeps_index_for_a_later_promotion(pool: PgPool) {
        let repo = UserRepository::new(pool.clone());
        let service = AuthService::new(repo.clone(), "test-secret".into(), pool.clone());
        let index = repo.allocate_user_index(&pool).await.unwrap();
        let priya = insert_user(&pool, "Priya", UserRole::Sales, index).await;

        let demoted = service.update_user(priya.id, &role_change(UserRole::Admin)).await.unwrap();
        assert_eq!(demoted.role, UserRole::Admin);
        assert_eq!(demoted.user_index, index);

        let promoted = service.update_user(priya.id, &role_change(UserRole::Sales)).await.unwrap();
        assert_eq!(promoted.user_index, index);

        // Admin que nunca vendeu recebe um índice novo
        let admin = insert_user(&pool, "Admin", UserRole::Admin, 0).await;
        let promoted_admin =
            service.update_user(admin.id, &role_change(UserRole::Sales)).await.unwrap();
        assert_eq!(promoted_admin.user_index, index + 1);
    }

    #[rstest]
    #[case("  Rahul@QuickLab.com ", "rahul@quicklab.com")]
    #[case("admin@quicklab.com", "admin@quicklab.com")]
    fn emails_are_compared_lowercase(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_email(raw), expected);
    }
}
