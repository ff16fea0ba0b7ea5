// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserRole},
        master_data::SalespersonSummary,
    },
};

// Dados já tratados (senha com hash, e-mail normalizado) para o INSERT
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub user_index: i32,
    pub region: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub active: bool,
}

// Campos opcionais do PUT; `None` mantém o valor atual
pub struct UserChanges<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub region: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub role: Option<UserRole>,
    pub user_index: Option<i32>,
}

fn map_user_write_error(e: sqlx::Error) -> AppError {
    AppError::from_db(e, |constraint| match constraint {
        "users_email_key" => Some(AppError::EmailAlreadyExists),
        "users_sales_index_key" => Some(AppError::Conflict(
            "Another salesperson already uses this index.".into(),
        )),
        _ => None,
    })
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // E-mail é comparado sem diferenciar maiúsculas
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email.trim())
                .fetch_optional(&self.pool)
                .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Trava a linha do usuário até o fim da transação.
    // Serializa a emissão de readableId por vendedor.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_user)
    }

    pub async fn any_admin_exists(&self) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin')")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    // Próximo userIndex de vendedor. O UPDATE ... RETURNING na linha única do
    // alocador é atômico; o GREATEST cobre bancos com usuários anteriores ao alocador.
    pub async fn allocate_user_index<'e, E>(&self, executor: E) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let next: i32 = sqlx::query_scalar(
            r#"
            UPDATE user_index_allocator
            SET last_index = GREATEST(
                last_index,
                (SELECT COALESCE(MAX(user_index), 0) FROM users WHERE role = 'sales')
            ) + 1
            WHERE id = TRUE
            RETURNING last_index
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(next)
    }

    pub async fn create_user<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, user_index, region, phone, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.user_index)
        .bind(new_user.region)
        .bind(new_user.phone)
        .bind(new_user.active)
        .fetch_one(executor)
        .await
        .map_err(map_user_write_error)
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: UserChanges<'_>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                region = COALESCE($4, region),
                phone = COALESCE($5, phone),
                role = COALESCE($6, role),
                user_index = COALESCE($7, user_index),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.region)
        .bind(changes.phone)
        .bind(changes.role)
        .bind(changes.user_index)
        .fetch_optional(executor)
        .await
        .map_err(map_user_write_error)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    // Falha com Conflict se o usuário ainda é dono de solicitações
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from_db(e, |_| None) {
                AppError::Conflict(_) => {
                    AppError::Conflict("This user still owns demo requests.".into())
                }
                other => other,
            })?;
        Ok(result.rows_affected() > 0)
    }

    // Avança a marca d'água; nunca retrocede
    pub async fn advance_request_seq<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        sequence: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE users SET request_seq = GREATEST(request_seq, $2) WHERE id = $1")
            .bind(id)
            .bind(sequence)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list_active_salespersons(&self) -> Result<Vec<SalespersonSummary>, AppError> {
        let people = sqlx::query_as::<_, SalespersonSummary>(
            r#"
            SELECT id, name, email, phone, region, active
            FROM users
            WHERE role = 'sales' AND active = TRUE
            ORDER BY user_index
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures::insert_user;

    #[sqlx::test(migrations = "./migrations")]
    async fn request_seq_only_moves_forward(pool: PgPool) {
        let rahul = insert_user(&pool, "Rahul", UserRole::Sales, 1).await;
        let repo = UserRepository::new(pool.clone());

        repo.advance_request_seq(&pool, rahul.id, 5).await.unwrap();
        repo.advance_request_seq(&pool, rahul.id, 3).await.unwrap();

        let stored = repo.find_by_id(rahul.id).await.unwrap().unwrap();
        assert_eq!(stored.request_seq, 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn allocated_indexes_skip_those_already_in_use(pool: PgPool) {
        let repo = UserRepository::new(pool.clone());
        assert_eq!(repo.allocate_user_index(&pool).await.unwrap(), 1);

        // Vendedor gravado antes do alocador, com índice acima do contador
        insert_user(&pool, "Legacy", UserRole::Sales, 7).await;
        assert_eq!(repo.allocate_user_index(&pool).await.unwrap(), 8);
    }
}
