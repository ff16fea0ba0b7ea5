// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::requests::{AuditAction, AuditLogEntry},
};

// Histórico append-only: não existe update nem delete individual
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Sempre chamado dentro da mesma transação da mudança que registra
    pub async fn append<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        action: AuditAction,
        performed_by: Uuid,
        details: &str,
    ) -> Result<AuditLogEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            WITH inserted AS (
                INSERT INTO audit_logs (request_id, action, performed_by, details)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT i.*, u.name AS performed_by_name
            FROM inserted i
            LEFT JOIN users u ON u.id = i.performed_by
            "#,
        )
        .bind(request_id)
        .bind(action)
        .bind(performed_by)
        .bind(details)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn list_for_request(&self, request_id: Uuid) -> Result<Vec<AuditLogEntry>, AppError> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT a.*, u.name AS performed_by_name
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.performed_by
            WHERE a.request_id = $1
            ORDER BY a.timestamp ASC, a.id ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{
            test_fixtures::{insert_catalog, insert_user},
            RequestRepository,
        },
        models::auth::UserRole,
    };

    #[sqlx::test(migrations = "./migrations")]
    async fn entries_of_one_transaction_keep_their_write_order(pool: PgPool) {
        let rahul = insert_user(&pool, "Rahul", UserRole::Sales, 1).await;
        let catalog = insert_catalog(&pool).await;
        let request = RequestRepository::new(pool.clone())
            .insert(&pool, rahul.id, "100001", &catalog.request_payload())
            .await
            .unwrap();
        let audit = AuditRepository::new(pool.clone());

        let mut tx = pool.begin().await.unwrap();
        let first = audit
            .append(&mut *tx, request.id, AuditAction::Created, rahul.id, "first")
            .await
            .unwrap();
        let second = audit
            .append(&mut *tx, request.id, AuditAction::LogisticsUpdate, rahul.id, "second")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(second.timestamp > first.timestamp);
        assert_eq!(first.performed_by_name.as_deref(), Some("Rahul"));

        let details: Vec<String> = audit
            .list_for_request(request.id)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.details)
            .collect();
        assert_eq!(details, ["first", "second"]);
    }
}
