// src/db/request_repo.rs

use chrono::NaiveDate;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::requests::{
        CreateRequestPayload, DemoRequest, RequestChanges, RequestListEntry, RequestStatus,
    },
};

// Solicitação + nomes de vendedor, distribuidor e máquina
const ENTRY_SELECT: &str = r#"
    SELECT
        r.*,
        u.name AS salesperson_name,
        u.email AS salesperson_email,
        d.name AS distributor_name,
        m.name AS machine_name
    FROM demo_requests r
    JOIN users u ON u.id = r.salesperson_id
    JOIN distributors d ON d.id = r.distributor_id
    JOIN machines m ON m.id = r.machine_id
"#;

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // `salesperson_id = None` lista tudo (visão do admin)
    pub async fn list_entries(
        &self,
        salesperson_id: Option<Uuid>,
    ) -> Result<Vec<RequestListEntry>, AppError> {
        let sql = format!(
            "{ENTRY_SELECT} WHERE ($1::uuid IS NULL OR r.salesperson_id = $1) ORDER BY r.created_at DESC"
        );
        let rows = sqlx::query_as::<_, RequestListEntry>(&sql)
            .bind(salesperson_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_entry(&self, id: Uuid) -> Result<Option<RequestListEntry>, AppError> {
        let sql = format!("{ENTRY_SELECT} WHERE r.id = $1");
        let row = sqlx::query_as::<_, RequestListEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // Trava a solicitação: leitura do status e escrita da transição ficam atômicas
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<DemoRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DemoRequest>(
            "SELECT * FROM demo_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn readable_ids_for_salesperson<'e, E>(
        &self,
        executor: E,
        salesperson_id: Uuid,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT readable_id FROM demo_requests WHERE salesperson_id = $1")
                .bind(salesperson_id)
                .fetch_all(executor)
                .await?;
        Ok(ids)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        salesperson_id: Uuid,
        readable_id: &str,
        input: &CreateRequestPayload,
    ) -> Result<DemoRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, DemoRequest>(
            r#"
            INSERT INTO demo_requests (
                readable_id, salesperson_id, distributor_id, machine_id, model,
                demo_type, proposed_date, expected_duration, application_params,
                sample_volume, special_requirements, kit_items, business_potential,
                competitor_details, reason_for_demo, urgency_level,
                regional_manager_approval, regional_manager_name, approval_date,
                expected_purchase_date, doctor_name, doctor_department, hospital_name,
                location, expected_return_date, status
            )
            VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9,
                $10, $11, $12, $13,
                $14, $15, $16,
                $17, $18, $19,
                $20, $21, $22, $23,
                $24, $25, $26
            )
            RETURNING *
            "#,
        )
        .bind(readable_id)
        .bind(salesperson_id)
        .bind(input.distributor_id)
        .bind(input.machine_id)
        .bind(input.model.trim())
        .bind(input.demo_type.trim())
        .bind(input.proposed_date)
        .bind(input.expected_duration.as_deref())
        .bind(&input.application_params)
        .bind(input.sample_volume.as_deref())
        .bind(input.special_requirements.as_deref())
        .bind(Json(&input.kit_items))
        .bind(input.business_potential.as_deref())
        .bind(input.competitor_details.as_deref())
        .bind(input.reason_for_demo.as_deref())
        .bind(input.urgency_level.as_deref())
        .bind(input.regional_manager_approval)
        .bind(input.regional_manager_name.as_deref())
        .bind(input.approval_date)
        .bind(input.expected_purchase_date)
        .bind(input.doctor_name.as_deref())
        .bind(input.doctor_department.as_deref())
        .bind(input.hospital_name.as_deref())
        .bind(input.location.as_deref())
        .bind(input.expected_return_date)
        .bind(RequestStatus::Pending.as_str())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            match AppError::from_db(e, |constraint| match constraint {
                "demo_requests_readable_id_key" => {
                    Some(AppError::ReadableIdTaken(readable_id.to_string()))
                }
                _ => None,
            }) {
                // Única FK que o vendedor controla: distribuidor ou máquina inexistente
                AppError::Conflict(_) => {
                    AppError::ResourceNotFound("Distributor or machine".into())
                }
                other => other,
            }
        })
    }

    pub async fn apply_changes<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &RequestChanges,
    ) -> Result<DemoRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DemoRequest>(
            r#"
            UPDATE demo_requests SET
                status = COALESCE($2, status),
                machine_serial_number = COALESCE($3, machine_serial_number),
                dispatched_by = COALESCE($4, dispatched_by),
                dispatch_date = COALESCE($5, dispatch_date),
                courier_details = COALESCE($6, courier_details),
                tracking_number = COALESCE($7, tracking_number),
                condition_on_return = COALESCE($8, condition_on_return),
                remarks = COALESCE($9, remarks),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.status.as_ref().map(|s| s.as_str()))
        .bind(changes.machine_serial_number.as_deref())
        .bind(changes.dispatched_by.as_deref())
        .bind(changes.dispatch_date)
        .bind(changes.courier_details.as_deref())
        .bind(changes.tracking_number.as_deref())
        .bind(changes.condition_on_return.as_deref())
        .bind(changes.remarks.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn mark_received<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        received_date: NaiveDate,
    ) -> Result<DemoRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DemoRequest>(
            r#"
            UPDATE demo_requests
            SET status = $2, received_date = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(RequestStatus::Received.as_str())
        .bind(received_date)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    // Os registros de auditoria saem junto (ON DELETE CASCADE)
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM demo_requests WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
