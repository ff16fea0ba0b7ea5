// src/db/master_data_repo.rs

use std::collections::HashMap;

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::master_data::{
        CreateDistributorPayload, Distributor, KitParameter, KitParameterPayload, MachineModelRow,
        MachineRow,
    },
};

// Exclusões bloqueadas por FK viram Conflict com mensagem legível
fn map_in_use(e: sqlx::Error, what: &str) -> AppError {
    match AppError::from_db(e, |_| None) {
        AppError::Conflict(_) => {
            AppError::Conflict(format!("This {} is referenced by existing demo requests.", what))
        }
        other => other,
    }
}

#[derive(Clone)]
pub struct MasterDataRepository {
    pool: PgPool,
}

impl MasterDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  DISTRIBUIDORES
    // =========================================================================

    pub async fn list_distributors(&self) -> Result<Vec<Distributor>, AppError> {
        let rows = sqlx::query_as::<_, Distributor>("SELECT * FROM distributors ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_distributor(
        &self,
        input: &CreateDistributorPayload,
    ) -> Result<Distributor, AppError> {
        let row = sqlx::query_as::<_, Distributor>(
            r#"
            INSERT INTO distributors (name, location, contact_person, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(input.location.as_deref())
        .bind(input.contact_person.as_deref())
        .bind(input.phone.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_distributor(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM distributors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_in_use(e, "distributor"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  MÁQUINAS & MODELOS
    // =========================================================================

    pub async fn list_machines(&self) -> Result<Vec<MachineRow>, AppError> {
        let rows = sqlx::query_as::<_, MachineRow>("SELECT * FROM machines ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // Todos os modelos agrupados por máquina, para montar a lista de uma vez só
    pub async fn models_by_machine(&self) -> Result<HashMap<Uuid, Vec<String>>, AppError> {
        let rows = sqlx::query_as::<_, MachineModelRow>(
            "SELECT machine_id, name FROM machine_models ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            grouped.entry(row.machine_id).or_default().push(row.name);
        }
        Ok(grouped)
    }

    pub async fn list_machine_models<'e, E>(
        &self,
        executor: E,
        machine_id: Uuid,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM machine_models WHERE machine_id = $1 ORDER BY name",
        )
        .bind(machine_id)
        .fetch_all(executor)
        .await?;
        Ok(names)
    }

    pub async fn create_machine<'e, E>(
        &self,
        executor: E,
        name: &str,
        category: Option<&str>,
    ) -> Result<MachineRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, MachineRow>(
            "INSERT INTO machines (name, category) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(category)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn update_machine<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        category: Option<&str>,
    ) -> Result<Option<MachineRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, MachineRow>(
            "UPDATE machines SET name = $2, category = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // Substitui a lista de modelos inteira (delete + insert em massa)
    pub async fn clear_machine_models<'e, E>(&self, executor: E, machine_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM machine_models WHERE machine_id = $1")
            .bind(machine_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_machine_models<'e, E>(
        &self,
        executor: E,
        machine_id: Uuid,
        models: &[String],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Inserção em massa usando UNNEST
        sqlx::query(
            r#"
            INSERT INTO machine_models (machine_id, name)
            SELECT $1, unnest($2::text[])
            "#,
        )
        .bind(machine_id)
        .bind(models)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_machine(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM machines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_in_use(e, "machine"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PARÂMETROS DE KIT & TIPOS DE DEMO
    // =========================================================================

    pub async fn list_kit_parameters(&self) -> Result<Vec<KitParameter>, AppError> {
        let rows = sqlx::query_as::<_, KitParameter>("SELECT * FROM kit_parameters ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_kit_parameter(
        &self,
        input: &KitParameterPayload,
    ) -> Result<KitParameter, AppError> {
        sqlx::query_as::<_, KitParameter>(
            r#"
            INSERT INTO kit_parameters (name, category, machine_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category.as_deref())
        .bind(input.machine_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unknown_machine(e, input.machine_id))
    }

    pub async fn update_kit_parameter(
        &self,
        id: Uuid,
        input: &KitParameterPayload,
    ) -> Result<Option<KitParameter>, AppError> {
        sqlx::query_as::<_, KitParameter>(
            r#"
            UPDATE kit_parameters
            SET name = $2, category = $3, machine_id = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.category.as_deref())
        .bind(input.machine_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unknown_machine(e, input.machine_id))
    }

    pub async fn delete_kit_parameter(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM kit_parameters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_demo_types(&self) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM demo_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }
}

// FK de kit_parameters.machine_id: a máquina informada não existe
fn unknown_machine(e: sqlx::Error, machine_id: Uuid) -> AppError {
    match AppError::from_db(e, |_| None) {
        AppError::Conflict(_) => AppError::ResourceNotFound(format!("Machine {}", machine_id)),
        other => other,
    }
}
