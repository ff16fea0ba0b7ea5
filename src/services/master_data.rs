// src/services/master_data.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MasterDataRepository, UserRepository},
    models::master_data::{
        CreateDistributorPayload, Distributor, KitParameter, KitParameterPayload, Machine,
        MachinePayload, MasterData,
    },
};

// Remove vazios e repetidos, mantendo a ordem digitada pelo admin
pub fn clean_models(models: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(models.len());
    for name in models.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
        if !out.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

#[derive(Clone)]
pub struct MasterDataService {
    pool: PgPool,
    repo: MasterDataRepository,
    user_repo: UserRepository,
}

impl MasterDataService {
    pub fn new(pool: PgPool, repo: MasterDataRepository, user_repo: UserRepository) -> Self {
        Self { pool, repo, user_repo }
    }

    /// Tudo que os formulários precisam numa chamada só.
    pub async fn get_all(&self) -> Result<MasterData, AppError> {
        let (salespersons, distributors, machine_rows, mut models, demo_types, kit_parameters) = tokio::try_join!(
            self.user_repo.list_active_salespersons(),
            self.repo.list_distributors(),
            self.repo.list_machines(),
            self.repo.models_by_machine(),
            self.repo.list_demo_types(),
            self.repo.list_kit_parameters(),
        )?;

        let machines = machine_rows
            .into_iter()
            .map(|row| {
                let names = models.remove(&row.id).unwrap_or_default();
                Machine::from_row(row, names)
            })
            .collect();

        Ok(MasterData { salespersons, distributors, machines, demo_types, kit_parameters })
    }

    // --- Distribuidores ---

    pub async fn create_distributor(
        &self,
        payload: &CreateDistributorPayload,
    ) -> Result<Distributor, AppError> {
        let distributor = self.repo.create_distributor(payload).await?;
        tracing::info!(distributor = %distributor.id, "Distribuidor criado");
        Ok(distributor)
    }

    pub async fn delete_distributor(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_distributor(id).await? {
            return Err(AppError::ResourceNotFound("Distributor".into()));
        }
        Ok(())
    }

    // --- Máquinas ---

    pub async fn create_machine(&self, payload: &MachinePayload) -> Result<Machine, AppError> {
        let models = clean_models(payload.models.as_deref().unwrap_or_default());

        let mut tx = self.pool.begin().await?;
        let row = self
            .repo
            .create_machine(&mut *tx, payload.name.trim(), payload.category.as_deref())
            .await?;
        if !models.is_empty() {
            self.repo.insert_machine_models(&mut *tx, row.id, &models).await?;
        }
        tx.commit().await?;

        tracing::info!(machine = %row.id, models = models.len(), "Máquina criada");
        Ok(Machine::from_row(row, models))
    }

    // `models = None` mantém a lista atual
    pub async fn update_machine(&self, id: Uuid, payload: &MachinePayload) -> Result<Machine, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = self
            .repo
            .update_machine(&mut *tx, id, payload.name.trim(), payload.category.as_deref())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Machine".into()))?;

        let models = match &payload.models {
            Some(given) => {
                let models = clean_models(given);
                self.repo.clear_machine_models(&mut *tx, id).await?;
                if !models.is_empty() {
                    self.repo.insert_machine_models(&mut *tx, id, &models).await?;
                }
                models
            }
            None => self.repo.list_machine_models(&mut *tx, id).await?,
        };

        tx.commit().await?;
        Ok(Machine::from_row(row, models))
    }

    pub async fn delete_machine(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_machine(id).await? {
            return Err(AppError::ResourceNotFound("Machine".into()));
        }
        Ok(())
    }

    // --- Parâmetros de kit ---

    pub async fn create_kit_parameter(
        &self,
        payload: &KitParameterPayload,
    ) -> Result<KitParameter, AppError> {
        self.repo.create_kit_parameter(payload).await
    }

    pub async fn update_kit_parameter(
        &self,
        id: Uuid,
        payload: &KitParameterPayload,
    ) -> Result<KitParameter, AppError> {
        self.repo
            .update_kit_parameter(id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Kit parameter".into()))
    }

    pub async fn delete_kit_parameter(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_kit_parameter(id).await? {
            return Err(AppError::ResourceNotFound("Kit parameter".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_are_trimmed_and_deduplicated() {
        let given = vec![
            " HA-3000 ".to_string(),
            "".to_string(),
            "HA-5000".to_string(),
            "ha-3000".to_string(),
        ];
        assert_eq!(clean_models(&given), vec!["HA-3000", "HA-5000"]);
    }

    #[test]
    fn no_models_gives_empty_list() {
        assert!(clean_models(&[]).is_empty());
    }
}
