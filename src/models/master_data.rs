// src/models/master_data.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Distributor {
    pub id: Uuid,
    #[schema(example = "MedSupply India Pvt Ltd")]
    pub name: String,
    #[schema(example = "Mumbai")]
    pub location: Option<String>,
    #[schema(example = "Vikram Mehta")]
    pub contact_person: Option<String>,
    #[schema(example = "+91 22 4567 8901")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Linha crua da tabela machines; os modelos vêm de machine_models
#[derive(Debug, Clone, FromRow)]
pub struct MachineRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MachineModelRow {
    pub machine_id: Uuid,
    pub name: String,
}

// Máquina com a lista de variantes, no formato que o formulário consome
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: Uuid,
    #[schema(example = "Hematology Analyzer")]
    pub name: String,
    #[schema(example = "Diagnostics")]
    pub category: Option<String>,
    #[schema(example = json!(["HA-3000", "HA-5000"]))]
    pub models: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Machine {
    pub fn from_row(row: MachineRow, models: Vec<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            models,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitParameter {
    pub id: Uuid,
    pub machine_id: Uuid,
    #[schema(example = "CBC Panel")]
    pub name: String,
    #[schema(example = "Reagent")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Vendedor ativo, como aparece nos combos do formulário
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub active: bool,
}

// Tudo que o frontend precisa para montar os formulários
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterData {
    pub salespersons: Vec<SalespersonSummary>,
    pub distributors: Vec<Distributor>,
    pub machines: Vec<Machine>,
    pub demo_types: Vec<String>,
    pub kit_parameters: Vec<KitParameter>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDistributorPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub location: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachinePayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub category: Option<String>,
    // No PUT, `None` mantém os modelos atuais; `Some` substitui a lista inteira
    #[schema(example = json!(["HA-3000", "HA-5000"]))]
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitParameterPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub category: Option<String>,
    pub machine_id: Uuid,
}
