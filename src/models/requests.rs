// src/models/requests.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Status ---

// Os três estados que o ciclo de vida controla, mais rótulos livres do admin
// ("approved", "returned", "completed"...) que são só gravados e exibidos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Pending,
    Dispatched,
    Received,
    Other(String),
}

impl RequestStatus {
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "pending" => RequestStatus::Pending,
            "dispatched" => RequestStatus::Dispatched,
            "received" => RequestStatus::Received,
            _ => RequestStatus::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Dispatched => "dispatched",
            RequestStatus::Received => "received",
            RequestStatus::Other(label) => label,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(value: String) -> Self {
        RequestStatus::parse(&value)
    }
}

impl From<RequestStatus> for String {
    fn from(value: RequestStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Mapeia o CREATE TYPE audit_action do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Created,
    StatusUpdate,
    LogisticsUpdate,
    Received,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitItem {
    pub kit_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Kit name is required."))]
    #[schema(example = "CBC Panel")]
    pub kit_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "Box")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemoRequest {
    pub id: Uuid,
    #[schema(example = "100005")]
    pub readable_id: String,
    pub salesperson_id: Uuid,
    pub distributor_id: Uuid,
    pub machine_id: Uuid,
    #[schema(example = "HA-5000")]
    pub model: String,

    #[schema(example = "Product Evaluation")]
    pub demo_type: String,
    pub proposed_date: Option<NaiveDate>,
    #[schema(example = "1 week")]
    pub expected_duration: Option<String>,
    #[schema(example = json!(["CBC"]))]
    pub application_params: Vec<String>,
    pub sample_volume: Option<String>,
    pub special_requirements: Option<String>,
    #[schema(value_type = Vec<KitItem>)]
    pub kit_items: Json<Vec<KitItem>>,
    pub business_potential: Option<String>,
    pub competitor_details: Option<String>,
    pub reason_for_demo: Option<String>,
    pub urgency_level: Option<String>,
    pub regional_manager_approval: bool,
    pub regional_manager_name: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub expected_purchase_date: Option<NaiveDate>,
    pub doctor_name: Option<String>,
    pub doctor_department: Option<String>,
    pub hospital_name: Option<String>,
    pub location: Option<String>,
    pub expected_return_date: Option<NaiveDate>,

    #[sqlx(try_from = "String")]
    #[schema(value_type = String, example = "pending")]
    pub status: RequestStatus,
    pub machine_serial_number: Option<String>,
    pub dispatched_by: Option<String>,
    pub dispatch_date: Option<NaiveDate>,
    pub courier_details: Option<String>,
    pub tracking_number: Option<String>,
    pub condition_on_return: Option<String>,
    pub remarks: Option<String>,
    pub received_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem: solicitação + nomes para exibição
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestListEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: DemoRequest,
    pub salesperson_name: String,
    pub salesperson_email: String,
    pub distributor_name: String,
    pub machine_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub request_id: Uuid,
    pub action: AuditAction,
    pub performed_by: Uuid,
    pub performed_by_name: Option<String>,
    #[schema(example = "Demo request submitted (ID: 100005)")]
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

// Visão de detalhe, com o histórico em ordem cronológica
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemoRequestDetail {
    #[serde(flatten)]
    pub header: RequestListEntry,
    pub logs: Vec<AuditLogEntry>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    #[validate(required(message = "The field 'distributorId' is required."))]
    pub distributor_id: Option<Uuid>,

    #[validate(required(message = "The field 'machineId' is required."))]
    pub machine_id: Option<Uuid>,

    #[validate(length(min = 1, message = "The model is required."))]
    #[schema(example = "HA-5000")]
    pub model: String,

    #[validate(length(min = 1, message = "The demo type is required."))]
    #[schema(example = "Product Evaluation")]
    pub demo_type: String,

    pub proposed_date: Option<NaiveDate>,
    pub expected_duration: Option<String>,
    #[serde(default)]
    pub application_params: Vec<String>,
    pub sample_volume: Option<String>,
    pub special_requirements: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub kit_items: Vec<KitItem>,

    pub business_potential: Option<String>,
    pub competitor_details: Option<String>,
    pub reason_for_demo: Option<String>,
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub regional_manager_approval: bool,
    pub regional_manager_name: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub expected_purchase_date: Option<NaiveDate>,
    pub doctor_name: Option<String>,
    pub doctor_department: Option<String>,
    pub hospital_name: Option<String>,
    pub location: Option<String>,
    pub expected_return_date: Option<NaiveDate>,
}

// PATCH do admin: qualquer subconjunto destes campos
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatePayload {
    #[schema(example = "dispatched")]
    pub status: Option<String>,
    #[schema(example = "SN-HA5-00912")]
    pub machine_serial_number: Option<String>,
    pub dispatched_by: Option<String>,
    pub dispatch_date: Option<NaiveDate>,
    pub courier_details: Option<String>,
    pub tracking_number: Option<String>,
    pub condition_on_return: Option<String>,
    pub remarks: Option<String>,
}

// Patch já normalizado (strings vazias viram None) que o repositório grava.
// `None` mantém o valor atual da coluna.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestChanges {
    pub status: Option<RequestStatus>,
    pub machine_serial_number: Option<String>,
    pub dispatched_by: Option<String>,
    pub dispatch_date: Option<NaiveDate>,
    pub courier_details: Option<String>,
    pub tracking_number: Option<String>,
    pub condition_on_return: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pending", RequestStatus::Pending)]
    #[case(" Dispatched ", RequestStatus::Dispatched)]
    #[case("RECEIVED", RequestStatus::Received)]
    #[case("approved", RequestStatus::Other("approved".into()))]
    fn parses_known_and_free_labels(#[case] label: &str, #[case] expected: RequestStatus) {
        assert_eq!(RequestStatus::parse(label), expected);
    }

    #[test]
    fn free_labels_are_stored_lowercase() {
        let status = RequestStatus::parse("Returned");
        assert_eq!(status.as_str(), "returned");
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("returned"));
    }

    #[test]
    fn audit_action_uses_screaming_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(AuditAction::StatusUpdate).unwrap(),
            json!("STATUS_UPDATE")
        );
    }
}
