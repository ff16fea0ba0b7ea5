// src/services/request_lifecycle.rs

//! Regras do ciclo de vida das solicitações, sem acesso a banco.
//!
//! `pending -> dispatched` só pelo admin e com número de série;
//! `dispatched -> received` só pelo vendedor dono. Os demais status são
//! rótulos livres do admin. Cada decisão devolve o registro de auditoria que o
//! serviço grava na mesma transação da mudança.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserRole},
        requests::{AuditAction, DemoRequest, RequestChanges, RequestStatus, StatusUpdatePayload},
    },
};

// Quem está agindo, já autenticado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor { id: user.id, role: user.role }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub action: AuditAction,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminUpdatePlan {
    pub changes: RequestChanges,
    pub audit: PlannedEntry,
}

impl AdminUpdatePlan {
    pub fn new_status(&self) -> Option<&RequestStatus> {
        self.changes.status.as_ref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Strings vazias contam como ausentes, igual ao formulário do admin envia
pub fn normalize(payload: StatusUpdatePayload) -> RequestChanges {
    RequestChanges {
        status: non_blank(payload.status).map(|s| RequestStatus::parse(&s)),
        machine_serial_number: non_blank(payload.machine_serial_number),
        dispatched_by: non_blank(payload.dispatched_by),
        dispatch_date: payload.dispatch_date,
        courier_details: non_blank(payload.courier_details),
        tracking_number: non_blank(payload.tracking_number),
        condition_on_return: non_blank(payload.condition_on_return),
        remarks: non_blank(payload.remarks),
    }
}

fn changed_fields(changes: &RequestChanges) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if changes.machine_serial_number.is_some() {
        fields.push("machineSerialNumber");
    }
    if changes.dispatched_by.is_some() {
        fields.push("dispatchedBy");
    }
    if changes.dispatch_date.is_some() {
        fields.push("dispatchDate");
    }
    if changes.courier_details.is_some() {
        fields.push("courierDetails");
    }
    if changes.tracking_number.is_some() {
        fields.push("trackingNumber");
    }
    if changes.condition_on_return.is_some() {
        fields.push("conditionOnReturn");
    }
    if changes.remarks.is_some() {
        fields.push("remarks");
    }
    fields
}

pub fn creation_entry(readable_id: &str) -> PlannedEntry {
    PlannedEntry {
        action: AuditAction::Created,
        details: format!("Demo request submitted (ID: {})", readable_id),
    }
}

pub fn can_view(actor: Actor, request: &DemoRequest) -> bool {
    actor.is_admin() || request.salesperson_id == actor.id
}

pub fn ensure_can_view(actor: Actor, request: &DemoRequest) -> Result<(), AppError> {
    if can_view(actor, request) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied.".into()))
    }
}

// Mesma regra da visualização: admin qualquer, vendedor só as próprias
pub fn ensure_can_delete(actor: Actor, request: &DemoRequest) -> Result<(), AppError> {
    ensure_can_view(actor, request)
}

/// Decide o PATCH do admin sobre status e logística.
///
/// Toda mutação gera auditoria: com status vira `STATUS_UPDATE`, sem status
/// vira `LOGISTICS_UPDATE` com a lista dos campos alterados.
pub fn plan_admin_update(
    actor: Actor,
    current: &DemoRequest,
    payload: StatusUpdatePayload,
) -> Result<AdminUpdatePlan, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden("Only admins can update request status.".into()));
    }

    let changes = normalize(payload);
    if changes == RequestChanges::default() {
        return Err(AppError::InvalidInput("No fields to update were supplied.".into()));
    }

    match &changes.status {
        Some(RequestStatus::Received) => {
            return Err(AppError::InvalidState(
                "Only the owning salesperson can mark a request as received.".into(),
            ));
        }
        Some(RequestStatus::Dispatched) => {
            let stored_serial = current
                .machine_serial_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty());
            if changes.machine_serial_number.is_none() && stored_serial.is_none() {
                return Err(AppError::SerialNumberRequired);
            }
        }
        _ => {}
    }

    let fields = changed_fields(&changes);
    let audit = match &changes.status {
        Some(new_status) => {
            let mut details = format!("Status updated from {} to {}", current.status, new_status);
            if !fields.is_empty() {
                details.push_str(&format!("; updated fields: {}", fields.join(", ")));
            }
            PlannedEntry { action: AuditAction::StatusUpdate, details }
        }
        None => PlannedEntry {
            action: AuditAction::LogisticsUpdate,
            details: format!("Updated fields: {}", fields.join(", ")),
        },
    };

    Ok(AdminUpdatePlan { changes, audit })
}

// Confirmação de recebimento pelo vendedor dono
pub fn plan_receive(actor: Actor, current: &DemoRequest) -> Result<PlannedEntry, AppError> {
    if actor.role != UserRole::Sales || current.salesperson_id != actor.id {
        return Err(AppError::Forbidden("Access denied.".into()));
    }
    if current.status != RequestStatus::Dispatched {
        return Err(AppError::InvalidState(
            "Only dispatched requests can be marked as received.".into(),
        ));
    }
    Ok(PlannedEntry {
        action: AuditAction::Received,
        details: "Marked as received by sales".into(),
    })
}
