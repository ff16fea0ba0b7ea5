// src/services/requests.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, RequestRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        requests::{
            CreateRequestPayload, DemoRequest, DemoRequestDetail, RequestListEntry,
            StatusUpdatePayload,
        },
    },
    services::{
        notification_service::{NotificationService, RequestEvent},
        readable_id,
        request_lifecycle::{self, Actor},
    },
};

#[derive(Clone)]
pub struct RequestService {
    pool: PgPool,
    request_repo: RequestRepository,
    audit_repo: AuditRepository,
    user_repo: UserRepository,
    notifier: NotificationService,
}

impl RequestService {
    pub fn new(
        pool: PgPool,
        request_repo: RequestRepository,
        audit_repo: AuditRepository,
        user_repo: UserRepository,
        notifier: NotificationService,
    ) -> Self {
        Self { pool, request_repo, audit_repo, user_repo, notifier }
    }

    /// Cria a solicitação do vendedor com um readableId novo.
    ///
    /// Colisão na constraint única do readableId desfaz a transação e tenta de
    /// novo com uma sequência acima da que falhou. Acima de 99999 o prefixo de
    /// um índice pode coincidir com o de outro (`1` + `100001` = `11` + `00001`),
    /// então as tentativas seguem enquanto a sequência avançar.
    pub async fn create(
        &self,
        caller: &User,
        payload: &CreateRequestPayload,
    ) -> Result<DemoRequest, AppError> {
        if caller.role != UserRole::Sales {
            return Err(AppError::Forbidden("Only salespeople can submit demo requests.".into()));
        }

        let mut floor = 0;
        let mut attempt: u32 = 1;
        loop {
            let previous = floor;
            match self.try_create(caller.id, &mut floor, payload).await {
                Ok(request) => {
                    tracing::info!(
                        request = %request.id,
                        readable_id = %request.readable_id,
                        "✅ Solicitação criada"
                    );
                    self.notifier.notify(caller, RequestEvent::Submitted(&request));
                    return Ok(request);
                }
                Err(AppError::ReadableIdTaken(taken)) if floor > previous => {
                    tracing::warn!(
                        readable_id = %taken,
                        attempt,
                        "readableId já usado, tentando novamente"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // Uma tentativa completa: trava o vendedor, calcula o id, grava
    // solicitação + auditoria + marca d'água e faz commit.
    async fn try_create(
        &self,
        salesperson_id: Uuid,
        floor: &mut i32,
        payload: &CreateRequestPayload,
    ) -> Result<DemoRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let salesperson = self
            .user_repo
            .find_for_update(&mut *tx, salesperson_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Salesperson".into()))?;

        let existing = self
            .request_repo
            .readable_ids_for_salesperson(&mut *tx, salesperson_id)
            .await?;

        let assignment = readable_id::assign(
            salesperson.user_index,
            salesperson.request_seq.max(*floor),
            existing.iter().map(String::as_str),
        );
        *floor = assignment.sequence;

        let request = self
            .request_repo
            .insert(&mut *tx, salesperson_id, &assignment.readable_id, payload)
            .await?;

        let entry = request_lifecycle::creation_entry(&request.readable_id);
        self.audit_repo
            .append(&mut *tx, request.id, entry.action, salesperson_id, &entry.details)
            .await?;

        self.user_repo
            .advance_request_seq(&mut *tx, salesperson_id, assignment.sequence)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    // Admin vê tudo; vendedor só as próprias
    pub async fn list(&self, caller: &User) -> Result<Vec<RequestListEntry>, AppError> {
        let owner = if caller.is_admin() { None } else { Some(caller.id) };
        self.request_repo.list_entries(owner).await
    }

    pub async fn find_visible(&self, caller: &User, id: Uuid) -> Result<RequestListEntry, AppError> {
        let entry = self
            .request_repo
            .find_entry(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Demo request".into()))?;
        request_lifecycle::ensure_can_view(Actor::from(caller), &entry.request)?;
        Ok(entry)
    }

    pub async fn detail(&self, caller: &User, id: Uuid) -> Result<DemoRequestDetail, AppError> {
        let header = self.find_visible(caller, id).await?;
        let logs = self.audit_repo.list_for_request(id).await?;
        Ok(DemoRequestDetail { header, logs })
    }

    pub async fn update_status(
        &self,
        caller: &User,
        id: Uuid,
        payload: StatusUpdatePayload,
    ) -> Result<DemoRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .request_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Demo request".into()))?;

        let plan = request_lifecycle::plan_admin_update(Actor::from(caller), &current, payload)?;
        let status_changed = plan.new_status().is_some_and(|s| *s != current.status);

        let updated = self.request_repo.apply_changes(&mut *tx, id, &plan.changes).await?;
        self.audit_repo
            .append(&mut *tx, id, plan.audit.action, caller.id, &plan.audit.details)
            .await?;

        tx.commit().await?;

        tracing::info!(request = %id, action = ?plan.audit.action, "{}", plan.audit.details);

        if status_changed {
            self.notify_owner(
                &updated,
                RequestEvent::StatusChanged { request: &updated, from: current.status },
            )
            .await;
        }
        Ok(updated)
    }

    pub async fn receive(&self, caller: &User, id: Uuid) -> Result<DemoRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .request_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Demo request".into()))?;

        let entry = request_lifecycle::plan_receive(Actor::from(caller), &current)?;

        let updated = self
            .request_repo
            .mark_received(&mut *tx, id, Utc::now().date_naive())
            .await?;
        self.audit_repo
            .append(&mut *tx, id, entry.action, caller.id, &entry.details)
            .await?;

        tx.commit().await?;

        tracing::info!(request = %id, "📦 Solicitação marcada como recebida");
        self.notifier.notify(caller, RequestEvent::Received(&updated));
        Ok(updated)
    }

    pub async fn delete(&self, caller: &User, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .request_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Demo request".into()))?;

        request_lifecycle::ensure_can_delete(Actor::from(caller), &current)?;

        if !self.request_repo.delete(&mut *tx, id).await? {
            return Err(AppError::ResourceNotFound("Demo request".into()));
        }
        tx.commit().await?;

        tracing::info!(
            request = %id,
            readable_id = %current.readable_id,
            by = %caller.id,
            "🗑️ Solicitação excluída"
        );
        Ok(())
    }

    // Falha aqui não afeta a operação que já foi gravada
    async fn notify_owner(&self, request: &DemoRequest, event: RequestEvent<'_>) {
        match self.user_repo.find_by_id(request.salesperson_id).await {
            Ok(Some(owner)) => self.notifier.notify(&owner, event),
            Ok(None) => tracing::warn!(request = %request.id, "Dono da solicitação não encontrado"),
            Err(e) => tracing::warn!(request = %request.id, "Falha ao notificar: {}", e),
        }
    }
}
