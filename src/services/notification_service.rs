// src/services/notification_service.rs

//! Gancho de notificações das solicitações (e-mail e WhatsApp).
//!
//! A entrega real fica fora deste serviço: aqui montamos a mensagem de cada
//! canal configurado e registramos no log. Canal sem configuração é pulado
//! com aviso e nunca derruba a chamada da API.

use crate::models::{
    auth::User,
    requests::{DemoRequest, RequestStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    WhatsApp,
}

#[derive(Debug, Clone)]
pub enum RequestEvent<'a> {
    Submitted(&'a DemoRequest),
    StatusChanged {
        request: &'a DemoRequest,
        from: RequestStatus,
    },
    Received(&'a DemoRequest),
}

impl RequestEvent<'_> {
    fn request(&self) -> &DemoRequest {
        match self {
            RequestEvent::Submitted(r) | RequestEvent::Received(r) => r,
            RequestEvent::StatusChanged { request, .. } => request,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            RequestEvent::Submitted(r) => format!("Demo request {} submitted", r.readable_id),
            RequestEvent::StatusChanged { request, from } => format!(
                "Demo request {} moved from {} to {}",
                request.readable_id, from, request.status
            ),
            RequestEvent::Received(r) => format!("Demo request {} received", r.readable_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub recipient: String,
    pub subject: String,
}

#[derive(Clone, Default)]
pub struct NotificationService {
    email_from: Option<String>,
    whatsapp_phone_number_id: Option<String>,
}

impl NotificationService {
    pub fn new(email_from: Option<String>, whatsapp_phone_number_id: Option<String>) -> Self {
        Self { email_from, whatsapp_phone_number_id }
    }

    // Monta as mensagens para o vendedor dono da solicitação
    pub fn plan(&self, salesperson: &User, event: &RequestEvent<'_>) -> Vec<Notification> {
        let subject = event.subject();
        let mut out = Vec::new();

        match &self.email_from {
            Some(_) => out.push(Notification {
                channel: Channel::Email,
                recipient: salesperson.email.clone(),
                subject: subject.clone(),
            }),
            None => tracing::warn!("E-mail não configurado (EMAIL_FROM). Notificação ignorada."),
        }

        match (&self.whatsapp_phone_number_id, &salesperson.phone) {
            (Some(_), Some(phone)) if !phone.trim().is_empty() => out.push(Notification {
                channel: Channel::WhatsApp,
                recipient: phone.trim().to_string(),
                subject,
            }),
            (Some(_), _) => tracing::warn!(
                salesperson = %salesperson.id,
                "Vendedor sem telefone. WhatsApp ignorado."
            ),
            (None, _) => tracing::warn!(
                "WhatsApp não configurado (WHATSAPP_PHONE_NUMBER_ID). Notificação ignorada."
            ),
        }

        out
    }

    pub fn notify(&self, salesperson: &User, event: RequestEvent<'_>) {
        let request_id = event.request().id;
        for n in self.plan(salesperson, &event) {
            tracing::info!(
                channel = ?n.channel,
                to = %n.recipient,
                request = %request_id,
                from = self.email_from.as_deref().unwrap_or_default(),
                "📨 {}",
                n.subject
            );
        }
    }
}
