// src/config.rs

use crate::{
    db::{AuditRepository, MasterDataRepository, RequestRepository, UserRepository},
    services::{
        auth::AuthService, document_service::DocumentService, master_data::MasterDataService,
        notification_service::NotificationService, requests::RequestService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub font_dir: String,
    // Admin inicial; só usado quando ainda não existe nenhum admin
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    // Canais de notificação; ausentes = canal desligado
    pub email_from: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| optional(key).with_context(|| format!("{} deve ser definida", key));

        let db_max_connections = match optional("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS inválido")?,
            None => 5,
        };
        let db_acquire_timeout_secs = match optional("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => v.parse().context("DB_ACQUIRE_TIMEOUT_SECS inválido")?,
            None => 3,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5000".into()),
            db_max_connections,
            db_acquire_timeout_secs,
            font_dir: optional("FONT_DIR").unwrap_or_else(|| "./fonts".into()),
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            email_from: optional("EMAIL_FROM"),
            whatsapp_phone_number_id: optional("WHATSAPP_PHONE_NUMBER_ID"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub master_data_service: MasterDataService,
    pub request_service: RequestService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(config, db_pool))
    }

    // Monta o gráfico de dependências sobre um pool já criado
    pub fn from_pool(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let master_data_repo = MasterDataRepository::new(db_pool.clone());
        let request_repo = RequestRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let notifier = NotificationService::new(
            config.email_from.clone(),
            config.whatsapp_phone_number_id.clone(),
        );

        let auth_service =
            AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let master_data_service =
            MasterDataService::new(db_pool.clone(), master_data_repo, user_repo.clone());
        let request_service =
            RequestService::new(db_pool.clone(), request_repo, audit_repo, user_repo, notifier);
        let document_service = DocumentService::new(config.font_dir.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            master_data_service,
            request_service,
            document_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]))
                .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout_secs, 3);
        assert_eq!(config.font_dir, "./fonts");
        assert!(config.admin_email.is_none());
        assert!(config.email_from.is_none());
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("EMAIL_FROM", "  "),
            ("DB_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert!(config.email_from.is_none());
        assert_eq!(config.db_max_connections, 12);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }
}
