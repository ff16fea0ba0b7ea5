// src/db/test_fixtures.rs

//! Linhas mínimas para os testes que rodam contra o Postgres (`#[sqlx::test]`).

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{user_repo::NewUser, UserRepository},
    models::{
        auth::{User, UserRole},
        requests::CreateRequestPayload,
    },
};

// Grava direto pelo repositório; o hash não importa para estes testes
pub async fn insert_user(pool: &PgPool, name: &str, role: UserRole, user_index: i32) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    UserRepository::new(pool.clone())
        .create_user(
            pool,
            NewUser {
                name,
                email: &email,
                password_hash: "not-a-bcrypt-hash",
                role,
                user_index,
                region: Some("North"),
                phone: None,
                active: true,
            },
        )
        .await
        .unwrap()
}

pub struct Catalog {
    pub distributor_id: Uuid,
    pub machine_id: Uuid,
}

impl Catalog {
    pub fn request_payload(&self) -> CreateRequestPayload {
        CreateRequestPayload {
            distributor_id: Some(self.distributor_id),
            machine_id: Some(self.machine_id),
            model: "HA-5000".into(),
            demo_type: "Product Evaluation".into(),
            proposed_date: None,
            expected_duration: Some("1 week".into()),
            application_params: vec!["CBC".into()],
            sample_volume: None,
            special_requirements: None,
            kit_items: Vec::new(),
            business_potential: None,
            competitor_details: None,
            reason_for_demo: None,
            urgency_level: None,
            regional_manager_approval: false,
            regional_manager_name: None,
            approval_date: None,
            expected_purchase_date: None,
            doctor_name: None,
            doctor_department: None,
            hospital_name: Some("City Hospital".into()),
            location: None,
            expected_return_date: None,
        }
    }
}

pub async fn insert_catalog(pool: &PgPool) -> Catalog {
    let distributor_id: Uuid = sqlx::query_scalar(
        "INSERT INTO distributors (name, location) VALUES ('MedSupply', 'Delhi') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    let machine_id: Uuid = sqlx::query_scalar(
        "INSERT INTO machines (name, category) VALUES ('Hematology Analyzer', 'Hematology') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    Catalog { distributor_id, machine_id }
}

pub async fn audit_count(pool: &PgPool, request_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE request_id = $1")
        .bind(request_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
