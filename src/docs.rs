// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_profile,

        // --- Users ---
        handlers::auth::register,
        handlers::auth::update_user,
        handlers::auth::set_user_status,
        handlers::auth::delete_user,

        // --- Master Data ---
        handlers::master_data::get_master_data,
        handlers::master_data::create_distributor,
        handlers::master_data::delete_distributor,
        handlers::master_data::create_machine,
        handlers::master_data::update_machine,
        handlers::master_data::delete_machine,
        handlers::master_data::create_kit_parameter,
        handlers::master_data::update_kit_parameter,
        handlers::master_data::delete_kit_parameter,

        // --- Requests ---
        handlers::requests::create_request,
        handlers::requests::list_requests,
        handlers::requests::get_request,
        handlers::requests::update_request_status,
        handlers::requests::receive_request,
        handlers::requests::delete_request,
        handlers::documents::generate_request_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::UpdateUserStatusPayload,
            models::auth::AuthResponse,

            // --- Master Data ---
            models::master_data::Distributor,
            models::master_data::Machine,
            models::master_data::KitParameter,
            models::master_data::SalespersonSummary,
            models::master_data::MasterData,
            models::master_data::CreateDistributorPayload,
            models::master_data::MachinePayload,
            models::master_data::KitParameterPayload,

            // --- Requests ---
            models::requests::AuditAction,
            models::requests::KitItem,
            models::requests::DemoRequest,
            models::requests::RequestListEntry,
            models::requests::AuditLogEntry,
            models::requests::DemoRequestDetail,
            models::requests::CreateRequestPayload,
            models::requests::StatusUpdatePayload,
            models::requests::DeleteResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login e Perfil"),
        (name = "Users", description = "Cadastro de Admins e Vendedores"),
        (name = "Master Data", description = "Distribuidores, Máquinas e Kits"),
        (name = "Requests", description = "Solicitações de Demonstração")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
