pub mod auth;
pub mod document_service;
pub mod master_data;
pub mod notification_service;
pub mod readable_id;
pub mod request_lifecycle;
pub mod requests;
