pub mod auth;
pub mod master_data;
pub mod requests;
