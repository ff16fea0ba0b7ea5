pub mod auth;
pub mod documents;
pub mod master_data;
pub mod requests;
