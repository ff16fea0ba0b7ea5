pub mod user_repo;
pub use user_repo::UserRepository;
pub mod master_data_repo;
pub use master_data_repo::MasterDataRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
#[cfg(test)]
pub mod test_fixtures;
