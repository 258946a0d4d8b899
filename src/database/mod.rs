// SQLite persistence for saved requests and the settings record

pub mod manager;
pub mod migrations;
pub mod requests_repo;
pub mod settings_repo;

pub use manager::DatabaseManager;
