pub mod agents;
pub mod database;
pub mod file_store;
