pub mod analyses;
pub mod bindings;
pub mod companies;
pub mod deliveries;
pub mod error;
pub mod expenses;
pub mod messages;
pub mod ncm;
pub mod obligations;
pub mod preferences;
pub mod settings;
pub mod status;

pub use error::ApiError;
