pub mod auth;
pub mod configuration;
pub mod database;
mod error;
pub mod models;
pub mod payments;
pub mod routes;
pub mod startup;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use configuration::get_configuration;
pub use error::StoreError;
pub use startup::build_app;

pub type Result<T> = std::result::Result<T, StoreError>;
