pub mod database;
pub mod models;
pub mod queries;

pub use database::Store;
pub use models::DeliveryConfig;
pub use queries::*;
