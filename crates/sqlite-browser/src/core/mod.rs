pub mod browse;
pub mod dialect;
pub mod query;
pub mod registry;
pub mod schema;
pub mod seed;
pub mod session;
pub mod types;
