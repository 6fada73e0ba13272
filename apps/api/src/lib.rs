pub mod config;
pub mod errors;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod sources;
pub mod state;
pub mod store;
