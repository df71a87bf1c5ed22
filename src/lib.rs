pub mod assistant;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod query;
pub mod server;
pub mod types;
