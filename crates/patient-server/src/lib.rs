pub mod api;
pub mod bootstrap;
pub mod config;
pub mod middleware;
pub mod observability;
pub mod server;

pub use api::{AppState, routes};
pub use config::{
    AppConfig, LoggingConfig, PatientSettings, PostgresStorageConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{API_PREFIX, PatientServer, ServerBuilder, build_app};
