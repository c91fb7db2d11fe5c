pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{AppConfig, LogFormat, LoggingConfig, ServerConfig};
pub use error::ApiError;
pub use observability::init_tracing;
pub use server::{
    AppState, FunctionServer, RUN_FUNCTION_PATH, ServerBuilder, build_app, with_middleware,
};
