//! HTTP server for the Opsched operation scheduler.
//!
//! Wires the in-memory storage backend, the lifecycle manager and the report
//! engine behind an axum router. See `main.rs` for the binary entry point.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use server::{OpschedServer, ServerBuilder, build_app};
pub use state::AppState;
