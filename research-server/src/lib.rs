//! # research-server
//!
//! HTTP front end for the deep research service.
//!
//! | Method | Path        | Body                       | Response                    |
//! |--------|-------------|----------------------------|-----------------------------|
//! | GET    | `/health`   |                            | `{"status","service"}`      |
//! | POST   | `/upload`   | multipart, field `file`    | `{"status","message"}`      |
//! | POST   | `/research` | `{"topic"}`                | `{"topic","report"}`        |
//!
//! Failures answer with `{"status":"error","message"}`: 400 for bad input,
//! 500 when ingestion or research fails.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{app_router, run_server};
pub use state::AppState;
