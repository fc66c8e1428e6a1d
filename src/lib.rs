//! Gaea MCP Service
//!
//! An MCP-style tool-dispatch service that orchestrates subprocess jobs
//! and, for the Gaea2 terrain domain, statically validates and repairs
//! user-submitted directed workflow graphs before they ever reach the
//! external renderer.
//!
//! # Transports
//!
//! - HTTP: `/health`, `/mcp/tools`, `/mcp/execute`
//! - stdio: newline-delimited JSON request/response pairs
//!
//! Both transports dispatch through the same [`runtime::ToolRegistry`].

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod orchestrator;
pub mod pathgate;
pub mod runtime;
pub mod security;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Protocol version this service's envelope/dispatch contract implements.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
