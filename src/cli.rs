//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Gaea MCP Service - tool-dispatch server for Gaea2 terrain workflow
/// validation, repair, and subprocess-backed generation
#[derive(Parser, Debug)]
#[command(name = "gaea-mcp-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "GAEA_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "GAEA_MCP_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "GAEA_MCP_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "GAEA_MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "GAEA_MCP_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Run the stdio transport instead of the HTTP server
    #[arg(long)]
    pub stdio: bool,
}
