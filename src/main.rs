//! Gaea MCP Service - tool-dispatch server for Gaea2 terrain workflow
//! validation, repair, and subprocess-backed generation.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use gaea_mcp_gateway::{
    cli::Cli,
    config::Config,
    handlers::build_registry,
    jobs::JobStore,
    orchestrator::SubprocessOrchestrator,
    runtime::http::HttpServer,
    runtime::stdio,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            config
        }
        Err(e) => {
            error!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let job_store = match JobStore::open(&config.jobs.directory) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("failed to open job store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = Arc::new(SubprocessOrchestrator::new(
        config.orchestrator.binary(),
        job_store.clone(),
        config.orchestrator.effective_concurrency(),
        config.orchestrator.kill_grace_period,
    ));

    spawn_reaper(job_store.clone(), &config);

    let registry = Arc::new(build_registry(&config, job_store, orchestrator));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        stdio = cli.stdio,
        "starting Gaea MCP service"
    );

    if cli.stdio {
        if let Err(e) = stdio::run(registry).await {
            error!("stdio transport error: {e}");
            return ExitCode::FAILURE;
        }
    } else {
        let addr = match format!("{}:{}", config.server.host, config.server.port).parse() {
            Ok(addr) => addr,
            Err(e) => {
                error!("invalid bind address: {e}");
                return ExitCode::FAILURE;
            }
        };
        let server = HttpServer::new(registry, addr, config.server.request_timeout);
        if let Err(e) = server.run(shutdown_signal()).await {
            error!("server error: {e}");
            return ExitCode::FAILURE;
        }
    }

    info!("Gaea MCP service shutdown complete");
    ExitCode::SUCCESS
}

fn spawn_reaper(job_store: Arc<JobStore>, config: &gaea_mcp_gateway::config::Config) {
    let interval = config.jobs.reap_interval;
    let max_age = config.jobs.max_age;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match job_store.cleanup_old_jobs(max_age) {
                Ok(removed) if removed > 0 => tracing::info!(removed, "reaped expired jobs"),
                Ok(_) => {}
                Err(e) => tracing::warn!("job reaper failed: {e}"),
            }
        }
    });
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
