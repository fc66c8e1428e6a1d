//! HTTP tool-dispatch surface: `/health`, `/mcp/tools`, `/mcp/execute`.
//!
//! Grounded in the teacher's `gateway/server.rs` bootstrap shape (bind,
//! shutdown channel, router with tracing middleware) and the original
//! `base_server.py`'s three-route FastAPI surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::envelope::{ToolRequest, ToolResponse};
use crate::runtime::registry::ToolRegistry;
use crate::{Error, Result};

pub struct HttpServer {
    registry: Arc<ToolRegistry>,
    addr: SocketAddr,
    request_timeout: Duration,
}

impl HttpServer {
    pub fn new(registry: Arc<ToolRegistry>, addr: SocketAddr, request_timeout: Duration) -> Self {
        Self {
            registry,
            addr,
            request_timeout,
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/mcp/tools", get(list_tools))
            .route("/mcp/execute", post(execute_tool))
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(self.registry.clone())
    }

    /// Bind and serve until `shutdown` resolves, then drain in-flight
    /// requests before returning.
    pub async fn run(self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await.map_err(Error::Io)?;
        tracing::info!(addr = %self.addr, "HTTP tool-dispatch surface listening");
        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(Error::Io)?;
        Ok(())
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "server": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_tools(State(registry): State<Arc<ToolRegistry>>) -> Json<Value> {
    Json(json!({ "tools": registry.descriptors() }))
}

async fn execute_tool(State(registry): State<Arc<ToolRegistry>>, Json(request): Json<ToolRequest>) -> Json<ToolResponse> {
    let outcome = registry.dispatch(&request.tool, request.get_args()).await;
    Json(ToolResponse::from_dispatch(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::envelope::ToolDescriptor;
    use crate::runtime::registry::ToolHandler;

    struct EchoHandler;

    #[async_trait]
    impl ToolHandler for EchoHandler {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "echo".to_string(),
                description: "echoes its arguments".to_string(),
                input_schema: json!({}),
            }
        }
        async fn call(&self, args: Value) -> Result<Value> {
            Ok(args)
        }
    }

    #[tokio::test]
    async fn execute_tool_routes_to_registered_handler() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoHandler));
        let response = registry.dispatch("echo", json!({"x": 1})).await.unwrap();
        assert_eq!(response, json!({"x": 1}));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_envelope_failure_not_a_panic() {
        let registry = ToolRegistry::new();
        let result = registry.dispatch("does-not-exist", json!({})).await;
        assert!(result.is_err());
    }
}
