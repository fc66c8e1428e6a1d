//! Tool registry and dispatch: the seam every transport calls through.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::envelope::ToolDescriptor;
use crate::security::sanitize_json_value;
use crate::Result;

/// A single tool's implementation. Handlers never panic; they return
/// `Err` for the dispatcher to translate into an envelope failure.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;
    async fn call(&self, args: Value) -> Result<Value>;
}

/// A name -> handler map, built once at startup and shared read-only
/// across every connection/request.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: BTreeMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.descriptor().name.clone();
        self.handlers.insert(name, handler);
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.handlers.values().map(|h| h.descriptor()).collect()
    }

    /// Sanitizes `args` (rejecting null bytes, stripping unsafe control
    /// characters) before handing them to the named handler.
    pub async fn dispatch(&self, tool: &str, args: Value) -> Result<Value> {
        match self.handlers.get(tool) {
            Some(handler) => {
                let clean_args = sanitize_json_value(&args)?;
                handler.call(clean_args).await
            }
            None => Err(crate::Error::UnknownTool(tool.to_string())),
        }
    }
}
