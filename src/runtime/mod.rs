//! Service runtime: the tool registry shared by both the HTTP and stdio
//! dispatch surfaces.

pub mod http;
pub mod registry;
pub mod stdio;

pub use registry::{ToolHandler, ToolRegistry};
