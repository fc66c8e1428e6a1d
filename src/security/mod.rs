//! Security modules for the service.
//!
//! Provides input sanitization for tool invocation arguments.

pub mod sanitize;

pub use sanitize::{sanitize_json_value, sanitize_optional_json};
