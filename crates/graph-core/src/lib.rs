//! Pure data and logic for Gaea2 terrain workflow graphs: schema, pattern
//! knowledge, validation, and repair. No I/O, no async — this crate is
//! safe to unit test in isolation and to call from any transport.

pub mod analysis;
pub mod model;
pub mod pattern;
pub mod repair;
pub mod schema;
pub mod templates;
pub mod validator;

pub use model::{Connection, Graph, Node, NestedEndpoint, Position, PropertyValue, RawConnection, RawGraph};
pub use validator::{Finding, ValidationOutput, ValidationStats, Validator};
