//! Shared HTTP API types
//!
//! Types used by both the catalog service and the lyrics lookup stub.

pub mod types;

pub use types::{HealthResponse, SongDetail};
