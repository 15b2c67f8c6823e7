//! Catalog services
//!
//! Orchestration between the HTTP handlers, the song store and the external
//! lyrics lookup.

pub mod catalog;

pub use catalog::{split_verses, CatalogService, LOOKUP_DATE_FORMAT};
