//! # Songbook Common Library
//!
//! Shared code for the songbook services:
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Database bootstrap and schema migrations
//! - Wire types exchanged with the external lyrics lookup service

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
