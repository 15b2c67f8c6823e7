//! Persistence layer for songbook-catalog

pub mod songs;

pub use songs::{SongStore, SqliteSongStore};
