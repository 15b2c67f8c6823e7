//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Song details returned by the external lyrics lookup service
///
/// Fetched on song creation, never stored as-is.
///
/// # Examples
///
/// ```
/// use songbook_common::api::types::SongDetail;
///
/// let detail: SongDetail = serde_json::from_str(
///     r#"{"releaseDate":"16.07.2006","text":"A\n\nB","link":"https://example.com"}"#,
/// )
/// .unwrap();
/// assert_eq!(detail.release_date, "16.07.2006");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    /// Release date in `DD.MM.YYYY` format
    pub release_date: String,
    /// Full lyric text, verses separated by a blank line
    pub text: String,
    /// Link to the song
    pub link: String,
}

/// Health check response, returns status, module name, and version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

impl HealthResponse {
    /// Healthy response for the named module
    pub fn ok(module: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            module: module.to_string(),
            version: version.to_string(),
        }
    }
}
