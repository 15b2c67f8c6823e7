//! External lyrics lookup client
//!
//! Fetches release date, lyric text and link for a (group, song) pair from
//! the lookup service's `GET {base_url}/info?group=..&song=..` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use songbook_common::api::SongDetail;
use songbook_common::config::LookupConfig;
use tracing::debug;

use crate::error::LookupError;

/// Source of song details for enrichment
#[async_trait]
pub trait LyricsLookup: Send + Sync {
    async fn fetch_song_detail(&self, group: &str, song: &str) -> Result<SongDetail, LookupError>;
}

/// HTTP lookup client
#[derive(Debug, Clone)]
pub struct HttpLyricsLookup {
    http_client: Client,
    base_url: String,
}

impl HttpLyricsLookup {
    /// Build a client with the configured base URL and request timeout
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LyricsLookup for HttpLyricsLookup {
    async fn fetch_song_detail(&self, group: &str, song: &str) -> Result<SongDetail, LookupError> {
        let url = format!("{}/info", self.base_url);
        debug!(url = %url, group = %group, song = %song, "Querying lyrics lookup");

        let response = self
            .http_client
            .get(&url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::BAD_REQUEST => return Err(LookupError::BadRequest),
            StatusCode::INTERNAL_SERVER_ERROR => {
                return Err(LookupError::ServiceError(StatusCode::INTERNAL_SERVER_ERROR.as_u16()))
            }
            other => return Err(LookupError::Unreachable(other.as_u16())),
        }

        let detail: SongDetail = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        debug!(
            group = %group,
            song = %song,
            release_date = %detail.release_date,
            "Lyrics lookup complete"
        );

        Ok(detail)
    }
}
