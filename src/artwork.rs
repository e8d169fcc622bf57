//! Cover art lookup through the Apple Media Services search endpoint
//!
//! The endpoint returns artwork as a URL template with `{w}`/`{h}`
//! placeholders; the client substitutes a square size before handing the URL
//! back.
//!
//! ```no_run
//! use music_menubar_lib::artwork::{ArtworkClient, ArtworkLookup};
//!
//! # async fn demo() -> music_menubar_lib::error::Result<()> {
//! let client = ArtworkClient::new()?;
//! if let Some(url) = client.lookup("Song - Artist - Album").await? {
//!     println!("cover: {url}");
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::utils::size_artwork_url;

/// Song search endpoint (US storefront)
pub const DEFAULT_SEARCH_URL: &str =
    "https://tools.applemediaservices.com/api/apple-media/music/US/search.json";

/// Requested artwork edge length in pixels
pub const DEFAULT_ARTWORK_SIZE: u32 = 512;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Finds a cover art URL for a free-text track query
#[async_trait]
pub trait ArtworkLookup: Send + Sync {
    /// `Ok(None)` when the service has no artwork for the query
    async fn lookup(&self, query: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    songs: Option<SongResults>,
}

#[derive(Debug, Deserialize)]
struct SongResults {
    #[serde(default)]
    data: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    attributes: Option<SongAttributes>,
}

#[derive(Debug, Deserialize)]
struct SongAttributes {
    artwork: Option<Artwork>,
}

#[derive(Debug, Deserialize)]
struct Artwork {
    url: String,
}

impl SearchResponse {
    fn first_artwork_template(self) -> Option<String> {
        self.songs?
            .data
            .into_iter()
            .next()?
            .attributes?
            .artwork
            .map(|artwork| artwork.url)
    }
}

/// HTTP artwork client
#[derive(Debug, Clone)]
pub struct ArtworkClient {
    client: Client,
    search_url: String,
    size: u32,
}

impl ArtworkClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ArtworkClientBuilder {
        ArtworkClientBuilder::default()
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

#[async_trait]
impl ArtworkLookup for ArtworkClient {
    async fn lookup(&self, query: &str) -> Result<Option<String>> {
        debug!("searching artwork for {query:?}");

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("types", "songs"), ("limit", "1"), ("term", query)])
            .header("Content-Type", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;

        Ok(parsed
            .first_artwork_template()
            .map(|template| size_artwork_url(&template, self.size)))
    }
}

/// Builder for [`ArtworkClient`]
#[derive(Debug, Clone)]
pub struct ArtworkClientBuilder {
    search_url: String,
    size: u32,
    timeout: Duration,
}

impl Default for ArtworkClientBuilder {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            size: DEFAULT_ARTWORK_SIZE,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ArtworkClientBuilder {
    pub fn search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ArtworkClient> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(ArtworkClient {
            client,
            search_url: self.search_url,
            size: self.size,
        })
    }
}
