//! TMDB adapter for poster and title enrichment.
//!
//! Endpoint: GET /3/search/movie
//! Auth: `api_key` query parameter
//!
//! Every failure degrades to `None`; callers fall back to the raw key.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Enricher, Enrichment};

const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Default timeout for a search request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB search client
pub struct TmdbClient {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

/// Response from the movie search endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbClient {
    /// Create a new client with the default timeout
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default TMDB HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Point the client at a different API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Search for a title, reporting why the lookup failed
    pub async fn search(&self, query: &str) -> Result<SearchResponse, reqwest::Error> {
        let url = format!("{}/search/movie", self.api_base);

        self.client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Build the display form from the first search result.
///
/// The title falls back to `query`, a release year is appended as
/// `"Title (YYYY)"`, and the poster path is expanded into a full URL.
pub fn enrichment_from_response(query: &str, response: SearchResponse) -> Option<Enrichment> {
    let first = response.results.into_iter().next()?;

    let mut display_title = first
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| query.to_string());

    let year: String = first
        .release_date
        .unwrap_or_default()
        .chars()
        .take(4)
        .collect();
    if !year.is_empty() {
        display_title = format!("{} ({})", display_title, year);
    }

    let image_url = first
        .poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", POSTER_BASE, p));

    Some(Enrichment {
        display_title,
        image_url,
    })
}

#[async_trait]
impl Enricher for TmdbClient {
    async fn enrich(&self, key: &str) -> Option<Enrichment> {
        match self.search(key).await {
            Ok(response) => enrichment_from_response(key, response),
            Err(e) => {
                tracing::debug!("TMDB lookup for {:?} failed: {}", key, e);
                None
            }
        }
    }
}
