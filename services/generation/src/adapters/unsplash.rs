//! services/generation/src/adapters/unsplash.rs
//!
//! This module contains the adapter for Unsplash image search. It implements
//! the `ImageSearchService` port from the `core` crate.

use async_trait::async_trait;
use courseforge_core::ports::{ImageSearchService, PortError, PortResult};
use serde::Deserialize;
use tracing::info;

const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

/// An adapter that implements the `ImageSearchService` port using the
/// Unsplash search API.
#[derive(Clone)]
pub struct UnsplashAdapter {
    http: reqwest::Client,
    access_key: String,
}

impl UnsplashAdapter {
    /// Creates a new `UnsplashAdapter`.
    pub fn new(http: reqwest::Client, access_key: String) -> Self {
        Self { http, access_key }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Deserialize)]
struct PhotoUrls {
    small_s3: Option<String>,
    small: Option<String>,
}

#[async_trait]
impl ImageSearchService for UnsplashAdapter {
    /// Resolves a search term to the first result's small rendition URL.
    /// An empty result set resolves to `None`; the pipeline stores "no
    /// image" rather than failing the whole chapter.
    async fn find_image(&self, term: &str) -> PortResult<Option<String>> {
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("per_page", "1"),
                ("query", term),
                ("client_id", self.access_key.as_str()),
                ("w", "1080"),
                ("h", "600"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let url = data
            .results
            .into_iter()
            .next()
            .and_then(|photo| photo.urls.small_s3.or(photo.urls.small));
        if url.is_none() {
            info!("No image found for search term '{}'", term);
        }
        Ok(url)
    }
}
