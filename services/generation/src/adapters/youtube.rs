//! services/generation/src/adapters/youtube.rs
//!
//! This module contains the adapter for YouTube lookups: the Data API v3
//! search endpoint and the public timedtext captions endpoint. It implements
//! the `VideoSearchService` and `TranscriptService` ports from the `core`
//! crate.

use async_trait::async_trait;
use courseforge_core::ports::{PortError, PortResult, TranscriptService, VideoSearchService};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter for YouTube video search and caption retrieval.
#[derive(Clone)]
pub struct YoutubeAdapter {
    http: reqwest::Client,
    api_key: String,
}

impl YoutubeAdapter {
    /// Creates a new `YoutubeAdapter`.
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

//=========================================================================================
// "Impure" Wire Structs
//=========================================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

//=========================================================================================
// `VideoSearchService` Trait Implementation
//=========================================================================================

#[async_trait]
impl VideoSearchService for YoutubeAdapter {
    /// Searches for an embeddable, medium-duration educational video and
    /// returns the first of up to 5 results. Zero results is a valid terminal
    /// state and resolves to `None`.
    async fn find_video(&self, query: &str) -> PortResult<Option<String>> {
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("videoDuration", "medium"),
                ("videoEmbeddable", "true"),
                ("type", "video"),
                ("maxResults", "5"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let video_id = data.items.into_iter().next().and_then(|item| item.id.video_id);
        if video_id.is_none() {
            info!("No embeddable video found for query '{}'", query);
        }
        Ok(video_id)
    }
}

//=========================================================================================
// `TranscriptService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TranscriptService for YoutubeAdapter {
    /// Fetches English captions for a video. Missing captions, private
    /// videos, network errors and unparseable payloads all degrade to an
    /// empty string; the caller treats "no transcript" as a valid state.
    async fn fetch_transcript(&self, video_id: &str) -> String {
        let xml = match self
            .http
            .get(TIMEDTEXT_URL)
            .query(&[("lang", "en"), ("v", video_id)])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
        {
            Ok(response) => match response.text().await {
                Ok(text) => text,
                Err(_) => return String::new(),
            },
            Err(_) => return String::new(),
        };

        parse_timedtext(&xml).unwrap_or_default()
    }
}

/// Extracts the caption text from a timedtext XML payload, joined into one
/// whitespace-normalized line. Returns `None` when the payload holds no
/// caption segments.
fn parse_timedtext(xml: &str) -> Option<String> {
    let segment = Regex::new(r"(?s)<text[^>]*>(.*?)</text>").ok()?;

    let mut transcript = String::new();
    for capture in segment.captures_iter(xml) {
        let text = unescape(&capture[1]);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if !transcript.is_empty() {
            transcript.push(' ');
        }
        transcript.push_str(text);
    }

    if transcript.is_empty() {
        None
    } else {
        Some(transcript.replace('\n', " "))
    }
}

fn unescape(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::parse_timedtext;

    #[test]
    fn joins_caption_segments_into_one_line() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<transcript>
  <text start="0.0" dur="2.1">recursion is a function</text>
  <text start="2.1" dur="1.8">calling itself</text>
</transcript>"#;
        assert_eq!(
            parse_timedtext(xml).unwrap(),
            "recursion is a function calling itself"
        );
    }

    #[test]
    fn unescapes_entities_and_drops_newlines() {
        let xml = "<transcript><text start=\"0\" dur=\"1\">it&#39;s a &quot;stack&quot;\nframe &amp; more</text></transcript>";
        assert_eq!(parse_timedtext(xml).unwrap(), "it's a \"stack\" frame & more");
    }

    #[test]
    fn empty_payload_yields_none() {
        assert!(parse_timedtext("").is_none());
        assert!(parse_timedtext("<transcript></transcript>").is_none());
    }
}
