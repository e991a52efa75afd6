//! services/api/src/adapters/web_search.rs
//!
//! This module contains the adapter for the general web-search surface.
//! It implements the `SearchSurface` port from the `core` crate against a
//! Google Custom Search shaped API.

use std::time::Duration;

use async_trait::async_trait;
use seogenix_core::domain::{classify, SearchHit, SiteIdentity, Surface};
use seogenix_core::ports::{PortError, PortResult, SearchSurface};
use serde::Deserialize;

use crate::config::WebSearchCredentials;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const RESULTS_PER_QUERY: u32 = 10;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SearchSurface` port for general web search.
#[derive(Clone)]
pub struct GoogleSearchAdapter {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<WebSearchCredentials>,
}

impl GoogleSearchAdapter {
    /// Creates a new `GoogleSearchAdapter`. A `None` credential leaves the
    /// surface permanently disabled: every search short-circuits without a
    /// network call.
    pub fn new(credentials: Option<WebSearchCredentials>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
        }
    }

    /// For testing: point the adapter at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

//=========================================================================================
// `SearchSurface` Trait Implementation
//=========================================================================================

#[async_trait]
impl SearchSurface for GoogleSearchAdapter {
    fn surface(&self) -> Surface {
        Surface::WebSearch
    }

    async fn search(&self, query: &str, target: &SiteIdentity) -> PortResult<Vec<SearchHit>> {
        let credentials = self.credentials.as_ref().ok_or(PortError::ConfigAbsent)?;

        let results_per_query = RESULTS_PER_QUERY.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.engine_id.as_str()),
                ("q", query),
                ("num", results_per_query.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "web search returned HTTP {status}"
            )));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::InvalidResponse(e.to_string()))?;

        let hits = payload
            .items
            .into_iter()
            .map(|item| {
                let relevance = classify(&item.snippet, target).relevance;
                SearchHit {
                    surface: Surface::WebSearch,
                    title: item.title,
                    snippet: item.snippet,
                    url: item.link,
                    relevance,
                }
            })
            .collect();

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seogenix_core::domain::Relevance;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials() -> Option<WebSearchCredentials> {
        Some(WebSearchCredentials {
            api_key: "fake-key".to_string(),
            engine_id: "fake-cx".to_string(),
        })
    }

    fn acme() -> SiteIdentity {
        SiteIdentity::from_url("https://acme.com").unwrap()
    }

    #[tokio::test]
    async fn absent_credential_is_config_absent_without_network() {
        let adapter = GoogleSearchAdapter::new(None).with_base_url("http://127.0.0.1:1");

        for _ in 0..2 {
            let err = adapter.search("acme.com", &acme()).await.unwrap_err();
            assert!(matches!(err, PortError::ConfigAbsent));
        }
    }

    #[tokio::test]
    async fn parses_items_and_tags_relevance() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "items": [
                {
                    "title": "Acme homepage",
                    "snippet": "Acme builds widgets — see acme.com for details",
                    "link": "https://acme.com/"
                },
                {
                    "title": "Widget roundup",
                    "snippet": "A roundup of widget vendors this year",
                    "link": "https://example.org/roundup"
                }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "\"acme.com\""))
            .and(query_param("key", "fake-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let adapter = GoogleSearchAdapter::new(test_credentials()).with_base_url(&server.uri());
        let hits = adapter.search("\"acme.com\"", &acme()).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].surface, Surface::WebSearch);
        assert_eq!(hits[0].relevance, Relevance::High);
        assert_eq!(hits[1].relevance, Relevance::Low);
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let adapter = GoogleSearchAdapter::new(test_credentials()).with_base_url(&server.uri());
        let err = adapter.search("acme", &acme()).await.unwrap_err();
        assert!(matches!(err, PortError::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_payload_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let adapter = GoogleSearchAdapter::new(test_credentials()).with_base_url(&server.uri());
        let err = adapter.search("acme", &acme()).await.unwrap_err();
        assert!(matches!(err, PortError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_items_field_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let adapter = GoogleSearchAdapter::new(test_credentials()).with_base_url(&server.uri());
        let hits = adapter.search("acme", &acme()).await.unwrap();
        assert!(hits.is_empty());
    }
}
