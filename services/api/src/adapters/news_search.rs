//! services/api/src/adapters/news_search.rs
//!
//! This module contains the adapter for the news-search surface.
//! It implements the `SearchSurface` port from the `core` crate against a
//! NewsAPI shaped API (header-authenticated `/v2/everything` endpoint).

use std::time::Duration;

use async_trait::async_trait;
use seogenix_core::domain::{classify, SearchHit, SiteIdentity, Surface};
use seogenix_core::ports::{PortError, PortResult, SearchSurface};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const PAGE_SIZE: u32 = 10;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SearchSurface` port for news search.
#[derive(Clone)]
pub struct NewsApiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiAdapter {
    /// Creates a new `NewsApiAdapter`. A `None` key disables the surface.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
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
struct NewsResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Deserialize)]
struct NewsArticle {
    #[serde(default)]
    title: String,
    description: Option<String>,
    #[serde(default)]
    url: String,
}

//=========================================================================================
// `SearchSurface` Trait Implementation
//=========================================================================================

#[async_trait]
impl SearchSurface for NewsApiAdapter {
    fn surface(&self) -> Surface {
        Surface::NewsSearch
    }

    async fn search(&self, query: &str, target: &SiteIdentity) -> PortResult<Vec<SearchHit>> {
        let api_key = self.api_key.as_ref().ok_or(PortError::ConfigAbsent)?;

        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .header("X-Api-Key", api_key)
            .query(&[
                ("q", query),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "news search returned HTTP {status}"
            )));
        }

        let payload: NewsResponse = response
            .json()
            .await
            .map_err(|e| PortError::InvalidResponse(e.to_string()))?;

        let hits = payload
            .articles
            .into_iter()
            .map(|article| {
                // Headlines without a description still count as hits.
                let snippet = article.description.unwrap_or_else(|| article.title.clone());
                let relevance = classify(&snippet, target).relevance;
                SearchHit {
                    surface: Surface::NewsSearch,
                    title: article.title,
                    snippet,
                    url: article.url,
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
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn acme() -> SiteIdentity {
        SiteIdentity::from_url("https://acme.com").unwrap()
    }

    #[tokio::test]
    async fn absent_key_is_config_absent() {
        let adapter = NewsApiAdapter::new(None).with_base_url("http://127.0.0.1:1");
        let err = adapter.search("acme", &acme()).await.unwrap_err();
        assert!(matches!(err, PortError::ConfigAbsent));
    }

    #[tokio::test]
    async fn parses_articles_with_description_fallback() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "ok",
            "articles": [
                {
                    "title": "Acme raises series B",
                    "description": "The acme.com widget maker raised new funding",
                    "url": "https://news.example.com/acme-series-b"
                },
                {
                    "title": "Acme in the headlines",
                    "description": null,
                    "url": "https://news.example.com/acme-headline"
                }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(header("X-Api-Key", "fake-news-key"))
            .and(query_param("sortBy", "relevancy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let adapter =
            NewsApiAdapter::new(Some("fake-news-key".to_string())).with_base_url(&server.uri());
        let hits = adapter.search("Acme company", &acme()).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].relevance, Relevance::High);
        // Null description falls back to the title, which mentions the brand.
        assert_eq!(hits[1].snippet, "Acme in the headlines");
        assert_eq!(hits[1].relevance, Relevance::High);
    }

    #[tokio::test]
    async fn rate_limited_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let adapter = NewsApiAdapter::new(Some("k".to_string())).with_base_url(&server.uri());
        let err = adapter.search("acme", &acme()).await.unwrap_err();
        assert!(matches!(err, PortError::Transport(_)));
    }
}
