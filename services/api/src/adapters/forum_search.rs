//! services/api/src/adapters/forum_search.rs
//!
//! This module contains the adapter for the discussion-forum surface.
//! It implements the `SearchSurface` port from the `core` crate against a
//! Reddit shaped API: a client-credentials token exchange followed by one
//! bearer-authenticated search call.

use std::time::Duration;

use async_trait::async_trait;
use seogenix_core::domain::{classify, SearchHit, SiteIdentity, Surface};
use seogenix_core::ports::{PortError, PortResult, SearchSurface};
use serde::Deserialize;

use crate::config::ForumSearchCredentials;

const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";
const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
const PUBLIC_BASE_URL: &str = "https://www.reddit.com";
const USER_AGENT: &str = "seogenix-citation-pipeline/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const RESULT_LIMIT: u32 = 10;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SearchSurface` port for forum search.
///
/// Unlike the other surfaces this one performs two network calls per search:
/// a token exchange, then the query itself. Tokens are deliberately not
/// cached; each run is self-contained.
#[derive(Clone)]
pub struct RedditSearchAdapter {
    client: reqwest::Client,
    auth_base_url: String,
    api_base_url: String,
    credentials: Option<ForumSearchCredentials>,
}

impl RedditSearchAdapter {
    /// Creates a new `RedditSearchAdapter`. `None` credentials disable the
    /// surface.
    pub fn new(credentials: Option<ForumSearchCredentials>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials,
        }
    }

    /// For testing: point both endpoints at a mock server.
    #[cfg(test)]
    pub fn with_base_urls(mut self, auth_base_url: &str, api_base_url: &str) -> Self {
        self.auth_base_url = auth_base_url.to_string();
        self.api_base_url = api_base_url.to_string();
        self
    }

    async fn exchange_token(&self, credentials: &ForumSearchCredentials) -> PortResult<String> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base_url))
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header("User-Agent", USER_AGENT)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "forum token exchange returned HTTP {status}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| PortError::InvalidResponse(e.to_string()))?;

        if payload.access_token.is_empty() {
            return Err(PortError::InvalidResponse(
                "forum token exchange returned an empty token".to_string(),
            ));
        }
        Ok(payload.access_token)
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: PostData,
}

#[derive(Deserialize)]
struct PostData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    permalink: String,
}

//=========================================================================================
// `SearchSurface` Trait Implementation
//=========================================================================================

#[async_trait]
impl SearchSurface for RedditSearchAdapter {
    fn surface(&self) -> Surface {
        Surface::ForumSearch
    }

    async fn search(&self, query: &str, target: &SiteIdentity) -> PortResult<Vec<SearchHit>> {
        let credentials = self.credentials.as_ref().ok_or(PortError::ConfigAbsent)?;

        let token = self.exchange_token(credentials).await?;

        let result_limit = RESULT_LIMIT.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.api_base_url))
            .bearer_auth(token)
            .header("User-Agent", USER_AGENT)
            .query(&[
                ("q", query),
                ("sort", "relevance"),
                ("limit", result_limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "forum search returned HTTP {status}"
            )));
        }

        let payload: Listing = response
            .json()
            .await
            .map_err(|e| PortError::InvalidResponse(e.to_string()))?;

        let hits = payload
            .data
            .children
            .into_iter()
            .map(|child| {
                let post = child.data;
                // Link posts have no body; the title is the snippet then.
                let snippet = if post.selftext.trim().is_empty() {
                    post.title.clone()
                } else {
                    post.selftext
                };
                let relevance = classify(&snippet, target).relevance;
                SearchHit {
                    surface: Surface::ForumSearch,
                    title: post.title,
                    snippet,
                    url: format!("{}{}", PUBLIC_BASE_URL, post.permalink),
                    relevance,
                }
            })
            .collect();

        Ok(hits)
    }
}
