//! crates/seogenix_core/src/domain.rs
//!
//! Defines the pure, core data structures for the citation pipeline.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum number of characters kept from a hit snippet when it becomes a
/// citation. Longer snippets are truncated, never rejected.
pub const MAX_SNIPPET_CHARS: usize = 500;

/// A website registered by a user, the target of one pipeline run.
#[derive(Debug, Clone)]
pub struct Site {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub url: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// One external search/content API queried by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    WebSearch,
    NewsSearch,
    ForumSearch,
}

impl Surface {
    /// Human-readable platform name reported in `platforms_checked`.
    pub fn platform_name(&self) -> &'static str {
        match self {
            Surface::WebSearch => "Google Search",
            Surface::NewsSearch => "News Media",
            Surface::ForumSearch => "Reddit",
        }
    }

    /// Free-text label stored on citations derived from this surface.
    pub fn source_type(&self) -> &'static str {
        match self {
            Surface::WebSearch => "Google Search",
            Surface::NewsSearch => "News Article",
            Surface::ForumSearch => "Reddit Discussion",
        }
    }
}

/// Coarse ranking signal: does the hit snippet textually match the target?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    High,
    Low,
}

/// A single result returned by a surface search. Transient: hits only live
/// inside one pipeline run and are never persisted directly.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub surface: Surface,
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub relevance: Relevance,
}

/// A persisted record asserting that some external source mentioned the
/// target site. Append-only; created only by the pipeline.
#[derive(Debug, Clone)]
pub struct Citation {
    pub id: Uuid,
    pub site_id: Uuid,
    pub source_type: String,
    pub snippet_text: String,
    pub url: String,
    pub detected_at: DateTime<Utc>,
}

/// Which path produced the assistant response of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedBy {
    TextGenerationService,
    FallbackTemplate,
}

//=========================================================================================
// Site Identity (domain + brand derivation)
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("site url is not a well-formed URL: {0}")]
    MalformedUrl(String),
    #[error("site url has no hostname: {0}")]
    MissingHost(String),
}

/// The target's hostname and capitalized brand name, derived once per run
/// from `Site.url`. All query templates and relevance checks use these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    pub domain: String,
    pub brand_name: String,
}

impl SiteIdentity {
    /// Derives the identity from a site URL.
    ///
    /// The hostname is lowercased and a leading `www.` label is dropped; the
    /// brand name is the capitalized first remaining label. A URL that does
    /// not parse is the only input the pipeline refuses to process.
    pub fn from_url(raw: &str) -> Result<Self, IdentityError> {
        let parsed =
            url::Url::parse(raw).map_err(|_| IdentityError::MalformedUrl(raw.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| IdentityError::MissingHost(raw.to_string()))?
            .to_lowercase();

        let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();
        let first_label = domain.split('.').next().unwrap_or(&domain);
        let brand_name = capitalize(first_label);

        Ok(Self { domain, brand_name })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

//=========================================================================================
// Relevance Classifier
//=========================================================================================

/// Result of classifying one snippet against the target identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceCheck {
    pub is_relevant: bool,
    pub relevance: Relevance,
}

/// Classifies a snippet against the target domain and brand name.
///
/// Both fields use the identical case-insensitive substring test; the single
/// signal is intentional, there is no separate authority score.
pub fn classify(snippet: &str, identity: &SiteIdentity) -> RelevanceCheck {
    let haystack = snippet.to_lowercase();
    let matched = haystack.contains(&identity.domain)
        || haystack.contains(&identity.brand_name.to_lowercase());
    RelevanceCheck {
        is_relevant: matched,
        relevance: if matched {
            Relevance::High
        } else {
            Relevance::Low
        },
    }
}

/// Truncates a snippet to `MAX_SNIPPET_CHARS` characters, respecting char
/// boundaries so multi-byte text never panics.
pub fn truncate_snippet(snippet: &str) -> String {
    snippet.chars().take(MAX_SNIPPET_CHARS).collect()
}
