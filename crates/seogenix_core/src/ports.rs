//! crates/seogenix_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the pipeline's collaborators.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Citation, SearchHit, SiteIdentity, Surface};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A typed error for all port operations, with a narrow set of kinds so call
/// sites can distinguish "degrade gracefully" cases from genuine faults.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The collaborator's credential is not configured. Surfaces treat this
    /// as "disabled", not as a failure.
    #[error("credential not configured")]
    ConfigAbsent,
    /// The outbound call failed at the transport/HTTP level.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The collaborator replied, but the payload violated its contract.
    #[error("invalid response from collaborator: {0}")]
    InvalidResponse(String),
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// One external search surface (web, news, or forum search).
///
/// `search` performs at most one outbound call (two where the provider needs
/// a token exchange first), no retries. An absent credential yields
/// `PortError::ConfigAbsent` without any network activity.
#[async_trait]
pub trait SearchSurface: Send + Sync {
    /// Which surface this adapter queries.
    fn surface(&self) -> Surface;

    /// Runs one query against the surface, tagging each hit's relevance
    /// against the target identity.
    async fn search(&self, query: &str, target: &SiteIdentity) -> PortResult<Vec<SearchHit>>;
}

/// Persistence for citation records, keyed by site id.
#[async_trait]
pub trait CitationStore: Send + Sync {
    /// Appends citations for a site. The pipeline treats failures here as
    /// best-effort: logged, never fatal to the run.
    async fn insert_citations(&self, site_id: Uuid, citations: &[Citation]) -> PortResult<()>;

    /// Returns all stored citations for a site, newest first.
    async fn citations_for_site(&self, site_id: Uuid) -> PortResult<Vec<Citation>>;
}

/// The text-generation collaborator: one prompt in, free text out.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}
