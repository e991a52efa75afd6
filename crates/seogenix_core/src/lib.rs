pub mod domain;
pub mod ports;

pub use domain::{
    classify, truncate_snippet, Citation, GeneratedBy, IdentityError, Relevance, RelevanceCheck,
    SearchHit, Site, SiteIdentity, Surface, MAX_SNIPPET_CHARS,
};
pub use ports::{CitationStore, PortError, PortResult, SearchSurface, TextGenerationService};
