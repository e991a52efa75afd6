pub mod fallback;
pub mod orchestrator;
pub mod queries;

pub use orchestrator::{
    CitationPipeline, CitationRunReport, PipelineError, PipelineSettings, SearchSummary,
};
