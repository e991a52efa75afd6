//! services/api/src/pipeline/orchestrator.rs
//!
//! The citation aggregation pipeline: fans a fixed set of query templates out
//! across the configured search surfaces, filters the merged hits for
//! relevance, persists a bounded number of citations, and produces an
//! assistant answer (generated or templated).
//!
//! Every collaborator failure degrades to "zero hits" or "fallback text";
//! the only error that crosses the `run` boundary is a malformed site URL.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use seogenix_core::domain::{
    classify, truncate_snippet, Citation, GeneratedBy, IdentityError, Relevance, SearchHit, Site,
    SiteIdentity, Surface,
};
use seogenix_core::ports::{CitationStore, PortError, SearchSurface, TextGenerationService};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{fallback, queries};

//=========================================================================================
// Settings and Result Types
//=========================================================================================

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Upper bound on citations written per run when real hits exist.
    pub max_citations_per_run: usize,
    /// Cooperative pause between successive query iterations.
    pub query_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_citations_per_run: 3,
            query_delay: Duration::from_millis(100),
        }
    }
}

/// Per-surface hit totals for one run, plus the derived high-authority count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub google_results: usize,
    pub news_results: usize,
    pub reddit_results: usize,
    pub high_authority_citations: usize,
}

/// The aggregate result of one pipeline run.
#[derive(Debug, Clone)]
pub struct CitationRunReport {
    pub citations: Vec<Citation>,
    /// Citations actually written by the best-effort persist step.
    pub new_citations_found: usize,
    pub assistant_response: String,
    pub generated_by: GeneratedBy,
    pub search_summary: SearchSummary,
    pub platforms_checked: Vec<String>,
}

/// The only failure `run` reports to its caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidUrl(#[from] IdentityError),
}

//=========================================================================================
// The Pipeline
//=========================================================================================

/// Orchestrates one citation check per `run` call. Each run is independent
/// and self-contained: sequential outbound calls, no shared mutable state,
/// no retries. Callers needing a deadline wrap the whole `run` future.
pub struct CitationPipeline {
    surfaces: Vec<Arc<dyn SearchSurface>>,
    store: Arc<dyn CitationStore>,
    generator: Option<Arc<dyn TextGenerationService>>,
    settings: PipelineSettings,
}

impl CitationPipeline {
    pub fn new(
        surfaces: Vec<Arc<dyn SearchSurface>>,
        store: Arc<dyn CitationStore>,
        generator: Option<Arc<dyn TextGenerationService>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            surfaces,
            store,
            generator,
            settings,
        }
    }

    /// Runs a full citation check against one site.
    pub async fn run(&self, site: &Site) -> Result<CitationRunReport, PipelineError> {
        let identity = SiteIdentity::from_url(&site.url)?;
        let queries = queries::build_queries(&identity);

        let mut hits: Vec<SearchHit> = Vec::new();
        let mut summary = SearchSummary::default();
        let mut platforms: Vec<String> = Vec::new();

        for (index, query) in queries.iter().enumerate() {
            if index > 0 && !self.settings.query_delay.is_zero() {
                tokio::time::sleep(self.settings.query_delay).await;
            }

            for surface in &self.surfaces {
                let kind = surface.surface();
                match surface.search(query, &identity).await {
                    Ok(batch) => {
                        if !batch.is_empty() {
                            let name = kind.platform_name().to_string();
                            if !platforms.contains(&name) {
                                platforms.push(name);
                            }
                        }
                        match kind {
                            Surface::WebSearch => summary.google_results += batch.len(),
                            Surface::NewsSearch => summary.news_results += batch.len(),
                            Surface::ForumSearch => summary.reddit_results += batch.len(),
                        }
                        hits.extend(batch);
                    }
                    Err(PortError::ConfigAbsent) => {
                        debug!(surface = kind.platform_name(), "surface disabled, skipping");
                    }
                    Err(e) => {
                        warn!(
                            surface = kind.platform_name(),
                            error = %e,
                            "surface query failed, treating as zero hits"
                        );
                    }
                }
            }
        }

        let relevant: Vec<&SearchHit> = hits
            .iter()
            .filter(|hit| classify(&hit.snippet, &identity).is_relevant)
            .collect();
        summary.high_authority_citations = relevant
            .iter()
            .filter(|hit| hit.relevance == Relevance::High)
            .count();

        let detected_at = Utc::now();
        let citations: Vec<Citation> = if relevant.is_empty() {
            fallback::simulated_citations(site.id, &identity, detected_at)
        } else {
            relevant
                .iter()
                .take(self.settings.max_citations_per_run)
                .map(|hit| Citation {
                    id: Uuid::new_v4(),
                    site_id: site.id,
                    source_type: hit.surface.source_type().to_string(),
                    snippet_text: truncate_snippet(&hit.snippet),
                    url: hit.url.clone(),
                    detected_at,
                })
                .collect()
        };

        let new_citations_found = match self.store.insert_citations(site.id, &citations).await {
            Ok(()) => citations.len(),
            Err(e) => {
                warn!(site_id = %site.id, error = %e, "best-effort citation write failed");
                0
            }
        };

        let platforms_checked = if platforms.is_empty() {
            vec![fallback::SIMULATION_PLATFORM.to_string()]
        } else {
            platforms
        };

        let prompt = fallback::summary_prompt(
            &site.url,
            &identity,
            relevant.len(),
            citations.len(),
            &platforms_checked,
        );
        let (assistant_response, generated_by) = match &self.generator {
            Some(generator) => match generator.generate(&prompt).await {
                Ok(text) => (text, GeneratedBy::TextGenerationService),
                Err(e) => {
                    warn!(error = %e, "text generation failed, substituting fallback answer");
                    (
                        fallback::fallback_answer(&identity),
                        GeneratedBy::FallbackTemplate,
                    )
                }
            },
            None => (
                fallback::fallback_answer(&identity),
                GeneratedBy::FallbackTemplate,
            ),
        };

        Ok(CitationRunReport {
            citations,
            new_citations_found,
            assistant_response,
            generated_by,
            search_summary: summary,
            platforms_checked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seogenix_core::ports::PortResult;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const QUERY_COUNT: usize = 5;

    //-- Mock ports ----------------------------------------------------------

    enum MockBehavior {
        Disabled,
        Failing,
        Scripted(Mutex<VecDeque<Vec<SearchHit>>>),
    }

    struct MockSurface {
        kind: Surface,
        behavior: MockBehavior,
        calls: AtomicUsize,
    }

    impl MockSurface {
        fn disabled(kind: Surface) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behavior: MockBehavior::Disabled,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(kind: Surface) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behavior: MockBehavior::Failing,
                calls: AtomicUsize::new(0),
            })
        }

        /// Returns the scripted batches one per call, then empty results.
        fn scripted(kind: Surface, batches: Vec<Vec<SearchHit>>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behavior: MockBehavior::Scripted(Mutex::new(batches.into())),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchSurface for MockSurface {
        fn surface(&self) -> Surface {
            self.kind
        }

        async fn search(&self, _query: &str, _target: &SiteIdentity) -> PortResult<Vec<SearchHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Disabled => Err(PortError::ConfigAbsent),
                MockBehavior::Failing => Err(PortError::Transport("boom".to_string())),
                MockBehavior::Scripted(batches) => {
                    Ok(batches.lock().unwrap().pop_front().unwrap_or_default())
                }
            }
        }
    }

    struct MockStore {
        inserted: Mutex<Vec<Citation>>,
        fail: bool,
    }

    impl MockStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inserted: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                inserted: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl CitationStore for MockStore {
        async fn insert_citations(&self, _site_id: Uuid, citations: &[Citation]) -> PortResult<()> {
            if self.fail {
                return Err(PortError::Unexpected("db unavailable".to_string()));
            }
            self.inserted.lock().unwrap().extend_from_slice(citations);
            Ok(())
        }

        async fn citations_for_site(&self, _site_id: Uuid) -> PortResult<Vec<Citation>> {
            Ok(self.inserted.lock().unwrap().clone())
        }
    }

    struct MockGenerator {
        text: Option<String>,
    }

    impl MockGenerator {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Some(text.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { text: None })
        }
    }

    #[async_trait]
    impl TextGenerationService for MockGenerator {
        async fn generate(&self, _prompt: &str) -> PortResult<String> {
            match &self.text {
                Some(text) => Ok(text.clone()),
                None => Err(PortError::Transport("generation down".to_string())),
            }
        }
    }

    //-- Fixtures ------------------------------------------------------------

    fn acme_site() -> Site {
        Site {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            url: "https://acme.com".to_string(),
            display_name: "Acme".to_string(),
            created_at: Utc::now(),
        }
    }

    fn acme_identity() -> SiteIdentity {
        SiteIdentity::from_url("https://acme.com").unwrap()
    }

    fn hit(surface: Surface, snippet: &str, url: &str) -> SearchHit {
        let relevance = classify(snippet, &acme_identity()).relevance;
        SearchHit {
            surface,
            title: "a result".to_string(),
            snippet: snippet.to_string(),
            url: url.to_string(),
            relevance,
        }
    }

    fn test_settings() -> PipelineSettings {
        PipelineSettings {
            max_citations_per_run: 3,
            query_delay: Duration::ZERO,
        }
    }

    fn pipeline(
        surfaces: Vec<Arc<dyn SearchSurface>>,
        store: Arc<dyn CitationStore>,
        generator: Option<Arc<dyn TextGenerationService>>,
    ) -> CitationPipeline {
        CitationPipeline::new(surfaces, store, generator, test_settings())
    }

    //-- Scenarios -----------------------------------------------------------

    #[tokio::test]
    async fn all_surfaces_disabled_yields_simulated_fallback() {
        let store = MockStore::new();
        let p = pipeline(
            vec![
                MockSurface::disabled(Surface::WebSearch),
                MockSurface::disabled(Surface::NewsSearch),
                MockSurface::disabled(Surface::ForumSearch),
            ],
            store.clone(),
            None,
        );

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.citations.len(), 2);
        for citation in &report.citations {
            assert!(citation.snippet_text.contains("Acme"));
            assert!(citation.snippet_text.contains("acme.com"));
        }
        assert_eq!(report.platforms_checked, vec!["Citation Simulation"]);
        assert_eq!(report.generated_by, GeneratedBy::FallbackTemplate);
        assert_eq!(report.search_summary, SearchSummary::default());
        assert_eq!(report.new_citations_found, 2);
        assert_eq!(store.inserted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn single_relevant_hit_becomes_one_high_authority_citation() {
        let web = MockSurface::scripted(
            Surface::WebSearch,
            vec![vec![hit(
                Surface::WebSearch,
                "Reviews of acme.com widgets",
                "https://example.org/review",
            )]],
        );
        let store = MockStore::new();
        let p = pipeline(
            vec![
                web.clone(),
                MockSurface::disabled(Surface::NewsSearch),
                MockSurface::disabled(Surface::ForumSearch),
            ],
            store.clone(),
            None,
        );

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.citations.len(), 1);
        assert_eq!(report.citations[0].source_type, "Google Search");
        assert_eq!(report.search_summary.google_results, 1);
        assert_eq!(report.search_summary.high_authority_citations, 1);
        assert_eq!(report.platforms_checked, vec!["Google Search"]);
        assert_eq!(report.new_citations_found, 1);
    }

    #[tokio::test]
    async fn citations_are_capped_at_the_configured_limit() {
        let batch: Vec<SearchHit> = (0..5)
            .map(|i| {
                hit(
                    Surface::WebSearch,
                    "acme.com mentioned here",
                    &format!("https://example.org/{i}"),
                )
            })
            .collect();
        let web = MockSurface::scripted(Surface::WebSearch, vec![batch]);
        let p = pipeline(vec![web], MockStore::new(), None);

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.search_summary.google_results, 5);
        assert_eq!(report.citations.len(), 3);
        assert_eq!(report.new_citations_found, 3);
    }

    #[tokio::test]
    async fn irrelevant_hits_still_fall_back_to_simulated_citations() {
        let web = MockSurface::scripted(
            Surface::WebSearch,
            vec![vec![
                hit(Surface::WebSearch, "gardening tips", "https://example.org/1"),
                hit(Surface::WebSearch, "cooking recipes", "https://example.org/2"),
            ]],
        );
        let p = pipeline(vec![web], MockStore::new(), None);

        let report = p.run(&acme_site()).await.unwrap();

        // The surface produced hits, so it was "checked", but none survived
        // the relevance filter.
        assert_eq!(report.platforms_checked, vec!["Google Search"]);
        assert_eq!(report.search_summary.google_results, 2);
        assert_eq!(report.search_summary.high_authority_citations, 0);
        assert_eq!(report.citations.len(), 2);
        assert!(report.citations[0].source_type.starts_with("Simulated"));
    }

    #[tokio::test]
    async fn snippets_are_truncated_to_the_limit() {
        let long_snippet = format!("acme.com {}", "x".repeat(600));
        let web = MockSurface::scripted(
            Surface::WebSearch,
            vec![vec![hit(Surface::WebSearch, &long_snippet, "https://example.org")]],
        );
        let p = pipeline(vec![web], MockStore::new(), None);

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.citations.len(), 1);
        assert_eq!(report.citations[0].snippet_text.chars().count(), 500);
    }

    #[tokio::test]
    async fn generation_failure_substitutes_deterministic_fallback() {
        let p = pipeline(
            vec![MockSurface::disabled(Surface::WebSearch)],
            MockStore::new(),
            Some(MockGenerator::failing()),
        );

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.generated_by, GeneratedBy::FallbackTemplate);
        assert_eq!(
            report.assistant_response,
            fallback::fallback_answer(&acme_identity())
        );
    }

    #[tokio::test]
    async fn generation_success_is_reported_as_service_text() {
        let p = pipeline(
            vec![MockSurface::disabled(Surface::WebSearch)],
            MockStore::new(),
            Some(MockGenerator::answering("Acme is becoming more visible.")),
        );

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.generated_by, GeneratedBy::TextGenerationService);
        assert_eq!(report.assistant_response, "Acme is becoming more visible.");
    }

    #[tokio::test]
    async fn store_failure_is_best_effort_and_run_still_succeeds() {
        let p = pipeline(
            vec![MockSurface::disabled(Surface::WebSearch)],
            MockStore::failing(),
            None,
        );

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.citations.len(), 2);
        assert_eq!(report.new_citations_found, 0);
    }

    #[tokio::test]
    async fn transport_failures_degrade_to_zero_hits() {
        let p = pipeline(
            vec![
                MockSurface::failing(Surface::WebSearch),
                MockSurface::failing(Surface::NewsSearch),
                MockSurface::failing(Surface::ForumSearch),
            ],
            MockStore::new(),
            None,
        );

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.search_summary, SearchSummary::default());
        assert_eq!(report.platforms_checked, vec!["Citation Simulation"]);
        assert_eq!(report.citations.len(), 2);
    }

    #[tokio::test]
    async fn malformed_url_is_the_only_abort() {
        let p = pipeline(
            vec![MockSurface::disabled(Surface::WebSearch)],
            MockStore::new(),
            None,
        );
        let mut site = acme_site();
        site.url = "not a url".to_string();

        let err = p.run(&site).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn each_surface_is_queried_once_per_template() {
        let web = MockSurface::disabled(Surface::WebSearch);
        let news = MockSurface::disabled(Surface::NewsSearch);
        let p = pipeline(vec![web.clone(), news.clone()], MockStore::new(), None);

        p.run(&acme_site()).await.unwrap();

        assert_eq!(web.calls.load(Ordering::SeqCst), QUERY_COUNT);
        assert_eq!(news.calls.load(Ordering::SeqCst), QUERY_COUNT);
    }

    #[tokio::test]
    async fn platforms_are_deduplicated_across_queries() {
        let web = MockSurface::scripted(
            Surface::WebSearch,
            vec![
                vec![hit(Surface::WebSearch, "acme.com first", "https://example.org/1")],
                vec![hit(Surface::WebSearch, "acme.com again", "https://example.org/2")],
            ],
        );
        let p = pipeline(vec![web], MockStore::new(), None);

        let report = p.run(&acme_site()).await.unwrap();

        assert_eq!(report.platforms_checked, vec!["Google Search"]);
        assert_eq!(report.search_summary.google_results, 2);
    }
}
