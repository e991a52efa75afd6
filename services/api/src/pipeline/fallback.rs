//! services/api/src/pipeline/fallback.rs
//!
//! Deterministic substitute content used when no real search hits were found
//! or the text-generation call fails. Everything here is a pure function of
//! the target identity, which keeps golden-output tests stable.

use chrono::{DateTime, Utc};
use seogenix_core::domain::{Citation, SiteIdentity};
use uuid::Uuid;

/// Sentinel entry for `platforms_checked` when no surface produced hits.
pub const SIMULATION_PLATFORM: &str = "Citation Simulation";

/// Synthesizes exactly two clearly-labelled simulated citations so the caller
/// always receives a result shape, even with every surface dark.
pub fn simulated_citations(
    site_id: Uuid,
    identity: &SiteIdentity,
    detected_at: DateTime<Utc>,
) -> Vec<Citation> {
    let brand = &identity.brand_name;
    let domain = &identity.domain;
    let slug = brand.to_lowercase();

    vec![
        Citation {
            id: Uuid::new_v4(),
            site_id,
            source_type: "Simulated Directory Listing".to_string(),
            snippet_text: format!(
                "{brand} ({domain}) is listed as a verified business offering products and \
                 services in its industry."
            ),
            url: format!("https://directory.example.com/companies/{slug}"),
            detected_at,
        },
        Citation {
            id: Uuid::new_v4(),
            site_id,
            source_type: "Simulated Industry Mention".to_string(),
            snippet_text: format!(
                "Industry coverage increasingly references companies like {brand}; {domain} \
                 appears in recent roundups of notable providers."
            ),
            url: format!("https://news.example.com/industry/{slug}"),
            detected_at,
        },
    ]
}

/// The deterministic assistant answer used when text generation is
/// unavailable or fails.
pub fn fallback_answer(identity: &SiteIdentity) -> String {
    format!(
        "{brand} currently has limited measurable AI visibility. We checked web, news and \
         discussion platforms for mentions of {domain}. Publishing structured, citable \
         content and keeping key pages up to date will improve how AI assistants reference \
         {brand}.",
        brand = identity.brand_name,
        domain = identity.domain,
    )
}

/// Builds the one-shot summarization prompt for the text-generation service.
pub fn summary_prompt(
    site_url: &str,
    identity: &SiteIdentity,
    relevant_hits: usize,
    citation_count: usize,
    platforms_checked: &[String],
) -> String {
    format!(
        "Citation check results for {url} (domain: {domain}, brand: {brand}).\n\
         Platforms checked: {platforms}.\n\
         Relevant search hits found: {relevant_hits}.\n\
         Citations recorded this run: {citation_count}.\n\
         Summarize the site's current AI visibility for its owner.",
        url = site_url,
        domain = identity.domain,
        brand = identity.brand_name,
        platforms = platforms_checked.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> SiteIdentity {
        SiteIdentity::from_url("https://acme.com").unwrap()
    }

    #[test]
    fn simulated_citations_are_exactly_two_and_reference_target() {
        let now = Utc::now();
        let citations = simulated_citations(Uuid::new_v4(), &acme(), now);
        assert_eq!(citations.len(), 2);
        for citation in &citations {
            assert!(citation.snippet_text.contains("Acme"));
            assert!(citation.snippet_text.contains("acme.com"));
            assert!(citation.source_type.starts_with("Simulated"));
            assert_eq!(citation.detected_at, now);
        }
    }

    #[test]
    fn fallback_answer_is_deterministic() {
        let first = fallback_answer(&acme());
        let second = fallback_answer(&acme());
        assert_eq!(first, second);
        assert!(first.contains("Acme"));
        assert!(first.contains("acme.com"));
    }

    #[test]
    fn summary_prompt_embeds_counts_and_platforms() {
        let prompt = summary_prompt(
            "https://acme.com",
            &acme(),
            4,
            3,
            &["Google Search".to_string(), "Reddit".to_string()],
        );
        assert!(prompt.contains("https://acme.com"));
        assert!(prompt.contains("Google Search, Reddit"));
        assert!(prompt.contains("Relevant search hits found: 4"));
        assert!(prompt.contains("Citations recorded this run: 3"));
    }
}
