//! services/api/src/pipeline/queries.rs
//!
//! The fixed query templates issued against every surface during one run.

use seogenix_core::domain::SiteIdentity;

/// Builds the five query variants for a target: exact domain, exact brand,
/// two brand phrases, and a site-restricted query.
pub fn build_queries(identity: &SiteIdentity) -> Vec<String> {
    vec![
        format!("\"{}\"", identity.domain),
        format!("\"{}\"", identity.brand_name),
        format!("{} services", identity.brand_name),
        format!("{} company", identity.brand_name),
        format!("site:{}", identity.domain),
    ]
}
