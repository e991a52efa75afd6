//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CitationStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seogenix_core::domain::Citation;
use seogenix_core::ports::{CitationStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CitationStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CitationRecord {
    id: Uuid,
    site_id: Uuid,
    source_type: String,
    snippet_text: String,
    url: String,
    detected_at: DateTime<Utc>,
}

impl CitationRecord {
    fn to_domain(self) -> Citation {
        Citation {
            id: self.id,
            site_id: self.site_id,
            source_type: self.source_type,
            snippet_text: self.snippet_text,
            url: self.url,
            detected_at: self.detected_at,
        }
    }
}

//=========================================================================================
// `CitationStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CitationStore for DbAdapter {
    async fn insert_citations(&self, site_id: Uuid, citations: &[Citation]) -> PortResult<()> {
        for citation in citations {
            sqlx::query(
                "INSERT INTO citations (id, site_id, source_type, snippet_text, url, detected_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(citation.id)
            .bind(site_id)
            .bind(&citation.source_type)
            .bind(&citation.snippet_text)
            .bind(&citation.url)
            .bind(citation.detected_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        Ok(())
    }

    async fn citations_for_site(&self, site_id: Uuid) -> PortResult<Vec<Citation>> {
        let records = sqlx::query_as::<_, CitationRecord>(
            "SELECT id, site_id, source_type, snippet_text, url, detected_at \
             FROM citations WHERE site_id = $1 ORDER BY detected_at DESC",
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
