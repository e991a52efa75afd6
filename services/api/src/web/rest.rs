//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::pipeline::{CitationRunReport, PipelineError, SearchSummary};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use seogenix_core::domain::{Citation, Site};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        check_citations_handler,
        list_citations_handler,
    ),
    components(
        schemas(CheckCitationsRequest, CheckCitationsResponse, CitationDto, SearchSummaryDto)
    ),
    tags(
        (name = "SEOgenix Citation API", description = "API endpoints for the citation aggregation pipeline.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for running a citation check against a site.
#[derive(Deserialize, ToSchema)]
pub struct CheckCitationsRequest {
    pub site_id: Uuid,
    pub url: String,
    /// Optional display name of the site; informational only.
    pub name: Option<String>,
}

/// One persisted citation, as returned over the wire.
#[derive(Serialize, ToSchema)]
pub struct CitationDto {
    id: Uuid,
    site_id: Uuid,
    source_type: String,
    snippet_text: String,
    url: String,
    detected_at: DateTime<Utc>,
}

impl From<Citation> for CitationDto {
    fn from(citation: Citation) -> Self {
        Self {
            id: citation.id,
            site_id: citation.site_id,
            source_type: citation.source_type,
            snippet_text: citation.snippet_text,
            url: citation.url,
            detected_at: citation.detected_at,
        }
    }
}

/// Per-surface hit counts for one run.
#[derive(Serialize, ToSchema)]
pub struct SearchSummaryDto {
    google_results: usize,
    news_results: usize,
    reddit_results: usize,
    high_authority_citations: usize,
}

impl From<SearchSummary> for SearchSummaryDto {
    fn from(summary: SearchSummary) -> Self {
        Self {
            google_results: summary.google_results,
            news_results: summary.news_results,
            reddit_results: summary.reddit_results,
            high_authority_citations: summary.high_authority_citations,
        }
    }
}

/// The response payload sent after a completed citation check.
#[derive(Serialize, ToSchema)]
pub struct CheckCitationsResponse {
    citations: Vec<CitationDto>,
    new_citations_found: usize,
    assistant_response: String,
    search_summary: SearchSummaryDto,
    platforms_checked: Vec<String>,
}

impl From<CitationRunReport> for CheckCitationsResponse {
    fn from(report: CitationRunReport) -> Self {
        Self {
            citations: report.citations.into_iter().map(CitationDto::from).collect(),
            new_citations_found: report.new_citations_found,
            assistant_response: report.assistant_response,
            search_summary: report.search_summary.into(),
            platforms_checked: report.platforms_checked,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

fn caller_id(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

/// Run a citation check for a site.
///
/// Queries the configured search surfaces, persists up to the configured
/// number of citations, and returns the aggregate result including the
/// assistant summary. A `x-user-id` header identifies the caller for
/// attribution.
#[utoipa::path(
    post,
    path = "/citations/check",
    request_body = CheckCitationsRequest,
    responses(
        (status = 200, description = "Citation check completed", body = CheckCitationsResponse),
        (status = 400, description = "Bad request (e.g., missing header or malformed site URL)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the caller.")
    )
)]
pub async fn check_citations_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CheckCitationsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = caller_id(&headers)?;

    let site = Site {
        id: payload.site_id,
        owner_id,
        url: payload.url,
        display_name: payload.name.unwrap_or_default(),
        created_at: Utc::now(),
    };

    match app_state.pipeline.run(&site).await {
        Ok(report) => Ok((StatusCode::OK, Json(CheckCitationsResponse::from(report)))),
        Err(PipelineError::InvalidUrl(e)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

/// List the stored citations for a site, newest first.
#[utoipa::path(
    get,
    path = "/sites/{site_id}/citations",
    responses(
        (status = 200, description = "Citations for the site", body = Vec<CitationDto>),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("site_id" = Uuid, Path, description = "The site to list citations for."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the caller.")
    )
)]
pub async fn list_citations_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(site_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    caller_id(&headers)?;

    match app_state.store.citations_for_site(site_id).await {
        Ok(citations) => {
            let body: Vec<CitationDto> = citations.into_iter().map(CitationDto::from).collect();
            Ok((StatusCode::OK, Json(body)))
        }
        Err(e) => {
            error!("Failed to list citations for site {}: {:?}", site_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list citations".to_string(),
            ))
        }
    }
}
