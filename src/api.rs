//! HTTP API for route searches
//!
//! `GET /search?from=..&to=..[&policy=..]` runs one search and returns the
//! route, the selected restaurants and their map markers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::config::RoadbiteConfig;
use crate::maps::MapsServices;
use crate::models::{PlaceCandidate, RouteSummary};
use crate::render::{MarkerView, markers};
use crate::search::{PolicyPreset, RouteRestaurantFinder, SearchReport, SearchRequest};
use crate::{RoadbiteError, VERSION};

/// Shared state of the HTTP handlers.
///
/// Only the collaborator handles are shared. Every request runs its own
/// finder, so searches of different clients never block each other.
pub struct AppState {
    pub services: MapsServices,
    pub config: RoadbiteConfig,
}

impl AppState {
    pub fn new(services: MapsServices, config: RoadbiteConfig) -> Self {
        Self { services, config }
    }
}

/// Query string of a search; missing fields count as empty input
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub policy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub route: RouteSummary,
    pub restaurants: Vec<PlaceCandidate>,
    pub markers: Vec<MarkerView>,
    pub sample_count: usize,
    pub failed_lookups: usize,
    pub searched_at: DateTime<Utc>,
}

impl From<SearchReport> for SearchResponse {
    fn from(report: SearchReport) -> Self {
        Self {
            markers: markers(&report.restaurants),
            route: report.route,
            restaurants: report.restaurants,
            sample_count: report.sample_count,
            failed_lookups: report.failed_lookups,
            searched_at: report.searched_at,
        }
    }
}

/// Error response carrying only the user-facing message
pub struct ApiError(RoadbiteError);

impl From<RoadbiteError> for ApiError {
    fn from(err: RoadbiteError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            RoadbiteError::MissingInput | RoadbiteError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            RoadbiteError::SearchInProgress => StatusCode::CONFLICT,
            RoadbiteError::LocationNotFound { .. }
            | RoadbiteError::RouteFailed { .. }
            | RoadbiteError::Api { .. } => StatusCode::BAD_GATEWAY,
            RoadbiteError::Config { .. } | RoadbiteError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Search failed: {}", self.0);
        }

        let body = Json(json!({
            "error": self.0.user_message(),
        }));

        (status, body).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/health", get(health))
        .with_state(state)
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let preset = query
        .policy
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(str::parse::<PolicyPreset>)
        .transpose()?;
    let policy = state.config.search_policy(preset);

    let request = SearchRequest::new(
        query.from.unwrap_or_default(),
        query.to.unwrap_or_default(),
    );
    let finder = RouteRestaurantFinder::new(state.services.clone());
    let report = finder.search(&request, &policy).await?;

    info!(
        "Returning {} restaurants for {} -> {}",
        report.restaurants.len(),
        report.route.from,
        report.route.to
    );
    Ok(Json(report.into()))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
    }))
}
