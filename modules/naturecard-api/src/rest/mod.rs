use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use naturecard_cards::CardRequest;
use naturecard_common::{CategoryFilter, NatureCardError, TaxonId};
use naturecard_species::SearchArea;

use crate::AppState;

const DEFAULT_RADIUS_KM: f64 = 5.0;

// --- Query structs ---

// Numbers and the category arrive as strings so a malformed value gets our
// own JSON 400 body instead of the extractor's rejection text.
#[derive(Deserialize)]
pub struct SpeciesQuery {
    lat: Option<String>,
    lng: Option<String>,
    radius: Option<String>,
    month: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize)]
pub struct PointQuery {
    lat: Option<String>,
    lng: Option<String>,
}

// --- Helpers ---

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn parse_coordinates(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    Some((parse_number(lat)?, parse_number(lng)?))
}

fn parse_taxon_id(source: &str, id: &str) -> Option<TaxonId> {
    let id: u64 = id.parse().ok()?;
    match source {
        "inaturalist" => Some(TaxonId::Primary(id)),
        "gbif" => Some(TaxonId::Secondary(id)),
        _ => None,
    }
}

fn parse_category(raw: Option<&str>) -> Option<CategoryFilter> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Some(CategoryFilter::All);
    };
    match raw.to_ascii_lowercase().as_str() {
        "all" => Some(CategoryFilter::All),
        "aves" => Some(CategoryFilter::Aves),
        "mammalia" => Some(CategoryFilter::Mammalia),
        "plantae" => Some(CategoryFilter::Plantae),
        "insecta" => Some(CategoryFilter::Insecta),
        "other" => Some(CategoryFilter::Other),
        _ => None,
    }
}

fn resolve_month(raw: Option<&str>) -> Result<u32, NatureCardError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse()
            .map_err(|_| NatureCardError::InvalidQuery(format!("month must be 1-12, got {s:?}"))),
        None => Ok(chrono::Local::now().month()),
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": message.into()})),
    )
        .into_response()
}

fn coordinates_required() -> Response {
    bad_request("lat and lng are required")
}

fn error_response(err: NatureCardError) -> Response {
    match err {
        NatureCardError::InvalidQuery(message) => bad_request(message),
        NatureCardError::ProvidersUnavailable => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "Species data is unavailable right now, please try again"})),
        )
            .into_response(),
        other => {
            warn!(error = %other, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

// --- Handlers ---

pub async fn api_species(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SpeciesQuery>,
) -> Response {
    let Some((lat, lng)) = parse_coordinates(params.lat.as_deref(), params.lng.as_deref()) else {
        return coordinates_required();
    };

    let radius = match params.radius.as_deref() {
        None => DEFAULT_RADIUS_KM,
        Some(raw) => match parse_number(Some(raw)) {
            Some(r) => r,
            None => return bad_request("radius must be a number"),
        },
    };

    let Some(category) = parse_category(params.category.as_deref()) else {
        return bad_request("category must be one of all, aves, mammalia, plantae, insecta, other");
    };

    let month = match resolve_month(params.month.as_deref()) {
        Ok(m) => m,
        Err(e) => return error_response(e),
    };

    let area = match SearchArea::new(lat, lng, radius) {
        Ok(area) => area,
        Err(e) => return error_response(e),
    };

    match state.aggregator.aggregate(&area, month).await {
        Ok(records) => {
            let results: Vec<_> = records
                .into_iter()
                .filter(|r| category.matches(r.category))
                .collect();
            Json(json!({"results": results})).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn api_species_summary(
    State(state): State<Arc<AppState>>,
    Path((source, id)): Path<(String, String)>,
) -> Response {
    let Some(taxon_id) = parse_taxon_id(&source, &id) else {
        return bad_request(format!("unknown taxon {source}/{id}"));
    };

    match state.aggregator.taxon_summary(&taxon_id).await {
        Ok(summary) => Json(json!({"taxon_id": taxon_id, "summary": summary})).into_response(),
        Err(e) => {
            warn!(error = %e, taxon = %taxon_id, "Failed to load taxon summary");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Failed to load taxon summary"})),
            )
                .into_response()
        }
    }
}

pub async fn api_species_observations(
    State(state): State<Arc<AppState>>,
    Path((source, id)): Path<(String, String)>,
    Query(params): Query<PointQuery>,
) -> Response {
    let Some(taxon_id) = parse_taxon_id(&source, &id) else {
        return bad_request(format!("unknown taxon {source}/{id}"));
    };
    let Some((lat, lng)) = parse_coordinates(params.lat.as_deref(), params.lng.as_deref()) else {
        return coordinates_required();
    };

    match state.aggregator.observations(&taxon_id, lat, lng).await {
        Ok(observations) => Json(json!({"observations": observations})).into_response(),
        Err(e) => {
            warn!(error = %e, taxon = %taxon_id, "Failed to load observations");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Failed to load observations"})),
            )
                .into_response()
        }
    }
}

pub async fn api_generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CardRequest>,
) -> Response {
    let Some(writer) = state.writer.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Card generation is not configured"})),
        )
            .into_response();
    };

    match writer.generate_with_retry(&request).await {
        Ok(card) => Json(card).into_response(),
        Err(e) => {
            warn!(error = %e, species = %request.scientific_name, "Card generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to generate card content"})),
            )
                .into_response()
        }
    }
}
