use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::config::DATA_CACHE_CONTROL;
use crate::state::{AppState, JsonDocument};

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let datasets = &state.datasets;
    Json(serde_json::json!({
        "status": "ok",
        "features": datasets.feature_count,
        "municipalities": datasets.municipality_count,
        "unmatched": datasets.unmatched.len(),
        "loaded_at": datasets.loaded_at.to_rfc3339(),
    }))
}

/// Municipality boundaries (GeoJSON FeatureCollection), as read at startup.
pub async fn get_geojson(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_document(&state.datasets.geojson, &headers)
}

/// Municipality records (name, population, infos), as read at startup.
pub async fn get_municipalities(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_document(&state.datasets.municipalities, &headers)
}

/// Full body, or `304` with no body when the client's copy is current.
/// Both carry the validator and the short cache lifetime.
fn serve_document(document: &JsonDocument, headers: &HeaderMap) -> Response {
    let mut response = if if_none_match_matches(headers, &document.etag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        let mut response = Response::new(Body::from(document.body.clone()));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    };

    let out = response.headers_mut();
    out.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(DATA_CACHE_CONTROL),
    );
    if let Ok(etag) = HeaderValue::from_str(&document.etag) {
        out.insert(header::ETAG, etag);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
