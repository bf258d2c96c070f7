use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use muni_map_shared::{FeatureCollection, LoadTicket, MapState, MunicipalityRecord};

pub const GEOJSON_URL: &str = "/data/geojs-21-mun.json";
pub const MUNICIPALITIES_URL: &str = "/data/maranhao-municipios.json";

/// Fetch the municipality boundaries.
pub async fn fetch_features() -> Result<FeatureCollection, String> {
    let resp = gloo_net::http::Request::get(GEOJSON_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<FeatureCollection>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Fetch the per-municipality records (name, population, infos).
pub async fn fetch_records() -> Result<Vec<MunicipalityRecord>, String> {
    let resp = gloo_net::http::Request::get(MUNICIPALITIES_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<MunicipalityRecord>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Start both fetches for `ticket`. They run independently and each hands its
/// result to the state on arrival; the state decides when the map is ready.
///
/// `try_update` is a no-op once the owning component is gone, and the ticket
/// check drops results from a superseded attempt.
pub fn load(state: RwSignal<MapState>, ticket: LoadTicket) {
    spawn_local(async move {
        let result = fetch_features().await;
        state.try_update(|s| s.deliver_features(ticket, result));
    });
    spawn_local(async move {
        let result = fetch_records().await;
        state.try_update(|s| s.deliver_records(ticket, result));
    });
}
