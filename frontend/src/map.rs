//! Bindings to the Google Maps glue module. The JS side owns every widget
//! handle (map, markers, autocomplete binders, directions renderer) and reports
//! back through window `CustomEvent`s.

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::to_value;
use shared::Waypoint;
use wasm_bindgen::prelude::{JsValue, wasm_bindgen};

use crate::directions::DirectionsPlan;
use crate::points::{PointId, PointList};

#[wasm_bindgen(module = "/google_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map_js(options: JsValue);
    #[wasm_bindgen(js_name = syncMarkers)]
    fn sync_markers_js(markers: JsValue);
    #[wasm_bindgen(js_name = bindAutocomplete)]
    fn bind_autocomplete_js(rows: JsValue);
    #[wasm_bindgen(js_name = renderDirections)]
    fn render_directions_js(request: JsValue);
    #[wasm_bindgen(js_name = clearDirections)]
    fn clear_directions_js();
}

pub const MAP_CLICK_EVENT: &str = "map-click";
pub const PLACE_CHANGED_EVENT: &str = "place-changed";
pub const DIRECTIONS_RESULT_EVENT: &str = "directions-result";

/// Status reported by the directions service on success.
pub const DIRECTIONS_OK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<&Waypoint> for LatLng {
    fn from(point: &Waypoint) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub autocomplete_country: &'static str,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            // Centre of Ukraine
            center: LatLng {
                lat: 48.3794,
                lng: 31.1656,
            },
            zoom: 6,
            autocomplete_country: "ua",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRow {
    pub id: String,
    pub input_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MapClickPayload {
    pub lat: f64,
    pub lng: f64,
}

/// Sent by the autocomplete binder. Coordinates are missing when the chosen
/// place had no geometry.
#[derive(Debug, Deserialize)]
pub struct PlaceChangedPayload {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResultPayload {
    pub status: String,
}

/// One numbered marker per resolved row, in row order.
pub fn markers_for(points: &PointList) -> Vec<Marker> {
    points
        .iter()
        .filter_map(|entry| entry.waypoint())
        .enumerate()
        .map(|(idx, point)| Marker {
            position: LatLng::from(&point),
            label: (idx + 1).to_string(),
            title: point.address,
        })
        .collect()
}

pub fn autocomplete_rows(points: &PointList) -> Vec<AutocompleteRow> {
    points
        .iter()
        .map(|entry| autocomplete_row(entry.id))
        .collect()
}

fn autocomplete_row(id: PointId) -> AutocompleteRow {
    AutocompleteRow {
        id: id.to_string(),
        input_id: id.input_id(),
    }
}

pub fn init(options: &MapOptions) {
    if let Ok(value) = to_value(options) {
        init_map_js(value);
    }
}

/// Tears down every marker and rebuilds them from the current rows.
pub fn sync_markers(points: &PointList) {
    if let Ok(value) = to_value(&markers_for(points)) {
        sync_markers_js(value);
    }
}

pub fn bind_autocomplete(points: &PointList) {
    if let Ok(value) = to_value(&autocomplete_rows(points)) {
        bind_autocomplete_js(value);
    }
}

pub fn render_directions(plan: &DirectionsPlan) -> Result<(), String> {
    let value = to_value(plan).map_err(|err| err.to_string())?;
    render_directions_js(value);
    Ok(())
}

pub fn clear_directions() {
    clear_directions_js();
}
