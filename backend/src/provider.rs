//! Google Maps web services used by the backend: geocoding and waypoint
//! ordering through the directions service.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{GeocodeResponse, TravelMode, Waypoint};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Failed to connect to {api} API: {source}")]
    Transport {
        api: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{api} API error: {status}")]
    Status {
        api: &'static str,
        status: String,
        details: Option<String>,
    },
    #[error("Invalid response from {api} API")]
    InvalidResponse { api: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeQuery {
    Address(String),
    Location { lat: f64, lng: f64 },
}

impl GeocodeQuery {
    pub fn cache_key(&self) -> String {
        match self {
            GeocodeQuery::Address(address) => address.clone(),
            GeocodeQuery::Location { lat, lng } => format!("{lat},{lng}"),
        }
    }
}

/// A directions request whose intermediate stops the provider may reorder.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsTrip {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub waypoints: Vec<Waypoint>,
    pub travel_mode: TravelMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedTrip {
    /// Visiting order as indices into `DirectionsTrip::waypoints`.
    pub waypoint_order: Vec<usize>,
    pub total_distance_m: u64,
    pub total_duration_s: u64,
}

#[async_trait]
pub trait MapsProvider: Send + Sync {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResponse, ProviderError>;

    async fn optimize_trip(&self, trip: &DirectionsTrip) -> Result<OptimizedTrip, ProviderError>;
}

pub struct GoogleMapsClient {
    http: reqwest::Client,
    api_key: String,
    region: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            region: region.into(),
        }
    }

    async fn get_bytes(
        &self,
        api: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, ProviderError> {
        let transport = |source| ProviderError::Transport { api, source };
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?;
        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl MapsProvider for GoogleMapsClient {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResponse, ProviderError> {
        let mut params = vec![("key", self.api_key.clone())];
        match query {
            GeocodeQuery::Address(address) => {
                params.push(("address", address.clone()));
                params.push(("region", self.region.clone()));
            }
            GeocodeQuery::Location { lat, lng } => params.push(("latlng", format!("{lat},{lng}"))),
        }

        let body = self.get_bytes("Geocoding", GEOCODE_URL, &params).await?;
        parse_geocode_body(&body)
    }

    #[tracing::instrument(skip(self, trip), fields(waypoints = trip.waypoints.len()))]
    async fn optimize_trip(&self, trip: &DirectionsTrip) -> Result<OptimizedTrip, ProviderError> {
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("origin", lat_lng(&trip.origin)),
            ("destination", lat_lng(&trip.destination)),
            ("mode", trip.travel_mode.as_str().to_lowercase()),
            ("region", self.region.clone()),
        ];
        if !trip.waypoints.is_empty() {
            let stops: Vec<String> = trip.waypoints.iter().map(lat_lng).collect();
            params.push(("waypoints", format!("optimize:true|{}", stops.join("|"))));
        }

        let body = self.get_bytes("Directions", DIRECTIONS_URL, &params).await?;
        parse_directions_body(&body)
    }
}

fn lat_lng(point: &Waypoint) -> String {
    format!("{},{}", point.lat, point.lng)
}

#[derive(Deserialize)]
struct GeocodeBody {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct DirectionsBody {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    waypoint_order: Vec<usize>,
    legs: Vec<Leg>,
}

#[derive(Deserialize)]
struct Leg {
    distance: Measure,
    duration: Measure,
}

#[derive(Deserialize)]
struct Measure {
    value: u64,
}

fn check_status(
    api: &'static str,
    status: String,
    details: Option<String>,
) -> Result<(), ProviderError> {
    if status == "OK" {
        return Ok(());
    }
    tracing::warn!(api, %status, ?details, "provider rejected request");
    Err(ProviderError::Status {
        api,
        status,
        details,
    })
}

/// First result of a geocoding answer.
pub fn parse_geocode_body(body: &[u8]) -> Result<GeocodeResponse, ProviderError> {
    const API: &str = "Geocoding";
    let parsed: GeocodeBody =
        serde_json::from_slice(body).map_err(|_| ProviderError::InvalidResponse { api: API })?;
    check_status(API, parsed.status, parsed.error_message)?;

    let first = parsed
        .results
        .into_iter()
        .next()
        .ok_or(ProviderError::InvalidResponse { api: API })?;
    Ok(GeocodeResponse {
        address: first.formatted_address,
        lat: first.geometry.location.lat,
        lng: first.geometry.location.lng,
    })
}

/// Waypoint order and leg totals of the first route.
pub fn parse_directions_body(body: &[u8]) -> Result<OptimizedTrip, ProviderError> {
    const API: &str = "Directions";
    let parsed: DirectionsBody =
        serde_json::from_slice(body).map_err(|_| ProviderError::InvalidResponse { api: API })?;
    check_status(API, parsed.status, parsed.error_message)?;

    let route = parsed
        .routes
        .into_iter()
        .next()
        .ok_or(ProviderError::InvalidResponse { api: API })?;
    Ok(OptimizedTrip {
        waypoint_order: route.waypoint_order,
        total_distance_m: route.legs.iter().map(|leg| leg.distance.value).sum(),
        total_duration_s: route.legs.iter().map(|leg| leg.duration.value).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_body_yields_first_result() {
        let body = br#"{
            "status": "OK",
            "results": [
                {"formatted_address": "Khreshchatyk St, Kyiv, Ukraine",
                 "geometry": {"location": {"lat": 50.4476, "lng": 30.5223}}},
                {"formatted_address": "Kyiv, Ukraine",
                 "geometry": {"location": {"lat": 50.45, "lng": 30.52}}}
            ]
        }"#;

        let geocoded = parse_geocode_body(body).unwrap();

        assert_eq!(geocoded.address, "Khreshchatyk St, Kyiv, Ukraine");
        assert_eq!(geocoded.lat, 50.4476);
        assert_eq!(geocoded.lng, 30.5223);
    }

    #[test]
    fn geocode_status_error_names_the_status() {
        let body = br#"{"status": "REQUEST_DENIED", "error_message": "bad key", "results": []}"#;

        let err = parse_geocode_body(body).unwrap_err();

        assert_eq!(err.to_string(), "Geocoding API error: REQUEST_DENIED");
        assert!(matches!(err, ProviderError::Status { details: Some(d), .. } if d == "bad key"));
    }

    #[test]
    fn geocode_ok_without_results_is_invalid() {
        let err = parse_geocode_body(br#"{"status": "OK", "results": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid response from Geocoding API");
    }

    #[test]
    fn geocode_missing_geometry_is_invalid() {
        let body = br#"{"status": "OK", "results": [{"formatted_address": "Nowhere"}]}"#;
        assert!(matches!(
            parse_geocode_body(body),
            Err(ProviderError::InvalidResponse { api: "Geocoding" })
        ));
    }

    #[test]
    fn directions_body_sums_legs() {
        let body = br#"{
            "status": "OK",
            "routes": [{
                "waypoint_order": [1, 0],
                "legs": [
                    {"distance": {"value": 1200, "text": "1.2 km"}, "duration": {"value": 300, "text": "5 mins"}},
                    {"distance": {"value": 800, "text": "0.8 km"}, "duration": {"value": 120, "text": "2 mins"}},
                    {"distance": {"value": 2000, "text": "2 km"}, "duration": {"value": 480, "text": "8 mins"}}
                ]
            }]
        }"#;

        let trip = parse_directions_body(body).unwrap();

        assert_eq!(trip.waypoint_order, vec![1, 0]);
        assert_eq!(trip.total_distance_m, 4_000);
        assert_eq!(trip.total_duration_s, 900);
    }

    #[test]
    fn directions_without_waypoints_have_empty_order() {
        let body = br#"{"status": "OK", "routes": [{"legs": [
            {"distance": {"value": 10}, "duration": {"value": 2}}
        ]}]}"#;
        let trip = parse_directions_body(body).unwrap();
        assert!(trip.waypoint_order.is_empty());
    }

    #[test]
    fn directions_zero_results_is_a_status_error() {
        let err = parse_directions_body(br#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "Directions API error: ZERO_RESULTS");
    }

    #[test]
    fn cache_keys_distinguish_forward_and_reverse() {
        assert_eq!(
            GeocodeQuery::Location {
                lat: 50.45,
                lng: 30.52
            }
            .cache_key(),
            "50.45,30.52"
        );
        assert_eq!(GeocodeQuery::Address("Lviv".into()).cache_key(), "Lviv");
    }
}
