use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl Waypoint {
    pub fn new(address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            address: address.into(),
            lat,
            lng,
        }
    }

    /// Same position, address ignored.
    pub fn same_location(&self, other: &Waypoint) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Driving,
        TravelMode::Walking,
        TravelMode::Bicycling,
        TravelMode::Transit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "DRIVING",
            TravelMode::Walking => "WALKING",
            TravelMode::Bicycling => "BICYCLING",
            TravelMode::Transit => "TRANSIT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TravelMode::Driving => "Driving",
            TravelMode::Walking => "Walking",
            TravelMode::Bicycling => "Bicycling",
            TravelMode::Transit => "Transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTravelMode(pub String);

impl fmt::Display for InvalidTravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid travel mode: {}", self.0)
    }
}

impl std::error::Error for InvalidTravelMode {}

impl TryFrom<String> for TravelMode {
    type Error = InvalidTravelMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for TravelMode {
    type Err = InvalidTravelMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| InvalidTravelMode(s.to_string()))
    }
}

/// Either `address` (forward) or both `lat` and `lng` (reverse).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl GeocodeRequest {
    pub fn reverse(lat: f64, lng: f64) -> Self {
        Self {
            address: None,
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    pub fn forward(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            lat: None,
            lng: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRouteRequest {
    pub points: Vec<Waypoint>,
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub is_round_trip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRouteResponse {
    pub ordered_points: Vec<Waypoint>,
    /// Seconds.
    pub total_duration: u64,
    /// Meters.
    pub total_distance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRouteRequest {
    pub points: Vec<Waypoint>,
    pub travel_mode: TravelMode,
    /// Seconds.
    pub total_time: f64,
    /// Meters.
    pub total_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRouteResponse {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Route totals as returned by the optimizer, kept numeric so that saving
/// never has to read them back from the formatted text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteTotals {
    pub duration_s: u64,
    pub distance_m: u64,
}

impl RouteTotals {
    pub fn duration_text(&self) -> String {
        format_duration(self.duration_s)
    }

    pub fn distance_text(&self) -> String {
        format_distance(self.distance_m)
    }
}

impl From<&OptimizeRouteResponse> for RouteTotals {
    fn from(response: &OptimizeRouteResponse) -> Self {
        Self {
            duration_s: response.total_duration,
            distance_m: response.total_distance,
        }
    }
}

pub fn format_duration(seconds: u64) -> String {
    format!("{} minutes", (seconds as f64 / 60.0).round() as u64)
}

pub fn format_distance(meters: u64) -> String {
    format!("{:.2} km", meters as f64 / 1000.0)
}
