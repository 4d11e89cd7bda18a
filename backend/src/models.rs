use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use shared::{
    ApiError, GeocodeRequest, GeocodeResponse, OptimizeRouteRequest, OptimizeRouteResponse,
    SaveRouteRequest, SaveRouteResponse, TravelMode, Waypoint,
};

/// A persisted route as returned by `GET /routes/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: i64,
    pub points: Vec<Waypoint>,
    pub travel_mode: TravelMode,
    /// Seconds.
    pub total_time: f64,
    /// Meters.
    pub total_distance: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}
