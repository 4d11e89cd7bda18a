use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{SaveRouteRequest, SavedRoute};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Route not found: {0}")]
    NotFound(i64),

    #[error("Invalid route data: {0}")]
    InvalidData(String),

    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Route store unavailable")]
    Unavailable,
}

/// Persistence for saved routes.
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn save_route(&self, req: SaveRouteRequest) -> Result<SavedRoute, StoreError>;

    async fn get_route(&self, id: i64) -> Result<SavedRoute, StoreError>;
}

/// Shared validation for every store.
pub fn validate(req: &SaveRouteRequest) -> Result<(), StoreError> {
    if req.points.is_empty() {
        return Err(StoreError::InvalidData(
            "a route needs at least one point".to_string(),
        ));
    }
    if !req.total_time.is_finite() || !req.total_distance.is_finite() {
        return Err(StoreError::InvalidData(
            "route totals must be finite numbers".to_string(),
        ));
    }
    Ok(())
}

/// Process-local store, used when no database is configured.
#[derive(Default)]
pub struct MemoryRouteStore {
    routes: Mutex<Vec<SavedRoute>>,
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn save_route(&self, req: SaveRouteRequest) -> Result<SavedRoute, StoreError> {
        validate(&req)?;
        let mut routes = self
            .routes
            .lock()
            .map_err(|_| StoreError::Unavailable)?;
        let route = SavedRoute {
            id: routes.len() as i64 + 1,
            points: req.points,
            travel_mode: req.travel_mode,
            total_time: req.total_time,
            total_distance: req.total_distance,
            created_at: Utc::now(),
        };
        routes.push(route.clone());
        tracing::info!("Route saved in memory (ID: {})", route.id);
        Ok(route)
    }

    async fn get_route(&self, id: i64) -> Result<SavedRoute, StoreError> {
        let routes = self
            .routes
            .lock()
            .map_err(|_| StoreError::Unavailable)?;
        routes
            .iter()
            .find(|route| route.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}
