// Handlers for saved routes API endpoints

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::AppState;
use crate::error::AppError;
use crate::models::{SaveRouteRequest, SaveRouteResponse, SavedRoute};

/// POST /save_route - Persist a built route
pub async fn save_route(
    State(state): State<AppState>,
    payload: Result<Json<SaveRouteRequest>, JsonRejection>,
) -> Result<Json<SaveRouteResponse>, AppError> {
    let Json(req) = payload?;
    let saved = state.store.save_route(req).await?;
    Ok(Json(SaveRouteResponse { id: saved.id }))
}

/// GET /routes/:id - Fetch a saved route
pub async fn get_route(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SavedRoute>, AppError> {
    let Path(id) = id?;
    state.store.get_route(id).await.map(Json).map_err(Into::into)
}
