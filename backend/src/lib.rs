pub mod config;
pub mod database;
pub mod error;
pub mod geocode;
pub mod models;
pub mod optimizer;
pub mod provider;
pub mod saved_routes_handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::Uri,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::geocode::GeocodeCache;
use crate::models::{
    GeocodeRequest, GeocodeResponse, HealthResponse, OptimizeRouteRequest, OptimizeRouteResponse,
};
use crate::optimizer::OptimizeRouteBody;
use crate::provider::{GeocodeQuery, MapsProvider};
use crate::store::RouteStore;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MapsProvider>,
    pub store: Arc<dyn RouteStore>,
    pub geocode_cache: Arc<GeocodeCache>,
}

pub fn create_router(state: AppState) -> Router {
    // The page is served from its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_handler))
        .route("/geocode", post(geocode_handler))
        .route("/optimize_route", post(optimize_route_handler))
        .route("/save_route", post(saved_routes_handlers::save_route))
        .route("/routes/:id", get(saved_routes_handlers::get_route))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "route builder backend is running".to_string(),
    })
}

async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

async fn geocode_handler(
    State(state): State<AppState>,
    payload: Result<Json<GeocodeRequest>, JsonRejection>,
) -> Result<Json<GeocodeResponse>, AppError> {
    let Json(req) = payload?;
    let query = GeocodeQuery::try_from(req)?;
    let result = geocode::geocode(state.provider.as_ref(), &state.geocode_cache, query).await?;
    Ok(Json(result))
}

async fn optimize_route_handler(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRouteBody>, JsonRejection>,
) -> Result<Json<OptimizeRouteResponse>, AppError> {
    let Json(body) = payload?;
    let req = OptimizeRouteRequest::try_from(body)?;
    let response = optimizer::optimize_route(state.provider.as_ref(), &req).await?;
    Ok(Json(response))
}
