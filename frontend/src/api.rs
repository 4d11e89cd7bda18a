use seed::prelude::*;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use shared::{
    ApiError, GeocodeRequest, GeocodeResponse, OptimizeRouteRequest, OptimizeRouteResponse,
    SaveRouteRequest, SaveRouteResponse,
};

fn api_root() -> String {
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    "http://localhost:8080".to_string()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// The backend answered with an `error` field.
    #[error("{0}")]
    Upstream(String),
    /// The request never produced a usable body.
    #[error("{0}")]
    Transport(String),
}

impl RequestError {
    /// Alert text: upstream errors are prefixed with the action, transport
    /// errors are shown raw.
    pub fn alert_text(&self, action: &str) -> String {
        match self {
            RequestError::Upstream(message) => format!("{action} error: {message}"),
            RequestError::Transport(message) => format!("Error: {message}"),
        }
    }
}

/// Every endpoint answers either its payload or `{"error": ...}`, whatever the
/// HTTP status.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Failure(ApiError),
    Success(T),
}

async fn post_json<B, T>(path: &str, body: &B) -> Result<T, RequestError>
where
    B: Serialize,
    T: DeserializeOwned + 'static,
{
    let url = format!("{}{path}", api_root());
    web_sys::console::debug_1(&format!("[frontend] POST {url}").into());

    let request = Request::new(url)
        .method(Method::Post)
        .json(body)
        .map_err(|err| RequestError::Transport(format!("{err:?}")))?;
    let response = request
        .fetch()
        .await
        .map_err(|err| RequestError::Transport(format!("{err:?}")))?;
    match response.json::<Envelope<T>>().await {
        Ok(Envelope::Success(payload)) => Ok(payload),
        Ok(Envelope::Failure(ApiError { error })) => Err(RequestError::Upstream(error)),
        Err(err) => Err(RequestError::Transport(format!("{err:?}"))),
    }
}

pub async fn reverse_geocode(lat: f64, lng: f64) -> Result<GeocodeResponse, RequestError> {
    post_json("/geocode", &GeocodeRequest::reverse(lat, lng)).await
}

pub async fn optimize_route(
    request: OptimizeRouteRequest,
) -> Result<OptimizeRouteResponse, RequestError> {
    web_sys::console::debug_1(
        &format!(
            "[frontend] optimizing {} points mode={} round_trip={}",
            request.points.len(),
            request.travel_mode,
            request.is_round_trip
        )
        .into(),
    );
    post_json("/optimize_route", &request).await
}

pub async fn save_route(request: SaveRouteRequest) -> Result<SaveRouteResponse, RequestError> {
    post_json("/save_route", &request).await
}
