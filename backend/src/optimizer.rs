use serde::Deserialize;

use crate::models::{OptimizeRouteRequest, OptimizeRouteResponse, TravelMode, Waypoint};
use crate::provider::{DirectionsTrip, MapsProvider, OptimizedTrip, ProviderError};

/// Intermediate stops the directions service accepts in one request.
pub const MAX_INTERMEDIATE_WAYPOINTS: usize = 25;

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("At least 2 points are required")]
    TooFewPoints,
    #[error("Invalid travel mode")]
    InvalidTravelMode,
    #[error("Too many points: {0} intermediate stops, at most {max} are supported", max = MAX_INTERMEDIATE_WAYPOINTS)]
    TooManyPoints(usize),
    #[error("Optimizer returned an invalid waypoint order")]
    InvalidOrder,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// `POST /optimize_route` body as received. The travel mode stays a string
/// until the point count has been checked.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRouteBody {
    pub points: Vec<Waypoint>,
    pub travel_mode: String,
    #[serde(default)]
    pub is_round_trip: bool,
}

impl TryFrom<OptimizeRouteBody> for OptimizeRouteRequest {
    type Error = OptimizeError;

    fn try_from(body: OptimizeRouteBody) -> Result<Self, Self::Error> {
        if body.points.len() < 2 {
            return Err(OptimizeError::TooFewPoints);
        }
        let travel_mode = body
            .travel_mode
            .parse::<TravelMode>()
            .map_err(|_| OptimizeError::InvalidTravelMode)?;
        Ok(OptimizeRouteRequest {
            points: body.points,
            travel_mode,
            is_round_trip: body.is_round_trip,
        })
    }
}

/// Origin is always the first point. One-way trips end at the last point;
/// round trips come back to the origin and treat every other point as an
/// intermediate stop.
pub fn plan_trip(req: &OptimizeRouteRequest) -> Result<DirectionsTrip, OptimizeError> {
    if req.points.len() < 2 {
        return Err(OptimizeError::TooFewPoints);
    }
    let origin = req.points[0].clone();
    let (destination, waypoints) = if req.is_round_trip {
        (origin.clone(), req.points[1..].to_vec())
    } else {
        let last = req.points.len() - 1;
        (req.points[last].clone(), req.points[1..last].to_vec())
    };
    if waypoints.len() > MAX_INTERMEDIATE_WAYPOINTS {
        return Err(OptimizeError::TooManyPoints(waypoints.len()));
    }

    Ok(DirectionsTrip {
        origin,
        destination,
        waypoints,
        travel_mode: req.travel_mode,
    })
}

/// Rebuilds the full point sequence from the provider's visiting order:
/// origin, the reordered stops, then the destination unless it is the origin.
pub fn apply_waypoint_order(
    trip: &DirectionsTrip,
    round_trip: bool,
    order: &[usize],
) -> Result<Vec<Waypoint>, OptimizeError> {
    let stops = &trip.waypoints;
    // No order at all means the provider kept the input sequence.
    let identity: Vec<usize>;
    let order = if order.is_empty() && !stops.is_empty() {
        identity = (0..stops.len()).collect();
        &identity
    } else {
        order
    };

    let mut seen = vec![false; stops.len()];
    for &idx in order {
        match seen.get_mut(idx) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(OptimizeError::InvalidOrder),
        }
    }
    if order.len() != stops.len() {
        return Err(OptimizeError::InvalidOrder);
    }

    let mut ordered = Vec::with_capacity(stops.len() + 2);
    ordered.push(trip.origin.clone());
    ordered.extend(order.iter().map(|&idx| stops[idx].clone()));
    if !round_trip {
        ordered.push(trip.destination.clone());
    }
    Ok(ordered)
}

#[tracing::instrument(skip_all, fields(points = req.points.len(), mode = %req.travel_mode, round_trip = req.is_round_trip))]
pub async fn optimize_route(
    provider: &dyn MapsProvider,
    req: &OptimizeRouteRequest,
) -> Result<OptimizeRouteResponse, OptimizeError> {
    let trip = plan_trip(req)?;
    let OptimizedTrip {
        waypoint_order,
        total_distance_m,
        total_duration_s,
    } = provider.optimize_trip(&trip).await?;
    let ordered_points = apply_waypoint_order(&trip, req.is_round_trip, &waypoint_order)?;

    tracing::info!(
        "optimized route: {} points, {} m, {} s",
        ordered_points.len(),
        total_distance_m,
        total_duration_s
    );

    Ok(OptimizeRouteResponse {
        ordered_points,
        total_duration: total_duration_s,
        total_distance: total_distance_m,
    })
}
