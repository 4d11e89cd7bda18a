use serde::Serialize;
use shared::{TravelMode, Waypoint};

use crate::map::LatLng;

/// Request handed to the directions renderer. The order is final: the widget
/// must not reorder intermediate stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsPlan {
    pub origin: LatLng,
    pub destination: LatLng,
    pub waypoints: Vec<LatLng>,
    pub optimize_waypoints: bool,
    pub travel_mode: TravelMode,
}

impl DirectionsPlan {
    /// Round trips end at the origin and visit every other point on the way;
    /// a trailing copy of the origin is not visited twice.
    pub fn derive(points: &[Waypoint], round_trip: bool, travel_mode: TravelMode) -> Option<Self> {
        let (origin, rest) = points.split_first()?;

        let (destination, interior) = if round_trip {
            let interior = match rest.split_last() {
                Some((last, head)) if last.same_location(origin) => head,
                _ => rest,
            };
            (origin, interior)
        } else {
            let (last, head) = rest.split_last()?;
            (last, head)
        };

        Some(Self {
            origin: origin.into(),
            destination: destination.into(),
            waypoints: interior.iter().map(LatLng::from).collect(),
            optimize_waypoints: false,
            travel_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Waypoint> {
        vec![
            Waypoint::new("A", 50.0, 30.0),
            Waypoint::new("B", 49.0, 24.0),
            Waypoint::new("C", 46.5, 30.7),
        ]
    }

    fn at(point: &Waypoint) -> LatLng {
        LatLng::from(point)
    }

    #[test]
    fn one_way_route_ends_at_last_point() {
        let points = abc();
        let plan = DirectionsPlan::derive(&points, false, TravelMode::Driving).unwrap();

        assert_eq!(plan.origin, at(&points[0]));
        assert_eq!(plan.destination, at(&points[2]));
        assert_eq!(plan.waypoints, vec![at(&points[1])]);
        assert!(!plan.optimize_waypoints);
    }

    #[test]
    fn round_trip_returns_to_origin_through_every_point() {
        let points = abc();
        let plan = DirectionsPlan::derive(&points, true, TravelMode::Walking).unwrap();

        assert_eq!(plan.origin, at(&points[0]));
        assert_eq!(plan.destination, at(&points[0]));
        assert_eq!(plan.waypoints, vec![at(&points[1]), at(&points[2])]);
        assert_eq!(plan.travel_mode, TravelMode::Walking);
    }

    #[test]
    fn round_trip_skips_closing_copy_of_origin() {
        let mut points = abc();
        points.push(Waypoint::new("A again", 50.0, 30.0));

        let plan = DirectionsPlan::derive(&points, true, TravelMode::Driving).unwrap();

        assert_eq!(plan.waypoints, vec![at(&points[1]), at(&points[2])]);
    }

    #[test]
    fn two_point_route_has_no_waypoints() {
        let points = &abc()[..2];
        let plan = DirectionsPlan::derive(points, false, TravelMode::Driving).unwrap();
        assert!(plan.waypoints.is_empty());
        assert_eq!(plan.destination, at(&points[1]));
    }

    #[test]
    fn too_few_points_yield_no_plan() {
        assert!(DirectionsPlan::derive(&[], false, TravelMode::Driving).is_none());
        assert!(DirectionsPlan::derive(&abc()[..1], false, TravelMode::Driving).is_none());
    }

    #[test]
    fn serializes_with_widget_field_names() {
        let plan = DirectionsPlan::derive(&abc(), false, TravelMode::Transit).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["optimizeWaypoints"], false);
        assert_eq!(json["travelMode"], "TRANSIT");
        assert_eq!(json["origin"]["lng"], 30.0);
    }
}
