use shared::{
    OptimizeRouteRequest, OptimizeRouteResponse, RouteTotals, SaveRouteRequest, TravelMode,
    Waypoint,
};

use crate::directions::DirectionsPlan;
use crate::map::DIRECTIONS_OK;
use crate::points::{PointId, PointList, PointListError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("At least 2 points are required to build a route")]
    TooFewPoints,
    #[error("A route is already being built")]
    InFlight,
    #[error("Optimization error: optimizer returned fewer than 2 points")]
    EmptyRoute,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaveError {
    #[error("Build a route before saving it")]
    NothingToSave,
    #[error("The route is already being saved")]
    InFlight,
}

/// Where an outstanding build is.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BuildStage {
    Optimizing {
        travel_mode: TravelMode,
        round_trip: bool,
    },
    Rendering {
        travel_mode: TravelMode,
        totals: RouteTotals,
    },
}

/// Route currently drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayedRoute {
    pub travel_mode: TravelMode,
    pub totals: RouteTotals,
}

/// All state behind the route form. Handlers mutate it through these methods
/// and perform the widget side effects themselves.
#[derive(Debug, Clone, Default)]
pub struct RouteBuilder {
    points: PointList,
    travel_mode: TravelMode,
    round_trip: bool,
    build: Option<BuildStage>,
    saving: bool,
    route: Option<DisplayedRoute>,
    /// Directions requests still in the widget whose points have since changed.
    stale_renders: u32,
}

impl RouteBuilder {
    pub fn points(&self) -> &PointList {
        &self.points
    }

    pub fn travel_mode(&self) -> TravelMode {
        self.travel_mode
    }

    pub fn set_travel_mode(&mut self, mode: TravelMode) {
        self.travel_mode = mode;
    }

    pub fn is_round_trip(&self) -> bool {
        self.round_trip
    }

    pub fn toggle_round_trip(&mut self) {
        self.round_trip = !self.round_trip;
    }

    pub fn is_building(&self) -> bool {
        self.build.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn route(&self) -> Option<&DisplayedRoute> {
        self.route.as_ref()
    }

    pub fn can_save(&self) -> bool {
        self.route.is_some() && !self.saving
    }

    /// Forgets the drawn route and abandons a render still in progress.
    /// Returns true when the map needs its directions cleared.
    fn invalidate_route(&mut self) -> bool {
        let rendering = matches!(self.build, Some(BuildStage::Rendering { .. }));
        if rendering {
            self.build = None;
            self.stale_renders += 1;
        }
        self.route.take().is_some() || rendering
    }

    pub fn add_empty_row(&mut self) -> PointId {
        self.points.add_empty()
    }

    /// Returns whether a drawn route was invalidated.
    pub fn remove_row(&mut self, id: PointId) -> Result<bool, PointListError> {
        self.points.remove(id)?;
        Ok(self.invalidate_route())
    }

    pub fn edit_address(&mut self, id: PointId, text: String) -> Result<bool, PointListError> {
        let dropped = self.points.edit_address(id, text)?;
        Ok(dropped && self.invalidate_route())
    }

    pub fn apply_place(&mut self, id: PointId, place: Waypoint) -> Result<bool, PointListError> {
        self.points.resolve(id, place)?;
        Ok(self.invalidate_route())
    }

    pub fn apply_reverse_geocode(&mut self, point: Waypoint) -> (PointId, bool) {
        let id = self.points.apply_reverse_geocode(point);
        (id, self.invalidate_route())
    }

    /// Validates the resolved points and marks a build as outstanding.
    pub fn begin_build(&mut self) -> Result<OptimizeRouteRequest, BuildError> {
        if self.build.is_some() {
            return Err(BuildError::InFlight);
        }
        let points = self.points.waypoints();
        if points.len() < 2 {
            return Err(BuildError::TooFewPoints);
        }
        self.build = Some(BuildStage::Optimizing {
            travel_mode: self.travel_mode,
            round_trip: self.round_trip,
        });
        Ok(OptimizeRouteRequest {
            points,
            travel_mode: self.travel_mode,
            is_round_trip: self.round_trip,
        })
    }

    /// Adopts the optimizer's order wholesale and returns what to draw, along
    /// with whether a previously drawn route was invalidated.
    pub fn optimize_succeeded(
        &mut self,
        response: OptimizeRouteResponse,
    ) -> Result<(DirectionsPlan, bool), BuildError> {
        let Some(BuildStage::Optimizing {
            travel_mode,
            round_trip,
        }) = self.build
        else {
            return Err(BuildError::InFlight);
        };

        let Some(plan) = DirectionsPlan::derive(&response.ordered_points, round_trip, travel_mode)
            .filter(|_| response.ordered_points.len() >= 2)
        else {
            self.build = None;
            return Err(BuildError::EmptyRoute);
        };

        let totals = RouteTotals::from(&response);
        self.points.replace_all(response.ordered_points);
        let invalidated = self.route.take().is_some();
        self.build = Some(BuildStage::Rendering {
            travel_mode,
            totals,
        });
        Ok((plan, invalidated))
    }

    pub fn abort_build(&mut self) {
        self.build = None;
    }

    /// Completes the build with the directions widget status. `Ok(None)` means
    /// the result belongs to an abandoned render and whatever it drew must be
    /// cleared.
    pub fn directions_rendered(&mut self, status: &str) -> Result<Option<DisplayedRoute>, String> {
        if self.stale_renders > 0 {
            self.stale_renders -= 1;
            return Ok(None);
        }
        let Some(BuildStage::Rendering {
            travel_mode,
            totals,
        }) = self.build
        else {
            return Err(status.to_string());
        };
        self.build = None;
        if status != DIRECTIONS_OK {
            return Err(status.to_string());
        }
        let route = DisplayedRoute {
            travel_mode,
            totals,
        };
        self.route = Some(route);
        Ok(Some(route))
    }

    pub fn begin_save(&mut self) -> Result<SaveRouteRequest, SaveError> {
        if self.saving {
            return Err(SaveError::InFlight);
        }
        let route = self.route.ok_or(SaveError::NothingToSave)?;
        self.saving = true;
        Ok(SaveRouteRequest {
            points: self.points.waypoints(),
            travel_mode: route.travel_mode,
            total_time: route.totals.duration_s as f64,
            total_distance: route.totals.distance_m as f64,
        })
    }

    pub fn save_finished(&mut self) {
        self.saving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Waypoint {
        Waypoint::new("Kyiv", 50.4501, 30.5234)
    }

    fn b() -> Waypoint {
        Waypoint::new("Vinnytsia", 49.2331, 28.4682)
    }

    fn c() -> Waypoint {
        Waypoint::new("Lviv", 49.8397, 24.0297)
    }

    fn builder_with(points: &[Waypoint]) -> RouteBuilder {
        let mut builder = RouteBuilder::default();
        for point in points {
            builder.apply_reverse_geocode(point.clone());
        }
        builder
    }

    fn optimized(points: Vec<Waypoint>) -> OptimizeRouteResponse {
        OptimizeRouteResponse {
            ordered_points: points,
            total_duration: 18_150,
            total_distance: 540_321,
        }
    }

    fn built(points: &[Waypoint]) -> RouteBuilder {
        let mut builder = builder_with(points);
        builder.begin_build().unwrap();
        builder
            .optimize_succeeded(optimized(points.to_vec()))
            .unwrap();
        builder.directions_rendered("OK").unwrap();
        builder
    }

    #[test]
    fn build_needs_two_resolved_points() {
        let mut builder = builder_with(&[a()]);
        builder.add_empty_row();

        assert_eq!(builder.begin_build(), Err(BuildError::TooFewPoints));
        assert!(!builder.is_building());
    }

    #[test]
    fn build_request_carries_mode_and_round_trip() {
        let mut builder = builder_with(&[a(), b()]);
        builder.set_travel_mode(TravelMode::Bicycling);
        builder.toggle_round_trip();

        let request = builder.begin_build().unwrap();

        assert_eq!(request.points, vec![a(), b()]);
        assert_eq!(request.travel_mode, TravelMode::Bicycling);
        assert!(request.is_round_trip);
        assert!(builder.is_building());
    }

    #[test]
    fn second_build_is_rejected_while_one_is_outstanding() {
        let mut builder = builder_with(&[a(), b()]);
        builder.begin_build().unwrap();
        assert!(matches!(builder.begin_build(), Err(BuildError::InFlight)));
    }

    #[test]
    fn optimizer_order_replaces_local_order() {
        let mut builder = builder_with(&[a(), b(), c()]);
        builder.add_empty_row();
        builder.begin_build().unwrap();

        let (plan, invalidated) = builder
            .optimize_succeeded(optimized(vec![a(), c(), b()]))
            .unwrap();

        assert_eq!(builder.points().waypoints(), vec![a(), c(), b()]);
        assert_eq!(builder.points().len(), 3);
        assert_eq!(plan.waypoints.len(), 1);
        assert!(!invalidated);
        assert!(builder.is_building());
    }

    #[test]
    fn failed_optimization_leaves_points_untouched() {
        let mut builder = builder_with(&[a(), b()]);
        let before = builder.points().clone();
        builder.begin_build().unwrap();

        builder.abort_build();

        assert_eq!(builder.points(), &before);
        assert!(!builder.is_building());
        assert!(builder.begin_build().is_ok());
    }

    #[test]
    fn degenerate_optimizer_response_is_rejected() {
        let mut builder = builder_with(&[a(), b()]);
        let before = builder.points().clone();
        builder.begin_build().unwrap();

        let result = builder.optimize_succeeded(optimized(vec![a()]));

        assert_eq!(result, Err(BuildError::EmptyRoute));
        assert_eq!(builder.points(), &before);
        assert!(!builder.is_building());
    }

    #[test]
    fn rendered_directions_enable_save_with_exact_totals() {
        let mut builder = built(&[a(), b()]);
        assert!(builder.can_save());

        let request = builder.begin_save().unwrap();

        assert_eq!(request.points, vec![a(), b()]);
        assert_eq!(request.travel_mode, TravelMode::Driving);
        assert_eq!(request.total_time, 18_150.0);
        assert_eq!(request.total_distance, 540_321.0);
        assert!(!builder.can_save());
        builder.save_finished();
        assert!(builder.can_save());
    }

    #[test]
    fn saved_totals_agree_with_displayed_text() {
        let mut builder = built(&[a(), b()]);
        let route = *builder.route().unwrap();
        let request = builder.begin_save().unwrap();

        assert_eq!(route.totals.duration_text(), "303 minutes");
        assert_eq!(route.totals.distance_text(), "540.32 km");
        assert!((request.total_time - 303.0 * 60.0).abs() <= 30.0);
        assert!((request.total_distance - 540.32 * 1000.0).abs() <= 5.0);
    }

    #[test]
    fn directions_failure_reports_status() {
        let mut builder = builder_with(&[a(), b()]);
        builder.begin_build().unwrap();
        builder.optimize_succeeded(optimized(vec![b(), a()])).unwrap();

        assert_eq!(
            builder.directions_rendered("ZERO_RESULTS"),
            Err("ZERO_RESULTS".to_string())
        );
        assert!(!builder.is_building());
        assert!(!builder.can_save());
    }

    #[test]
    fn save_without_route_is_refused() {
        let mut builder = builder_with(&[a(), b()]);
        assert!(matches!(builder.begin_save(), Err(SaveError::NothingToSave)));
    }

    #[test]
    fn double_save_is_refused() {
        let mut builder = built(&[a(), b()]);
        builder.begin_save().unwrap();
        assert!(matches!(builder.begin_save(), Err(SaveError::InFlight)));
    }

    #[test]
    fn removing_a_point_clears_the_drawn_route() {
        let mut builder = built(&[a(), b(), c()]);
        let last = builder.points().iter().last().unwrap().id;

        assert_eq!(builder.remove_row(last), Ok(true));
        assert!(builder.route().is_none());
        assert!(!builder.can_save());
    }

    #[test]
    fn adding_a_blank_row_keeps_the_drawn_route() {
        let mut builder = built(&[a(), b()]);
        builder.add_empty_row();
        assert!(builder.can_save());
    }

    #[test]
    fn map_click_after_build_invalidates_route() {
        let mut builder = built(&[a(), b()]);
        let (_, invalidated) = builder.apply_reverse_geocode(c());
        assert!(invalidated);
        assert_eq!(builder.points().waypoints(), vec![a(), b(), c()]);
    }

    #[test]
    fn map_click_while_drawing_abandons_the_render() {
        let mut builder = builder_with(&[a(), b()]);
        builder.begin_build().unwrap();
        builder.optimize_succeeded(optimized(vec![a(), b()])).unwrap();

        let (_, invalidated) = builder.apply_reverse_geocode(c());

        assert!(invalidated);
        assert!(!builder.is_building());
        assert_eq!(builder.directions_rendered("OK"), Ok(None));
        assert!(builder.route().is_none());
        assert!(!builder.can_save());
        assert!(matches!(builder.begin_save(), Err(SaveError::NothingToSave)));
    }

    #[test]
    fn abandoned_render_does_not_complete_the_next_build() {
        let mut builder = builder_with(&[a(), b()]);
        builder.begin_build().unwrap();
        builder.optimize_succeeded(optimized(vec![a(), b()])).unwrap();
        builder.apply_reverse_geocode(c());

        builder.begin_build().unwrap();
        builder
            .optimize_succeeded(optimized(vec![a(), c(), b()]))
            .unwrap();

        assert_eq!(builder.directions_rendered("OK"), Ok(None));
        assert!(builder.is_building());
        let route = builder.directions_rendered("OK").unwrap().unwrap();
        assert_eq!(route.totals.distance_m, 540_321);
        assert_eq!(builder.begin_save().unwrap().points, vec![a(), c(), b()]);
    }

    #[test]
    fn rebuilding_over_a_drawn_route_reports_invalidation() {
        let mut builder = built(&[a(), b(), c()]);
        builder.begin_build().unwrap();

        let (_, invalidated) = builder
            .optimize_succeeded(optimized(vec![a(), c(), b()]))
            .unwrap();

        assert!(invalidated);
        assert!(builder.route().is_none());
        assert!(!builder.can_save());
    }
}
