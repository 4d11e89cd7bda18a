pub mod api;
pub mod builder;
pub mod directions;
pub mod map;
pub mod points;

use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::de::DeserializeOwned;
use shared::{
    GeocodeResponse, OptimizeRouteResponse, SaveRouteResponse, TravelMode, Waypoint,
};
use wasm_bindgen::{JsCast, prelude::wasm_bindgen};

use crate::api::RequestError;
use crate::builder::RouteBuilder;
use crate::map::{
    DIRECTIONS_RESULT_EVENT, DirectionsResultPayload, MAP_CLICK_EVENT, MapClickPayload, MapOptions,
    PLACE_CHANGED_EVENT, PlaceChangedPayload,
};
use crate::points::PointId;

pub struct Model {
    builder: RouteBuilder,
}

pub enum Msg {
    AddPoint,
    RemovePoint(PointId),
    AddressEdited(PointId, String),
    PlaceChanged(PlaceChangedPayload),
    MapClicked { lat: f64, lng: f64 },
    Geocoded {
        lat: f64,
        lng: f64,
        result: Result<GeocodeResponse, RequestError>,
    },
    TravelModeChanged(String),
    RoundTripToggled,
    BuildRoute,
    RouteOptimized(Result<OptimizeRouteResponse, RequestError>),
    DirectionsRendered(String),
    SaveRoute,
    RouteSaved(Result<SaveRouteResponse, RequestError>),
    RowsRendered,
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders
        .stream(streams::window_event(Ev::from(MAP_CLICK_EVENT), map_click_msg))
        .stream(streams::window_event(
            Ev::from(PLACE_CHANGED_EVENT),
            place_changed_msg,
        ))
        .stream(streams::window_event(
            Ev::from(DIRECTIONS_RESULT_EVENT),
            directions_result_msg,
        ))
        .after_next_render(|_| Msg::RowsRendered);

    Model {
        builder: RouteBuilder::default(),
    }
}

fn event_detail<T: DeserializeOwned>(event: web_sys::Event) -> Option<T> {
    let event = event.dyn_into::<web_sys::CustomEvent>().ok()?;
    serde_wasm_bindgen::from_value(event.detail()).ok()
}

fn map_click_msg(event: web_sys::Event) -> Option<Msg> {
    let payload: MapClickPayload = event_detail(event)?;
    web_sys::console::debug_1(
        &format!(
            "[frontend] map click lat={:.5} lng={:.5}",
            payload.lat, payload.lng
        )
        .into(),
    );
    Some(Msg::MapClicked {
        lat: payload.lat,
        lng: payload.lng,
    })
}

fn place_changed_msg(event: web_sys::Event) -> Option<Msg> {
    event_detail(event).map(Msg::PlaceChanged)
}

fn directions_result_msg(event: web_sys::Event) -> Option<Msg> {
    event_detail::<DirectionsResultPayload>(event).map(|payload| Msg::DirectionsRendered(payload.status))
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    let builder = &mut model.builder;
    match msg {
        Msg::AddPoint => {
            builder.add_empty_row();
            points_changed(builder, false, orders);
        }
        Msg::RemovePoint(id) => match builder.remove_row(id) {
            Ok(invalidated) => points_changed(builder, invalidated, orders),
            Err(err) => log_error(&err.to_string()),
        },
        Msg::AddressEdited(id, text) => match builder.edit_address(id, text) {
            Ok(invalidated) => {
                map::sync_markers(builder.points());
                if invalidated {
                    map::clear_directions();
                }
            }
            Err(err) => log_error(&err.to_string()),
        },
        Msg::PlaceChanged(payload) => {
            let Some(id) = PointId::parse(&payload.id) else {
                log_error(&format!("place event for unknown row {}", payload.id));
                return;
            };
            let (Some(lat), Some(lng)) = (payload.lat, payload.lng) else {
                alert("Place not found");
                return;
            };
            let place = Waypoint::new(payload.address.unwrap_or_default(), lat, lng);
            match builder.apply_place(id, place) {
                Ok(invalidated) => {
                    map::sync_markers(builder.points());
                    if invalidated {
                        map::clear_directions();
                    }
                }
                Err(err) => log_error(&err.to_string()),
            }
        }
        Msg::MapClicked { lat, lng } => {
            orders.perform_cmd(async move {
                let result = api::reverse_geocode(lat, lng).await;
                Msg::Geocoded { lat, lng, result }
            });
        }
        Msg::Geocoded { lat, lng, result } => match result {
            Ok(geocoded) => {
                let (_, invalidated) =
                    builder.apply_reverse_geocode(Waypoint::new(geocoded.address, lat, lng));
                points_changed(builder, invalidated, orders);
            }
            Err(err) => alert(&err.alert_text("Geocoding")),
        },
        Msg::TravelModeChanged(value) => match value.parse::<TravelMode>() {
            Ok(mode) => builder.set_travel_mode(mode),
            Err(err) => log_error(&err.to_string()),
        },
        Msg::RoundTripToggled => builder.toggle_round_trip(),
        Msg::BuildRoute => match builder.begin_build() {
            Ok(request) => {
                orders.perform_cmd(async move {
                    Msg::RouteOptimized(api::optimize_route(request).await)
                });
            }
            Err(err) => alert(&err.to_string()),
        },
        Msg::RouteOptimized(Ok(response)) => match builder.optimize_succeeded(response) {
            Ok((plan, invalidated)) => {
                map::sync_markers(builder.points());
                if invalidated {
                    map::clear_directions();
                }
                orders.after_next_render(|_| Msg::RowsRendered);
                if let Err(err) = map::render_directions(&plan) {
                    builder.abort_build();
                    map::clear_directions();
                    alert(&format!("Error: {err}"));
                }
            }
            Err(err) => alert(&err.to_string()),
        },
        Msg::RouteOptimized(Err(err)) => {
            builder.abort_build();
            alert(&err.alert_text("Optimization"));
        }
        Msg::DirectionsRendered(status) => match builder.directions_rendered(&status) {
            Ok(Some(route)) => {
                map::sync_markers(builder.points());
                web_sys::console::debug_1(
                    &format!(
                        "[frontend] route drawn: {}s {}m",
                        route.totals.duration_s, route.totals.distance_m
                    )
                    .into(),
                );
            }
            // Points changed while the widget was drawing.
            Ok(None) => map::clear_directions(),
            Err(status) => {
                map::clear_directions();
                alert(&format!("Route display error: {status}"));
            }
        },
        Msg::SaveRoute => match builder.begin_save() {
            Ok(request) => {
                orders.perform_cmd(async move { Msg::RouteSaved(api::save_route(request).await) });
            }
            Err(err) => log_error(&err.to_string()),
        },
        Msg::RouteSaved(result) => {
            builder.save_finished();
            match result {
                Ok(saved) => alert(&format!("Route saved with ID: {}", saved.id)),
                Err(err) => alert(&err.alert_text("Save")),
            }
        }
        Msg::RowsRendered => map::bind_autocomplete(builder.points()),
    }
}

/// Structural change: markers are rebuilt now, autocomplete is rebound once
/// the rows are in the DOM.
fn points_changed(builder: &RouteBuilder, invalidated: bool, orders: &mut impl Orders<Msg>) {
    map::sync_markers(builder.points());
    if invalidated {
        map::clear_directions();
    }
    orders.after_next_render(|_| Msg::RowsRendered);
}

fn alert(message: &str) {
    if let Err(err) = window().alert_with_message(message) {
        web_sys::console::error_1(&err);
    }
}

fn log_error(message: &str) {
    web_sys::console::error_1(&format!("[frontend] {message}").into());
}

pub fn view(model: &Model) -> Node<Msg> {
    let builder = &model.builder;
    div![
        C!["route-builder"],
        h1!["Route builder"],
        view_points(builder),
        view_options(builder),
        view_actions(builder),
        view_route_details(builder),
    ]
}

fn view_points(builder: &RouteBuilder) -> Node<Msg> {
    let can_remove = builder.points().can_remove();
    let rows = builder.points().iter().map(|entry| {
        let id = entry.id;
        div![
            el_key(&id.to_string()),
            C!["point-entry"],
            input![
                C!["point-input"],
                id!(id.input_id()),
                attrs! {
                    At::Type => "text",
                    At::Value => &entry.address,
                    At::Placeholder => "Enter a place (e.g., Kyiv, Ukraine)",
                    At::AutoComplete => "off",
                },
                IF!(entry.coords.is_some() => C!["resolved"]),
                input_ev(Ev::Input, move |text| Msg::AddressEdited(id, text)),
            ],
            button![
                C!["remove-point"],
                "✕",
                attrs! { At::Disabled => bool_attr(!can_remove) },
                ev(Ev::Click, move |event| {
                    event.prevent_default();
                    Msg::RemovePoint(id)
                }),
            ],
        ]
    });

    div![
        C!["points"],
        div![id!("points-list"), rows],
        button![
            id!("add-point"),
            "+ Add point",
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::AddPoint
            }),
        ],
        small!["Type a place name or click on the map to add a point."],
    ]
}

fn view_options(builder: &RouteBuilder) -> Node<Msg> {
    let current = builder.travel_mode();
    let modes = TravelMode::ALL.into_iter().map(|mode| {
        option![
            attrs! {
                At::Value => mode.as_str(),
                At::Selected => bool_attr(mode == current),
            },
            mode.label(),
        ]
    });

    fieldset![
        legend!["Options"],
        label![
            "Travel mode",
            select![
                id!("travel-mode"),
                modes,
                input_ev(Ev::Change, Msg::TravelModeChanged),
            ],
        ],
        label![
            input![
                id!("is-round-trip"),
                attrs! {
                    At::Type => "checkbox",
                    At::Checked => bool_attr(builder.is_round_trip()),
                },
                ev(Ev::Change, |_| Msg::RoundTripToggled),
            ],
            span!["Round trip"],
        ],
    ]
}

fn view_actions(builder: &RouteBuilder) -> Node<Msg> {
    div![
        C!["actions"],
        button![
            id!("build-route"),
            if builder.is_building() {
                "Building…"
            } else {
                "Build route"
            },
            attrs! { At::Disabled => bool_attr(builder.is_building()) },
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::BuildRoute
            }),
        ],
        button![
            id!("save-route"),
            "Save route",
            attrs! { At::Disabled => bool_attr(!builder.can_save()) },
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::SaveRoute
            }),
        ],
    ]
}

fn view_route_details(builder: &RouteBuilder) -> Node<Msg> {
    match builder.route() {
        Some(route) => div![
            id!("route-details"),
            h2!["Route details"],
            p!["Time: ", span![id!("route-time"), route.totals.duration_text()]],
            p![
                "Distance: ",
                span![id!("route-distance"), route.totals.distance_text()]
            ],
        ],
        None => div![id!("route-details"), C!["hidden"]],
    }
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    map::init(&MapOptions::default());
    App::start("app", init, update, view);
}
