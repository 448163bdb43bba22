//! Render-ready description of the itinerary map: one marker per stop, a
//! geodesic line through the stops in trip order, and a viewport fitted to
//! the plan's bounding box.

use serde::Serialize;

use crate::models::travel_plan::{Coordinates, TravelPlan};

pub const SELECTED_MARKER_ICON: &str = "https://maps.google.com/mapfiles/ms/icons/blue-dot.png";
const SELECTED_MARKER_SIZE: u32 = 40;
const SELECTED_Z_INDEX: i32 = 100;
const DEFAULT_Z_INDEX: i32 = 1;

const ROUTE_COLOR: &str = "#00A3FF";
const ROUTE_OPACITY: f32 = 0.9;
const ROUTE_WEIGHT: u32 = 4;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub url: String,
    pub scaled_size: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Also the destination name sent back when the marker is clicked.
    pub title: String,
    pub position: Coordinates,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<MarkerIcon>,
    pub z_index: i32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteLine {
    pub path: Vec<Coordinates>,
    pub geodesic: bool,
    pub stroke_color: String,
    pub stroke_opacity: f32,
    pub stroke_weight: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub north_east: Coordinates,
    pub south_west: Coordinates,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapScene {
    pub markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

pub fn build_map_scene(plan: &TravelPlan, selected: Option<&str>) -> MapScene {
    if plan.destinations.is_empty() {
        return MapScene {
            markers: Vec::new(),
            route: None,
            viewport: None,
        };
    }

    let markers = plan
        .destinations
        .iter()
        .map(|destination| {
            let is_selected = selected == Some(destination.name.as_str());
            Marker {
                title: destination.name.clone(),
                position: destination.location,
                selected: is_selected,
                icon: is_selected.then(|| MarkerIcon {
                    url: SELECTED_MARKER_ICON.to_string(),
                    scaled_size: SELECTED_MARKER_SIZE,
                }),
                z_index: if is_selected {
                    SELECTED_Z_INDEX
                } else {
                    DEFAULT_Z_INDEX
                },
            }
        })
        .collect();

    let route = RouteLine {
        path: plan.destinations.iter().map(|d| d.location).collect(),
        geodesic: true,
        stroke_color: ROUTE_COLOR.to_string(),
        stroke_opacity: ROUTE_OPACITY,
        stroke_weight: ROUTE_WEIGHT,
    };

    let bounds = plan.bounding_box;
    let viewport = Viewport {
        north_east: Coordinates {
            lat: bounds.north,
            lng: bounds.east,
        },
        south_west: Coordinates {
            lat: bounds.south,
            lng: bounds.west,
        },
    };

    MapScene {
        markers,
        route: Some(route),
        viewport: Some(viewport),
    }
}
