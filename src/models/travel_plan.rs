use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    pub description: String,
    pub location: Coordinates,
    pub suggested_days: i64,
    pub image_url: String,
}

/// Viewport hint returned alongside the destinations. Never validated.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlan {
    pub destinations: Vec<Destination>,
    pub bounding_box: BoundingBox,
}

impl TravelPlan {
    pub fn find_destination(&self, name: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TripRequest {
    pub country: String,
    pub days: i64,
}
