use serde::{Deserialize, Serialize};

/// Last-known device coordinates supplied with a transition request.
///
/// Shape is all this core checks; geographic plausibility is a device/UI
/// concern. Only the current value is kept on the order, no history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Structured address with optional coordinates, used for pickup/dropoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub address: String,
    pub point: Option<GeoPoint>,
}
