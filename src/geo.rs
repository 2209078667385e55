//! Static city coordinates and map point sets.
//!
//! Coordinate absence is data, not an error: cities outside the fixed
//! lookup table simply produce no map point. Live incidents whose
//! coordinate strings fail to parse are collected for diagnostics instead
//! of being dropped silently.

use serde::Serialize;

use crate::aggregate::GroupTotal;
use crate::live::LiveIncident;

/// The fixed set of cities with known coordinates.
pub static CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("New York", 40.7128, -74.0060),
    ("Los Angeles", 34.0522, -118.2437),
    ("Chicago", 41.8781, -87.6298),
    ("Houston", 29.7604, -95.3698),
    ("Philadelphia", 39.9526, -75.1652),
    ("Phoenix", 33.4484, -112.0740),
    ("San Antonio", 29.4241, -98.4936),
    ("San Diego", 32.7157, -117.1611),
    ("Dallas", 32.7767, -96.7970),
    ("San Jose", 37.3382, -121.8863),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Green,
    Blue,
}

/// One renderable map marker.
#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: MarkerColor,
}

/// Live incidents split into renderable points and leftovers.
#[derive(Debug, Default)]
pub struct IncidentProjection {
    pub points: Vec<MapPoint>,
    /// Rows with coordinate values that failed to parse.
    pub unmappable: Vec<LiveIncident>,
    /// Rows with no coordinates at all.
    pub missing: usize,
}

pub fn coordinates_for(city: &str) -> Option<(f64, f64)> {
    CITY_COORDINATES
        .iter()
        .find(|(name, _, _)| *name == city)
        .map(|(_, lat, lon)| (*lat, *lon))
}

/// Map points for the historical ranking view: one marker per known city,
/// red when it appears in `dangerous`, green when in `safest`, blue
/// otherwise. Cities without a coordinate entry are dropped.
pub fn city_points(
    totals: &[GroupTotal],
    dangerous: &[GroupTotal],
    safest: &[GroupTotal],
) -> Vec<MapPoint> {
    totals
        .iter()
        .filter_map(|group| {
            let (latitude, longitude) = coordinates_for(&group.key)?;
            let color = if dangerous.iter().any(|g| g.key == group.key) {
                MarkerColor::Red
            } else if safest.iter().any(|g| g.key == group.key) {
                MarkerColor::Green
            } else {
                MarkerColor::Blue
            };
            Some(MapPoint {
                label: format!("{}: {} crimes", group.key, group.total),
                latitude,
                longitude,
                color,
            })
        })
        .collect()
}

/// Parses each incident's coordinate strings into map markers.
///
/// Rows missing both coordinates go to `missing`; rows carrying a value
/// that does not parse as a float go to `unmappable`.
pub fn project_incidents(incidents: &[LiveIncident]) -> IncidentProjection {
    let mut projection = IncidentProjection::default();

    for incident in incidents {
        if incident.latitude.is_none() && incident.longitude.is_none() {
            projection.missing += 1;
            continue;
        }

        let latitude = incident.latitude.as_deref().and_then(parse_coordinate);
        let longitude = incident.longitude.as_deref().and_then(parse_coordinate);

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => projection.points.push(MapPoint {
                label: incident
                    .category
                    .clone()
                    .unwrap_or_else(|| "Crime".to_string()),
                latitude,
                longitude,
                color: MarkerColor::Red,
            }),
            _ => projection.unmappable.push(incident.clone()),
        }
    }

    projection
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
