//! Risk classification for live incident feeds.

use serde::Serialize;

use crate::aggregate::{Direction, GroupTotal, count_by_category, top_n};
use crate::live::LiveIncident;

/// How many hotspot areas the safety report lists.
const HOTSPOT_COUNT: usize = 5;

/// How many matched incidents the safety report echoes back.
const RECENT_COUNT: usize = 10;

/// Risk bucket derived from a recent-incident count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    None,
    Low,
    Moderate,
    High,
}

/// Converts an incident count into a risk tier.
///
/// | Count     | Tier     |
/// |-----------|----------|
/// | 0         | None     |
/// | 1–20      | Low      |
/// | 21–50     | Moderate |
/// | > 50      | High     |
pub fn classify(crime_count: usize) -> RiskTier {
    match crime_count {
        0 => RiskTier::None,
        1..=20 => RiskTier::Low,
        21..=50 => RiskTier::Moderate,
        _ => RiskTier::High,
    }
}

/// User-facing message for a tier and its count.
pub fn safety_message(tier: RiskTier, crime_count: usize) -> String {
    match tier {
        RiskTier::None => "No recent crimes reported. Safe to visit!".to_string(),
        RiskTier::Low => {
            format!("Only {crime_count} crimes reported recently. Generally Safe!")
        }
        RiskTier::Moderate => {
            format!("{crime_count} crimes reported. Moderate Risk. Please be cautious.")
        }
        RiskTier::High => {
            format!("{crime_count} crimes reported! High Risk Area. Avoid if possible.")
        }
    }
}

/// Message shown when the live fetch itself fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch crime data. Please try again later.";

/// A matched incident echoed back in the report.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentSummary {
    pub date: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
}

/// Result of one safety evaluation.
#[derive(Debug, Serialize)]
pub struct SafetyReport {
    pub city: String,
    pub area: Option<String>,
    pub crime_count: usize,
    pub tier: RiskTier,
    pub message: String,
    pub hotspots: Vec<GroupTotal>,
    pub recent: Vec<IncidentSummary>,
}

/// Evaluates the fetched incidents against an optional area query.
///
/// The tier scores only the area-matched subset; `hotspots` ranks areas
/// over the whole fetch. A source with no area data matches nothing when an
/// area query is supplied.
pub fn evaluate(city: &str, incidents: &[LiveIncident], area: Option<&str>) -> SafetyReport {
    let matched: Vec<&LiveIncident> = match area {
        Some(query) => filter_by_area(incidents, query),
        None => incidents.iter().collect(),
    };

    let crime_count = matched.len();
    let tier = classify(crime_count);

    let area_values = incidents.iter().filter_map(|i| i.area.as_deref());
    let hotspots = top_n(
        &count_by_category(area_values),
        HOTSPOT_COUNT,
        Direction::Largest,
    );

    let recent = matched
        .iter()
        .take(RECENT_COUNT)
        .map(|i| IncidentSummary {
            date: i.date.clone(),
            category: i.category.clone(),
            area: i.area.clone(),
        })
        .collect();

    SafetyReport {
        city: city.to_string(),
        area: area.map(str::to_string),
        crime_count,
        tier,
        message: safety_message(tier, crime_count),
        hotspots,
        recent,
    }
}

/// Case-insensitive substring match over each incident's area value.
pub fn filter_by_area<'a>(incidents: &'a [LiveIncident], query: &str) -> Vec<&'a LiveIncident> {
    let needle = query.to_lowercase();
    incidents
        .iter()
        .filter(|i| {
            i.area
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle))
        })
        .collect()
}
