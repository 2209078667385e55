//! Per-source live feed configuration.
//!
//! Each city's open-data API uses its own field names for the category,
//! date, and area concepts. A [`SourceProfile`] records those names next to
//! the feed itself, so downstream code dispatches on the profile table
//! instead of branching on city names.

use clap::ValueEnum;

/// Cities with a live incident feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum City {
    Chicago,
    NewYork,
    LosAngeles,
}

/// Where a city's incidents come from.
#[derive(Debug, Clone, Copy)]
pub enum FeedKind {
    /// Socrata endpoint accepting a `$limit` query parameter.
    Endpoint(&'static str),
    /// Embedded JSON sample for cities without a public endpoint.
    Sample(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct SourceProfile {
    pub city: City,
    pub name: &'static str,
    pub date_field: &'static str,
    pub category_field: &'static str,
    pub area_field: &'static str,
    pub feed: FeedKind,
}

/// Los Angeles has no public endpoint; a fixed sample stands in.
const LA_SAMPLE: &str = include_str!("la_sample.json");

static PROFILES: &[SourceProfile] = &[
    SourceProfile {
        city: City::Chicago,
        name: "Chicago",
        date_field: "date",
        category_field: "primary_type",
        area_field: "location_description",
        feed: FeedKind::Endpoint("https://data.cityofchicago.org/resource/ijzp-q8t2.json"),
    },
    SourceProfile {
        city: City::NewYork,
        name: "New York City",
        date_field: "cmplnt_fr_dt",
        category_field: "ofns_desc",
        area_field: "boro_nm",
        feed: FeedKind::Endpoint("https://data.cityofnewyork.us/resource/qgea-i56i.json"),
    },
    SourceProfile {
        city: City::LosAngeles,
        name: "Los Angeles",
        date_field: "date",
        category_field: "crime_type",
        area_field: "location",
        feed: FeedKind::Sample(LA_SAMPLE),
    },
];

pub fn profile_for(city: City) -> &'static SourceProfile {
    PROFILES
        .iter()
        .find(|p| p.city == city)
        .expect("every City variant has a profile")
}
