//! Predicate filtering over the loaded datasets.
//!
//! A predicate that is `None` passes everything through; a predicate with
//! an empty selection matches nothing. Filters return owned copies in the
//! source row order and never touch the source tables.

use crate::dataset::{CrimeRecord, HateCrimeRecord, WeaponRecord};

/// User-selected predicates for the historical crime table, applied as a
/// conjunction.
#[derive(Debug, Clone, Default)]
pub struct CrimeFilter {
    pub year: Option<i32>,
    pub crime_types: Option<Vec<String>>,
    pub cities: Option<Vec<String>>,
}

pub fn filter_crimes(rows: &[CrimeRecord], filter: &CrimeFilter) -> Vec<CrimeRecord> {
    rows.iter()
        .filter(|r| filter.year.is_none_or(|y| r.year == y))
        .filter(|r| selected(filter.crime_types.as_deref(), &r.crime_type))
        .filter(|r| selected(filter.cities.as_deref(), &r.city))
        .cloned()
        .collect()
}

pub fn filter_weapons(rows: &[WeaponRecord], weapon_types: Option<&[String]>) -> Vec<WeaponRecord> {
    rows.iter()
        .filter(|r| selected(weapon_types, &r.weapon_type))
        .cloned()
        .collect()
}

pub fn filter_hate_crimes(
    rows: &[HateCrimeRecord],
    biases: Option<&[String]>,
) -> Vec<HateCrimeRecord> {
    rows.iter()
        .filter(|r| selected(biases, &r.bias))
        .cloned()
        .collect()
}

fn selected(selection: Option<&[String]>, value: &str) -> bool {
    selection.is_none_or(|set| set.iter().any(|s| s == value))
}
