//! Loaders for the four static crime datasets.
//!
//! Each table is read from CSV with an exact header contract. The weapon
//! table's first column arrives unnamed and is normalized to `Weapon Type`
//! before anything downstream sees it.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

pub const CRIME_FILE: &str = "crime_data.csv";
pub const DEMOGRAPHICS_FILE: &str = "demographics.csv";
pub const WEAPON_FILE: &str = "weapon_data.csv";
pub const HATE_CRIME_FILE: &str = "hate_crimes.csv";

/// Accepted spellings of the weapon table's leading column.
const WEAPON_TYPE_ALIASES: &[&str] = &["", "Unnamed: 0", "Weapon Type"];

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column {column:?}")]
    MissingColumn { path: String, column: &'static str },

    #[error("invalid count {value:?} in column {column:?} of {path}")]
    InvalidCount {
        path: String,
        column: String,
        value: String,
    },
}

/// One historical crime total for a city, year, and crime type.
#[derive(Debug, Clone, Deserialize)]
pub struct CrimeRecord {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Crime Type")]
    pub crime_type: String,
    #[serde(rename = "Total Crimes")]
    pub total_crimes: u64,
}

/// One incident's offender and victim genders.
#[derive(Debug, Clone, Deserialize)]
pub struct DemographicRecord {
    #[serde(rename = "Offender_Gender")]
    pub offender_gender: String,
    #[serde(rename = "Victim_Gender")]
    pub victim_gender: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HateCrimeRecord {
    #[serde(rename = "Bias")]
    pub bias: String,
}

/// One weapon category with its per-offense incident counts.
#[derive(Debug, Clone)]
pub struct WeaponRecord {
    pub weapon_type: String,
    pub offenses: BTreeMap<String, u64>,
}

impl WeaponRecord {
    /// Robbery count for this weapon category. The `Robbery` column is
    /// verified at load time.
    pub fn robbery(&self) -> u64 {
        self.offenses.get("Robbery").copied().unwrap_or(0)
    }
}

/// All four tables, loaded once per command and immutable afterwards.
#[derive(Debug, Clone)]
pub struct CrimeDatasets {
    pub crimes: Vec<CrimeRecord>,
    pub demographics: Vec<DemographicRecord>,
    pub weapons: Vec<WeaponRecord>,
    pub hate_crimes: Vec<HateCrimeRecord>,
}

impl CrimeDatasets {
    /// Loads all four tables from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if any file is unreadable, malformed, or
    /// missing a required column.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        Ok(Self {
            crimes: load_crimes(&dir.join(CRIME_FILE))?,
            demographics: load_demographics(&dir.join(DEMOGRAPHICS_FILE))?,
            weapons: load_weapons(&dir.join(WEAPON_FILE))?,
            hate_crimes: load_hate_crimes(&dir.join(HATE_CRIME_FILE))?,
        })
    }

    /// Min and max year present in the historical table, used to bound the
    /// year selector. `None` when the table is empty.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.crimes.iter().map(|r| r.year).min()?;
        let max = self.crimes.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

pub fn load_crimes(path: &Path) -> Result<Vec<CrimeRecord>, DataError> {
    load_rows(path, &["City", "Year", "Crime Type", "Total Crimes"])
}

pub fn load_demographics(path: &Path) -> Result<Vec<DemographicRecord>, DataError> {
    load_rows(path, &["Offender_Gender", "Victim_Gender"])
}

pub fn load_hate_crimes(path: &Path) -> Result<Vec<HateCrimeRecord>, DataError> {
    load_rows(path, &["Bias"])
}

/// Loads the weapon table, renaming the unnamed leading column to
/// `Weapon Type` and parsing every remaining column as an offense count.
/// Empty cells count as 0; rows with a blank weapon type are dropped.
pub fn load_weapons(path: &Path) -> Result<Vec<WeaponRecord>, DataError> {
    let mut rdr = open_reader(path)?;
    let headers = headers_of(&mut rdr, path)?;

    match headers.get(0) {
        Some(first) if WEAPON_TYPE_ALIASES.contains(&first) => {}
        _ => {
            return Err(DataError::MissingColumn {
                path: display(path),
                column: "Weapon Type",
            });
        }
    }

    let offense_columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    if !offense_columns.iter().any(|c| c == "Robbery") {
        return Err(DataError::MissingColumn {
            path: display(path),
            column: "Robbery",
        });
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| DataError::Csv {
            path: display(path),
            source,
        })?;

        let weapon_type = record.get(0).unwrap_or("").trim().to_string();
        if weapon_type.is_empty() {
            continue;
        }

        let mut offenses = BTreeMap::new();
        for (column, raw) in offense_columns.iter().zip(record.iter().skip(1)) {
            let raw = raw.trim();
            let count = if raw.is_empty() {
                0
            } else {
                raw.parse::<u64>()
                    .map_err(|_| DataError::InvalidCount {
                        path: display(path),
                        column: column.clone(),
                        value: raw.to_string(),
                    })?
            };
            offenses.insert(column.clone(), count);
        }

        rows.push(WeaponRecord {
            weapon_type,
            offenses,
        });
    }

    debug!(path = %path.display(), rows = rows.len(), "Weapon table loaded");
    Ok(rows)
}

fn load_rows<T>(path: &Path, required: &[&'static str]) -> Result<Vec<T>, DataError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut rdr = open_reader(path)?;
    let headers = headers_of(&mut rdr, path)?;
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataError::MissingColumn {
                path: display(path),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|source| DataError::Csv {
            path: display(path),
            source,
        })?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "Dataset loaded");
    Ok(rows)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: display(path),
        source,
    })?;
    Ok(csv::Reader::from_reader(file))
}

fn headers_of(rdr: &mut csv::Reader<File>, path: &Path) -> Result<csv::StringRecord, DataError> {
    Ok(rdr
        .headers()
        .map_err(|source| DataError::Csv {
            path: display(path),
            source,
        })?
        .clone())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
