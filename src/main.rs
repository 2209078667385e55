//! CLI entry point for the crimewatch tool.
//!
//! Provides subcommands for the historical views (trends, rankings, weapon,
//! bias, and demographic distributions), the live city feeds, and the
//! area safety checker.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crimewatch::aggregate::{Direction, GroupTotal, count_by_category, sum_by_group, top_n};
use crimewatch::dataset::CrimeDatasets;
use crimewatch::fetch::auth::ApiKey;
use crimewatch::fetch::{BasicClient, HttpClient};
use crimewatch::filter::{CrimeFilter, filter_crimes, filter_hate_crimes, filter_weapons};
use crimewatch::geo::{MapPoint, city_points, project_incidents};
use crimewatch::live::{City, fetch_incidents, has_categories, profile_for};
use crimewatch::output::{append_records, print_json, print_pretty};
use crimewatch::safety::{self, IncidentSummary};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "crimewatch")]
#[command(about = "A tool to analyze city crime data and check area safety", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crime totals per city across the years
    Trends {
        /// Directory containing the static datasets
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Cities to include (repeatable; all cities when omitted)
        #[arg(long)]
        city: Option<Vec<String>>,

        /// CSV file to append the series to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Most dangerous and safest cities for the selected filters
    Rankings {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Year to rank (all years when omitted)
        #[arg(short, long)]
        year: Option<i32>,

        /// Cities to include (repeatable)
        #[arg(long)]
        city: Option<Vec<String>>,

        /// Crime types to include (repeatable)
        #[arg(long)]
        crime_type: Option<Vec<String>>,

        /// How many cities each ranking lists
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// CSV file to append the rankings to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Robbery counts by weapon type
    Weapons {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Weapon types to include (repeatable)
        #[arg(long)]
        weapon_type: Option<Vec<String>>,
    },
    /// Hate crime counts by bias motivation
    Bias {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Bias motivations to include (repeatable)
        #[arg(long)]
        bias: Option<Vec<String>>,
    },
    /// Offender and victim gender distributions
    Demographics {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Recent incidents from a city's live feed
    Live {
        /// City to fetch
        #[arg(value_enum)]
        city: City,

        /// Maximum number of incidents to fetch
        #[arg(short, long, default_value_t = 500)]
        limit: u32,

        /// CSV file to append the category counts to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Check how safe a city area looks right now
    Safety {
        /// City to check
        #[arg(value_enum)]
        city: City,

        /// Area or neighborhood to match (optional)
        #[arg(short, long)]
        area: Option<String>,

        /// Maximum number of incidents to fetch
        #[arg(short, long, default_value_t = 1000)]
        limit: u32,
    },
}

#[derive(Debug, Serialize)]
struct CitySeries {
    city: String,
    years: Vec<GroupTotal>,
}

#[derive(Debug, Serialize)]
struct TrendsReport {
    generated_at: DateTime<Utc>,
    series: Vec<CitySeries>,
}

#[derive(Debug, Serialize)]
struct RankingsReport {
    generated_at: DateTime<Utc>,
    year: Option<i32>,
    totals: Vec<GroupTotal>,
    dangerous: Vec<GroupTotal>,
    safest: Vec<GroupTotal>,
    map_points: Vec<MapPoint>,
}

#[derive(Debug, Serialize)]
struct WeaponsReport {
    generated_at: DateTime<Utc>,
    robbery_by_weapon: Vec<GroupTotal>,
    top_weapons: Vec<GroupTotal>,
}

#[derive(Debug, Serialize)]
struct BiasReport {
    generated_at: DateTime<Utc>,
    counts: Vec<GroupTotal>,
}

#[derive(Debug, Serialize)]
struct DemographicsReport {
    generated_at: DateTime<Utc>,
    offender_gender: Vec<GroupTotal>,
    victim_gender: Vec<GroupTotal>,
}

#[derive(Debug, Serialize)]
struct LiveReport {
    generated_at: DateTime<Utc>,
    city: String,
    total: usize,
    recent: Vec<IncidentSummary>,
    top_categories: Vec<GroupTotal>,
    map_points: Vec<MapPoint>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/crimewatch.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("crimewatch.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Trends {
            data_dir,
            city,
            output,
        } => run_trends(&data_dir, city, output)?,
        Commands::Rankings {
            data_dir,
            year,
            city,
            crime_type,
            count,
            output,
        } => run_rankings(&data_dir, year, city, crime_type, count, output)?,
        Commands::Weapons {
            data_dir,
            weapon_type,
        } => run_weapons(&data_dir, weapon_type)?,
        Commands::Bias { data_dir, bias } => run_bias(&data_dir, bias)?,
        Commands::Demographics { data_dir } => run_demographics(&data_dir)?,
        Commands::Live {
            city,
            limit,
            output,
        } => run_live(&live_client(), city, limit, output).await?,
        Commands::Safety { city, area, limit } => {
            run_safety(&live_client(), city, area, limit).await?;
        }
    }

    Ok(())
}

/// Builds the live-feed HTTP client, attaching a Socrata application token
/// when `SOCRATA_APP_TOKEN` is set.
fn live_client() -> Box<dyn HttpClient> {
    match std::env::var("SOCRATA_APP_TOKEN") {
        Ok(token) if !token.is_empty() => {
            info!("Using Socrata application token");
            Box::new(ApiKey::app_token(BasicClient::new(), token))
        }
        _ => Box::new(BasicClient::new()),
    }
}

fn run_trends(
    data_dir: &Path,
    cities: Option<Vec<String>>,
    output: Option<String>,
) -> Result<()> {
    let datasets = CrimeDatasets::load(data_dir)?;

    // The trends view applies only the city selection; the series always
    // spans the whole year range.
    let filter = CrimeFilter {
        cities,
        ..Default::default()
    };
    let rows = filter_crimes(&datasets.crimes, &filter);

    let cities = count_by_category(rows.iter().map(|r| r.city.clone()));
    let series: Vec<CitySeries> = cities
        .iter()
        .map(|group| CitySeries {
            city: group.key.clone(),
            years: sum_by_group(
                rows.iter()
                    .filter(|r| r.city == group.key)
                    .map(|r| (r.year.to_string(), r.total_crimes)),
            ),
        })
        .collect();

    info!(cities = series.len(), rows = rows.len(), "Trend series built");

    let report = TrendsReport {
        generated_at: Utc::now(),
        series,
    };
    print_pretty(&report);
    print_json(&report)?;

    if let Some(path) = output {
        let flat: Vec<GroupTotal> = report
            .series
            .iter()
            .flat_map(|s| {
                s.years.iter().map(|y| GroupTotal {
                    key: format!("{}/{}", s.city, y.key),
                    total: y.total,
                })
            })
            .collect();
        append_records(&path, &flat)?;
    }

    Ok(())
}

fn run_rankings(
    data_dir: &Path,
    year: Option<i32>,
    cities: Option<Vec<String>>,
    crime_types: Option<Vec<String>>,
    count: usize,
    output: Option<String>,
) -> Result<()> {
    let datasets = CrimeDatasets::load(data_dir)?;

    if let (Some(year), Some((min, max))) = (year, datasets.year_range()) {
        if year < min || year > max {
            warn!(year, min, max, "Requested year is outside the dataset range");
        }
    }

    let filter = CrimeFilter {
        year,
        crime_types,
        cities,
    };
    let rows = filter_crimes(&datasets.crimes, &filter);
    let totals = sum_by_group(rows.iter().map(|r| (r.city.clone(), r.total_crimes)));

    let dangerous = top_n(&totals, count, Direction::Largest);
    let safest = top_n(&totals, count, Direction::Smallest);
    let map_points = city_points(&totals, &dangerous, &safest);

    info!(
        groups = totals.len(),
        dangerous = dangerous.len(),
        safest = safest.len(),
        "Rankings computed"
    );

    let report = RankingsReport {
        generated_at: Utc::now(),
        year,
        totals,
        dangerous,
        safest,
        map_points,
    };
    print_pretty(&report);
    print_json(&report)?;

    if let Some(path) = output {
        append_records(&path, &report.dangerous)?;
        append_records(&path, &report.safest)?;
    }

    Ok(())
}

fn run_weapons(data_dir: &Path, weapon_types: Option<Vec<String>>) -> Result<()> {
    let datasets = CrimeDatasets::load(data_dir)?;
    let rows = filter_weapons(&datasets.weapons, weapon_types.as_deref());

    let robbery_by_weapon = sum_by_group(rows.iter().map(|r| (r.weapon_type.clone(), r.robbery())));
    let top_weapons = top_n(&robbery_by_weapon, 5, Direction::Largest);

    let report = WeaponsReport {
        generated_at: Utc::now(),
        robbery_by_weapon,
        top_weapons,
    };
    print_json(&report)?;

    Ok(())
}

fn run_bias(data_dir: &Path, biases: Option<Vec<String>>) -> Result<()> {
    let datasets = CrimeDatasets::load(data_dir)?;
    let rows = filter_hate_crimes(&datasets.hate_crimes, biases.as_deref());

    let report = BiasReport {
        generated_at: Utc::now(),
        counts: count_by_category(rows.iter().map(|r| r.bias.clone())),
    };
    print_json(&report)?;

    Ok(())
}

fn run_demographics(data_dir: &Path) -> Result<()> {
    let datasets = CrimeDatasets::load(data_dir)?;

    // Blank gender cells carry no information and are left out of the counts.
    let offender_gender = count_by_category(
        datasets
            .demographics
            .iter()
            .map(|r| r.offender_gender.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string),
    );
    let victim_gender = count_by_category(
        datasets
            .demographics
            .iter()
            .map(|r| r.victim_gender.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string),
    );

    let report = DemographicsReport {
        generated_at: Utc::now(),
        offender_gender,
        victim_gender,
    };
    print_json(&report)?;

    Ok(())
}

#[tracing::instrument(skip(client))]
async fn run_live<C: HttpClient>(
    client: &C,
    city: City,
    limit: u32,
    output: Option<String>,
) -> Result<()> {
    let profile = profile_for(city);

    let incidents = match fetch_incidents(client, profile, limit).await {
        Ok(incidents) => incidents,
        Err(e) => {
            error!(error = %e, city = profile.name, "Live feed fetch failed");
            println!("No live data available right now.");
            return Ok(());
        }
    };

    if incidents.is_empty() {
        println!("No live data available right now.");
        return Ok(());
    }

    let recent: Vec<IncidentSummary> = incidents
        .iter()
        .take(5)
        .map(|i| IncidentSummary {
            date: i.date.clone(),
            category: i.category.clone(),
            area: i.area.clone(),
        })
        .collect();

    let top_categories = if has_categories(&incidents) {
        top_n(
            &count_by_category(incidents.iter().filter_map(|i| i.category.clone())),
            10,
            Direction::Largest,
        )
    } else {
        warn!(city = profile.name, "Crime category column not found");
        Vec::new()
    };

    let projection = project_incidents(&incidents);
    if !projection.unmappable.is_empty() {
        warn!(
            count = projection.unmappable.len(),
            city = profile.name,
            "Incidents with unparseable coordinates excluded from the map"
        );
    }
    debug!(
        points = projection.points.len(),
        missing = projection.missing,
        "Incident map points built"
    );

    let report = LiveReport {
        generated_at: Utc::now(),
        city: profile.name.to_string(),
        total: incidents.len(),
        recent,
        top_categories,
        map_points: projection.points,
    };
    print_pretty(&report);
    print_json(&report)?;

    if let Some(path) = output {
        append_records(&path, &report.top_categories)?;
    }

    Ok(())
}

#[tracing::instrument(skip(client))]
async fn run_safety<C: HttpClient>(
    client: &C,
    city: City,
    area: Option<String>,
    limit: u32,
) -> Result<()> {
    let profile = profile_for(city);

    let incidents = match fetch_incidents(client, profile, limit).await {
        Ok(incidents) => incidents,
        Err(e) => {
            error!(error = %e, city = profile.name, "Safety check fetch failed");
            println!("{}", safety::FETCH_FAILED_MESSAGE);
            return Ok(());
        }
    };

    let report = safety::evaluate(profile.name, &incidents, area.as_deref());

    info!(
        city = profile.name,
        crime_count = report.crime_count,
        tier = ?report.tier,
        "Safety evaluation complete"
    );

    print_pretty(&report);
    print_json(&report)?;

    Ok(())
}
