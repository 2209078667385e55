use crimewatch::aggregate::{Direction, sum_by_group, top_n};
use crimewatch::dataset::{CrimeDatasets, CrimeRecord};
use crimewatch::fetch::auth::{ApiKey, UrlParam};
use crimewatch::fetch::{BasicClient, FetchError, fetch_json};
use crimewatch::filter::{CrimeFilter, filter_crimes};
use crimewatch::geo::project_incidents;
use crimewatch::live::{City, FeedKind, SourceProfile, fetch_incidents};
use crimewatch::safety::{self, RiskTier};

use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serves one HTTP response on an ephemeral port and hands back the raw
/// request for inspection.
async fn spawn_server(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = tx.send(request);
    });

    (format!("http://{addr}"), rx)
}

fn endpoint_profile(url: &str) -> SourceProfile {
    SourceProfile {
        city: City::Chicago,
        name: "Chicago",
        date_field: "date",
        category_field: "primary_type",
        area_field: "location_description",
        feed: FeedKind::Endpoint(Box::leak(url.to_string().into_boxed_str())),
    }
}

#[tokio::test]
async fn test_live_pipeline_from_chicago_fixture() {
    let body = include_str!("fixtures/chicago_sample.json");
    let (url, _rx) = spawn_server("200 OK", body.to_string()).await;
    let profile = endpoint_profile(&url);

    let incidents = fetch_incidents(&BasicClient::new(), &profile, 1000)
        .await
        .unwrap();
    assert_eq!(incidents.len(), 6);

    // Area-scoped safety check.
    let report = safety::evaluate("Chicago", &incidents, Some("englewood"));
    assert_eq!(report.crime_count, 2);
    assert_eq!(report.tier, RiskTier::Low);
    assert_eq!(
        report.message,
        "Only 2 crimes reported recently. Generally Safe!"
    );

    // Hotspots rank the whole fetch, not the matched subset.
    assert_eq!(report.hotspots[0].key, "LOOP");
    assert_eq!(report.hotspots[0].total, 3);

    // Map projection: four clean rows, one with no coordinates, one with an
    // unparseable latitude.
    let projection = project_incidents(&incidents);
    assert_eq!(projection.points.len(), 4);
    assert_eq!(projection.missing, 1);
    assert_eq!(projection.unmappable.len(), 1);
}

#[tokio::test]
async fn test_nyc_fixture_normalizes_source_fields() {
    let body = include_str!("fixtures/nyc_sample.json");
    let (url, _rx) = spawn_server("200 OK", body.to_string()).await;

    let profile = SourceProfile {
        city: City::NewYork,
        name: "New York City",
        date_field: "cmplnt_fr_dt",
        category_field: "ofns_desc",
        area_field: "boro_nm",
        feed: FeedKind::Endpoint(Box::leak(url.into_boxed_str())),
    };

    let incidents = fetch_incidents(&BasicClient::new(), &profile, 1000)
        .await
        .unwrap();
    assert_eq!(incidents.len(), 4);
    assert_eq!(incidents[0].category.as_deref(), Some("GRAND LARCENY"));
    assert_eq!(incidents[0].area.as_deref(), Some("BROOKLYN"));

    let report = safety::evaluate("New York City", &incidents, Some("brooklyn"));
    assert_eq!(report.crime_count, 2);
    assert_eq!(report.tier, RiskTier::Low);
}

#[tokio::test]
async fn test_empty_feed_reports_safe() {
    let (url, _rx) = spawn_server("200 OK", "[]".to_string()).await;
    let profile = endpoint_profile(&url);

    let incidents = fetch_incidents(&BasicClient::new(), &profile, 1000)
        .await
        .unwrap();
    assert!(incidents.is_empty());

    let report = safety::evaluate("Chicago", &incidents, None);
    assert_eq!(report.tier, RiskTier::None);
    assert_eq!(report.message, "No recent crimes reported. Safe to visit!");
}

#[tokio::test]
async fn test_transport_failure_is_a_fetch_error() {
    // Bind then drop so the port refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let profile = endpoint_profile(&format!("http://{addr}"));
    let err = fetch_incidents(&BasicClient::new(), &profile, 1000)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http(_)));
    // The caller surfaces exactly this message and performs no aggregation.
    assert_eq!(
        safety::FETCH_FAILED_MESSAGE,
        "Failed to fetch crime data. Please try again later."
    );
}

#[tokio::test]
async fn test_non_success_status_is_a_fetch_error() {
    let (url, _rx) = spawn_server("500 Internal Server Error", "{}".to_string()).await;

    let err = fetch_json(&BasicClient::new(), &url).await.unwrap_err();
    match err {
        FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_fetch_error() {
    let (url, _rx) = spawn_server("200 OK", "not json at all".to_string()).await;

    let err = fetch_json(&BasicClient::new(), &url).await.unwrap_err();
    assert!(matches!(err, FetchError::Json(_)));
}

#[tokio::test]
async fn test_api_key_wrapper_sets_header() {
    let (url, rx) = spawn_server("200 OK", "{}".to_string()).await;

    let client = ApiKey::app_token(BasicClient::new(), "secret-token".to_string());
    fetch_json(&client, &url).await.unwrap();

    let request = rx.await.unwrap().to_lowercase();
    assert!(request.contains("x-app-token: secret-token"));
}

#[tokio::test]
async fn test_url_param_wrapper_appends_query() {
    let (url, rx) = spawn_server("200 OK", "{}".to_string()).await;

    let client = UrlParam {
        inner: BasicClient::new(),
        param_name: "api_key".to_string(),
        key: "socrata-test".to_string(),
    };
    fetch_json(&client, &format!("{url}/?existing=1")).await.unwrap();

    let request = rx.await.unwrap();
    assert!(request.contains("existing=1"));
    assert!(request.contains("api_key=socrata-test"));
}

#[test]
fn test_two_city_scenario() {
    let rows = vec![
        CrimeRecord {
            city: "New York".to_string(),
            year: 2020,
            crime_type: "Robbery".to_string(),
            total_crimes: 100,
        },
        CrimeRecord {
            city: "Chicago".to_string(),
            year: 2020,
            crime_type: "Robbery".to_string(),
            total_crimes: 50,
        },
    ];

    let filter = CrimeFilter {
        year: Some(2020),
        cities: Some(vec!["New York".to_string(), "Chicago".to_string()]),
        ..Default::default()
    };
    let filtered = filter_crimes(&rows, &filter);
    let totals = sum_by_group(filtered.iter().map(|r| (r.city.clone(), r.total_crimes)));

    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].key, "New York");
    assert_eq!(totals[0].total, 100);
    assert_eq!(totals[1].total, 50);

    assert_eq!(top_n(&totals, 1, Direction::Largest)[0].key, "New York");
    assert_eq!(top_n(&totals, 1, Direction::Smallest)[0].key, "Chicago");
}

#[test]
fn test_shipped_datasets_load_and_rank() {
    let datasets = CrimeDatasets::load(Path::new("data")).unwrap();

    assert_eq!(datasets.year_range(), Some((2018, 2022)));
    assert!(!datasets.weapons.is_empty());
    assert!(datasets.weapons.iter().any(|w| w.weapon_type == "Firearm"));

    let filter = CrimeFilter {
        year: Some(2020),
        ..Default::default()
    };
    let rows = filter_crimes(&datasets.crimes, &filter);
    let totals = sum_by_group(rows.iter().map(|r| (r.city.clone(), r.total_crimes)));
    assert_eq!(totals.len(), 10);

    let dangerous = top_n(&totals, 5, Direction::Largest);
    let safest = top_n(&totals, 5, Direction::Smallest);
    for g in &dangerous {
        assert!(!safest.iter().any(|s| s.key == g.key));
    }
}
