//! End-to-end runs of the fetch pipeline against a mock OpenWeather server.

use chrono::Utc;
use locweather_core::{
    Coordinates, FetchError, FetchOrchestrator, FixedLocation, Icon, OpenWeatherClient,
    PipelineError, SnapshotStore, Terminal, UnitSystem,
    display::to_display_fields_in,
    network::{AssumeOnline, Offline},
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seattle_payload() -> serde_json::Value {
    serde_json::json!({
        "weather": [{ "id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d" }],
        "main": { "temp": 15.2, "feels_like": 14.8, "temp_min": 13.0, "temp_max": 17.0, "humidity": 88 },
        "wind": { "speed": 3.1 },
        "sys": { "country": "US", "sunrise": 1700000000, "sunset": 1700040000 },
        "name": "Seattle"
    })
}

fn seattle() -> FixedLocation {
    FixedLocation::new(Some(Coordinates::new(47.61, -122.33)))
}

fn orchestrator(
    server: &MockServer,
    dir: &TempDir,
    location: FixedLocation,
    online: bool,
) -> FetchOrchestrator {
    let api = OpenWeatherClient::with_base_url("TEST_KEY".into(), &server.uri());
    let store = SnapshotStore::open(dir.path().join("preferences.json"));

    let orchestrator = if online {
        FetchOrchestrator::new(Box::new(location), Box::new(AssumeOnline), Box::new(api), store)
    } else {
        FetchOrchestrator::new(Box::new(location), Box::new(Offline), Box::new(api), store)
    };

    orchestrator.with_units(UnitSystem::Metric)
}

#[tokio::test]
async fn fetch_store_and_display_roundtrip() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seattle_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server, &dir, seattle(), true);

    let Terminal::Success(fetched) = orchestrator.run().await else {
        panic!("expected success");
    };

    // Reopen the store as a fresh process would.
    let reopened = SnapshotStore::open(dir.path().join("preferences.json"));
    let stored = reopened.load().expect("snapshot persisted");
    assert_eq!(stored, fetched);

    let fields = to_display_fields_in(&stored, "US", &Utc);
    assert_eq!(fields.icon, Some(Icon::Rain));
    assert_eq!(fields.unit_label, "°F");
    assert_eq!(fields.sunrise, "22:13:20");
    assert_eq!(fields.location_name, "Seattle");
}

#[tokio::test]
async fn not_found_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seattle_payload()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server, &dir, seattle(), true);

    assert!(orchestrator.run().await.is_success());
    let before = orchestrator.store().load();

    let outcome = orchestrator.run().await;

    assert!(matches!(
        outcome,
        Terminal::Failed(PipelineError::Fetch(FetchError::Http(404)))
    ));
    assert_eq!(orchestrator.store().load(), before);
}

#[tokio::test]
async fn malformed_body_is_not_persisted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server, &dir, seattle(), true);

    assert!(matches!(
        orchestrator.run().await,
        Terminal::Failed(PipelineError::Fetch(FetchError::Malformed(_)))
    ));
    assert!(orchestrator.store().load().is_none());
}

#[tokio::test]
async fn location_disabled_makes_no_http_call() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seattle_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server, &dir, FixedLocation::default(), true);

    assert!(matches!(orchestrator.run().await, Terminal::LocationDisabled));
    assert!(orchestrator.store().load().is_none());
}

#[tokio::test]
async fn offline_makes_no_http_call() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seattle_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server, &dir, seattle(), false);

    assert!(matches!(orchestrator.run().await, Terminal::NoNetwork));
}
