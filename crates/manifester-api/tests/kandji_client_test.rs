#![allow(clippy::unwrap_used)]
// Integration tests for `KandjiClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use manifester_api::kandji::DeviceListParams;
use manifester_api::{Error, KandjiClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, KandjiClient) {
    let server = MockServer::start().await;
    let token = SecretString::from("kandji-token".to_string());
    let client = KandjiClient::new(&server.uri(), &token, &TransportConfig::default()).unwrap();
    (server, client)
}

fn device(id: &str, serial: &str, user: serde_json::Value) -> serde_json::Value {
    json!({
        "device_id": id,
        "device_name": format!("{id}-mbp"),
        "serial_number": serial,
        "platform": "Mac",
        "user": user,
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_all_devices_walks_offsets_until_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("limit", "300"))
        .and(query_param("offset", "0"))
        .and(header("authorization", "Bearer kandji-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device("d1", "C02AAA", json!({ "email": "jane.doe@example.com", "name": "Jane Doe", "id": 7 })),
            device("d2", "C02BBB", json!("")),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("offset", "300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device("d3", "C02CCC", json!({ "email": "sam@example.com", "name": "Sam", "id": "u-9" })),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("offset", "600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_all_devices().await.unwrap();

    let serials: Vec<_> = devices
        .iter()
        .map(|d| d.serial_number.clone().unwrap())
        .collect();
    assert_eq!(serials, vec!["C02AAA", "C02BBB", "C02CCC"]);
    assert_eq!(
        devices[0].assigned_user().unwrap().email,
        "jane.doe@example.com"
    );
    assert!(devices[1].assigned_user().is_none());
}

#[tokio::test]
async fn test_list_devices_single_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device("d9", "C02ZZZ", json!(null)),
        ])))
        .mount(&server)
        .await;

    let page = client
        .list_devices(&DeviceListParams {
            limit: 10,
            offset: 20,
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].device_id, "d9");
}

#[tokio::test]
async fn test_base_url_with_api_prefix_is_not_doubled() {
    let server = MockServer::start().await;
    let client = KandjiClient::from_reqwest(
        &format!("{}/api/v1", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap();

    assert_eq!(client.base_url().path(), "/api/v1/");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let err = client.list_all_devices().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_mid_walk_failure_aborts() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device("d1", "C02AAA", json!("")),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("offset", "300"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client.list_all_devices().await.unwrap_err();
    match err {
        Error::Http { status, .. } => assert_eq!(status, 502),
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"an array\"}"))
        .mount(&server)
        .await;

    let err = client.list_all_devices().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("not")),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
        .mount(&server)
        .await;

    let err = client.list_all_devices().await.unwrap_err();
    assert!(matches!(err, Error::RateLimited { retry_after_secs: 12 }));
    assert!(err.is_transient());
}

// ── Pagination guards ───────────────────────────────────────────────

#[tokio::test]
async fn test_walk_stops_when_offset_is_ignored() {
    let (server, client) = setup().await;

    // Every offset answers with the same page.
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device("d1", "C02AAA", json!("")),
            device("d2", "C02BBB", json!("")),
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let devices = client.list_all_devices().await.unwrap();

    let ids: Vec<_> = devices.iter().map(|d| d.device_id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
}
