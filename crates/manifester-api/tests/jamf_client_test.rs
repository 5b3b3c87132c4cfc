#![allow(clippy::unwrap_used)]
// Integration tests for `JamfClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use manifester_api::{Error, JamfClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, JamfClient) {
    let server = MockServer::start().await;
    let password = SecretString::from("hunter2".to_string());
    let client =
        JamfClient::new(&server.uri(), "api-user", &password, &TransportConfig::default()).unwrap();
    (server, client)
}

fn details(id: i64, serial: &str, username: &str, email: &str) -> serde_json::Value {
    json!({
        "computer": {
            "general": { "id": id, "name": format!("mac-{id}"), "serial_number": serial },
            "location": {
                "username": username,
                "realname": "",
                "real_name": format!("User {id}"),
                "email_address": email,
                "department": ""
            }
        }
    })
}

async fn mount_list(server: &MockServer, ids: &[i64]) {
    let computers: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("mac-{id}") }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers"))
        .and(basic_auth("api-user", "hunter2"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "computers": computers })))
        .mount(server)
        .await;
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_computers() {
    let (server, client) = setup().await;
    mount_list(&server, &[1, 2]).await;

    let computers = client.list_computers().await.unwrap();
    assert_eq!(computers.len(), 2);
    assert_eq!(computers[1].name, "mac-2");
}

#[tokio::test]
async fn test_list_computer_details_fetches_each_computer_once() {
    let (server, client) = setup().await;
    let ids = [1, 2, 3, 4, 5, 6, 7];
    mount_list(&server, &ids).await;

    for id in ids {
        Mock::given(method("GET"))
            .and(path(format!("/JSSResource/computers/id/{id}")))
            .and(basic_auth("api-user", "hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(details(
                id,
                &format!("SER{id}"),
                &format!("user{id}"),
                &format!("user{id}@example.com"),
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let details = client.list_computer_details(3).await.unwrap();

    let mut serials: Vec<_> = details
        .iter()
        .map(|d| d.general.serial_number.clone())
        .collect();
    serials.sort();
    assert_eq!(
        serials,
        vec!["SER1", "SER2", "SER3", "SER4", "SER5", "SER6", "SER7"]
    );
    let first = details.iter().find(|d| d.general.id == 1).unwrap();
    assert_eq!(first.location.email_address, "user1@example.com");
    assert_eq!(first.location.display_name(), "User 1");
}

#[tokio::test]
async fn test_empty_inventory_makes_no_detail_calls() {
    let (server, client) = setup().await;
    mount_list(&server, &[]).await;

    let details = client.list_computer_details(5).await.unwrap();
    assert!(details.is_empty());
}

#[tokio::test]
async fn test_zero_workers_still_progresses() {
    let (server, client) = setup().await;
    mount_list(&server, &[1]).await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/id/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details(1, "SER1", "", "")))
        .mount(&server)
        .await;

    let details = client.list_computer_details(0).await.unwrap();
    assert_eq!(details.len(), 1);
    assert!(details[0].location.email_address.is_empty());
}

#[test]
fn test_empty_username_is_rejected() {
    let password = SecretString::from("x".to_string());
    let result = JamfClient::from_reqwest("https://jamf.example.com", "", &password, reqwest::Client::new());
    assert!(matches!(result, Err(Error::InvalidCredential { .. })));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_detail_failure_fails_the_listing() {
    let (server, client) = setup().await;
    mount_list(&server, &[1, 2]).await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/id/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details(1, "SER1", "a", "a@example.com")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/id/2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = client.list_computer_details(2).await.unwrap_err();
    match err {
        Error::Http { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_computers().await.unwrap_err();
    assert!(err.is_auth_failure());
}
