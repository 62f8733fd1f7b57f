#![allow(clippy::unwrap_used)]
// Integration tests for `DeviceClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearthdash_api::{ApiColor, ApiDevice, DeviceClient, DeviceCommandBody, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let client = DeviceClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    let body = json!([
        { "id": "lamp", "label": "Living lamp", "type": "switch", "value": "On", "isActive": true },
        { "id": 7, "label": "Hall dimmer", "type": "dimmer", "value": 35, "isActive": false },
    ]);

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(
        devices,
        vec![
            ApiDevice {
                id: "lamp".into(),
                label: "Living lamp".into(),
                kind: "switch".into(),
                value: "On".into(),
                is_active: true,
            },
            ApiDevice {
                id: "7".into(),
                label: "Hall dimmer".into(),
                kind: "dimmer".into(),
                value: "35".into(),
                is_active: false,
            },
        ]
    );
}

#[tokio::test]
async fn test_base_path_is_preserved() {
    let server = MockServer::start().await;
    let client = DeviceClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_devices().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_patch_state() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/devices/lamp"))
        .and(body_json(json!({ "state": "Off" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_command("lamp", &DeviceCommandBody::State("Off".into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_patch_color() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/devices/bulb"))
        .and(body_json(json!({ "color": { "r": 10, "g": 20, "b": 30 } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_command(
            "bulb",
            &DeviceCommandBody::Color(ApiColor { r: 10, g: 20, b: 30 }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_patch_level() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/devices/dimmer"))
        .and(body_json(json!({ "level": 60 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_command("dimmer", &DeviceCommandBody::Level(60))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let token = SecretString::from("s3cret".to_string());
    let client = DeviceClient::new(&server.uri(), Some(&token), &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/devices"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.list_devices().await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn test_api_error_message() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/devices/ghost"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "unknown device" })),
        )
        .mount(&server)
        .await;

    let err = client
        .send_command("ghost", &DeviceCommandBody::State("On".into()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "unknown device");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "{not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
