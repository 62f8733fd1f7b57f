#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearthdash_core::{
    ConnectionState, Controller, DashboardConfig, Device, DeviceId, Rgb, SwitchState,
};

const POLL: Duration = Duration::from_millis(50);

fn config(server: &MockServer) -> DashboardConfig {
    let mut config = DashboardConfig::new(format!("{}/api", server.uri()).parse().unwrap());
    config.poll_interval = POLL;
    config.timeout = Duration::from_secs(2);
    config
}

fn devices_body() -> serde_json::Value {
    json!([
        { "id": "lamp", "label": "Lamp", "type": "switch", "value": "Off", "isActive": true },
        { "id": 7, "label": "Hall", "type": "dimmer", "value": 40, "isActive": true }
    ])
}

async fn mount_devices(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
        .mount(server)
        .await;
}

async fn fetch_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count()
}

async fn wait_for_devices(controller: &Controller) {
    let mut stream = controller.devices();
    tokio::time::timeout(Duration::from_secs(2), async {
        while stream.current().is_empty() {
            stream.changed().await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn start_populates_registry_immediately() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    let controller = Controller::new(config(&server)).unwrap();
    controller.start().await;
    wait_for_devices(&controller).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.len(), 2);
    let hall = snapshot.get(&DeviceId::from("7")).unwrap();
    assert_eq!(hall.value, "40");
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);

    controller.shutdown().await;
}

#[tokio::test]
async fn dispatched_commands_reach_the_hub() {
    let server = MockServer::start().await;
    mount_devices(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/devices/lamp"))
        .and(body_json(json!({ "state": "On" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/devices/lamp"))
        .and(body_json(json!({ "color": { "r": 10, "g": 20, "b": 30 } })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server)).unwrap();
    controller.start().await;
    wait_for_devices(&controller).await;

    let lamp = controller.registry().device(&DeviceId::from("lamp")).unwrap();
    assert!(controller.dispatcher().switch_click(&lamp));
    assert!(controller.dispatcher().color_set(&lamp, Rgb::new(10, 20, 30)));

    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.shutdown().await;
    server.verify().await;
}

#[tokio::test]
async fn command_failures_do_not_stop_the_processor() {
    let server = MockServer::start().await;
    mount_devices(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/devices/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/devices/lamp"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server)).unwrap();
    controller.start().await;

    let gone = Device {
        id: DeviceId::from("gone"),
        label: "Gone".into(),
        kind: "switch".into(),
        value: SwitchState::On.to_string(),
        is_active: false,
    };
    let lamp = Device {
        id: DeviceId::from("lamp"),
        ..gone.clone()
    };
    assert!(controller.dispatcher().switch_click(&gone));
    assert!(controller.dispatcher().switch_click(&lamp));

    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.shutdown().await;
    server.verify().await;
}

#[tokio::test]
async fn shutdown_stops_polling() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    let controller = Controller::new(config(&server)).unwrap();
    controller.start().await;
    wait_for_devices(&controller).await;
    controller.shutdown().await;

    let after_shutdown = fetch_count(&server).await;
    tokio::time::sleep(POLL * 4).await;
    assert_eq!(fetch_count(&server).await, after_shutdown);
    assert_eq!(
        *controller.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn dropping_the_controller_stops_polling() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    let controller = Controller::new(config(&server)).unwrap();
    controller.start().await;
    wait_for_devices(&controller).await;
    drop(controller);

    // Let the tasks observe cancellation before sampling.
    tokio::time::sleep(POLL).await;
    let after_drop = fetch_count(&server).await;
    tokio::time::sleep(POLL * 4).await;
    assert_eq!(fetch_count(&server).await, after_drop);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("hub offline"))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server)).unwrap();
    let mut state = controller.connection_state();
    controller.start().await;
    wait_for_devices(&controller).await;

    tokio::time::timeout(Duration::from_secs(2), async {
        while !matches!(*state.borrow_and_update(), ConnectionState::Degraded { .. }) {
            state.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    assert_eq!(controller.snapshot().len(), 2);
    controller.shutdown().await;
}

#[tokio::test]
async fn manual_refresh_reports_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server)).unwrap();
    let err = controller.refresh().await.unwrap_err();
    assert!(matches!(err, hearthdash_core::CoreError::Unauthorized));
    assert!(controller.snapshot().is_empty());
}
