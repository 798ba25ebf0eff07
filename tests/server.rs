//! End-to-end tests against a live event loop on a loopback port.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio_test::{assert_err, assert_ok};
use tokio_tungstenite::tungstenite::Message;

use imu_webapi::config::ServerConfig;
use imu_webapi::domain::TelemetryProvider;
use imu_webapi::sensor::FixedImu;
use imu_webapi::server::{ServerHandle, TelemetryServer};

const GET_TOPICS: [&str; 5] = [
    "/imu/raw",
    "/imu/real",
    "/imu/orientation",
    "/imu/mag_data",
    "/imu/debug",
];

fn start(imu: &Arc<FixedImu>, unknown_topic_reply: bool) -> (ServerHandle, SocketAddr) {
    let config = ServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        poll_interval: Duration::from_millis(10),
        unknown_topic_reply,
        ..ServerConfig::default()
    };
    let provider: Arc<dyn TelemetryProvider> = Arc::clone(imu) as Arc<dyn TelemetryProvider>;
    let handle = assert_ok!(TelemetryServer::new(config, provider).spawn());
    let Some(addr) = handle.local_addr() else {
        panic!("server did not bind");
    };
    (handle, addr)
}

async fn stop(handle: ServerHandle) {
    let stopping = tokio::task::spawn_blocking(move || handle.shutdown());
    assert_ok!(assert_ok!(stopping.await));
}

async fn get_text(client: &reqwest::Client, url: String) -> (reqwest::StatusCode, String) {
    let response = assert_ok!(client.get(url).send().await);
    let status = response.status();
    (status, assert_ok!(response.text().await))
}

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(addr: SocketAddr) -> Socket {
    let url = format!("ws://{addr}/");
    let (socket, _) = assert_ok!(tokio_tungstenite::connect_async(url).await);
    socket
}

async fn next_text(socket: &mut Socket) -> String {
    let reply = tokio::time::timeout(Duration::from_secs(2), socket.next());
    let next = assert_ok!(reply.await);
    let Some(Ok(message)) = next else {
        panic!("socket closed before a reply");
    };
    assert_ok!(message.to_text()).to_string()
}

#[tokio::test]
async fn every_get_topic_streams_chunked_text_json() {
    let imu = Arc::new(FixedImu::sample());
    let (handle, addr) = start(&imu, false);
    let client = reqwest::Client::new();

    for topic in GET_TOPICS {
        let response = assert_ok!(client.get(format!("http://{addr}{topic}")).send().await);
        assert_eq!(response.status(), reqwest::StatusCode::OK, "{topic}");
        let headers = response.headers();
        assert_eq!(
            headers.get("content-type").and_then(|v| v.to_str().ok()),
            Some("text/json"),
            "{topic}"
        );
        assert_eq!(
            headers.get("transfer-encoding").and_then(|v| v.to_str().ok()),
            Some("chunked"),
            "{topic}"
        );
        let body = assert_ok!(response.text().await);
        assert!(!body.is_empty(), "{topic}");
    }

    let (_, raw) = get_text(&client, format!("http://{addr}/imu/raw")).await;
    assert!(raw.starts_with("{\"data\": {accel_raw: [ 120,-340,16384 ]"));

    drop(client);
    stop(handle).await;
}

#[tokio::test]
async fn unmatched_requests_get_one_empty_404() {
    let imu = Arc::new(FixedImu::sample());
    let (handle, addr) = start(&imu, false);
    let client = reqwest::Client::new();

    let (status, body) = get_text(&client, format!("http://{addr}/imu/mag_calibrate")).await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, body) = get_text(&client, format!("http://{addr}/nowhere")).await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let response = assert_ok!(client.post(format!("http://{addr}/imu/raw")).send().await);
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    // The connection stays usable: exactly one response went out per request.
    let (status, _) = get_text(&client, format!("http://{addr}/imu/real")).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(imu.calibration_count(), 0);

    drop(client);
    stop(handle).await;
}

#[tokio::test]
async fn calibration_post_runs_once_per_request() {
    let imu = Arc::new(FixedImu::sample());
    let (handle, addr) = start(&imu, false);
    let client = reqwest::Client::new();

    for expected in 1..=2 {
        let response = assert_ok!(
            client
                .post(format!("http://{addr}/imu/mag_calibrate"))
                .send()
                .await
        );
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(assert_ok!(response.text().await).is_empty());
        assert_eq!(imu.calibration_count(), expected);
    }

    drop(client);
    stop(handle).await;
}

#[tokio::test]
async fn websocket_topics_answer_with_one_frame() {
    let imu = Arc::new(FixedImu::sample());
    let (handle, addr) = start(&imu, false);
    let mut socket = connect(addr).await;

    assert_ok!(socket.send(Message::text("/imu/mag_data")).await);
    let frame = next_text(&mut socket).await;
    let value: serde_json::Value = assert_ok!(serde_json::from_str(&frame));
    assert_eq!(value.pointer("/raw/mx"), Some(&serde_json::json!(210)));
    assert_eq!(value.pointer("/mag_bias/mz"), Some(&serde_json::json!(680)));
    assert_eq!(value.pointer("/mode"), Some(&serde_json::json!(1)));
    assert_eq!(imu.calibration_count(), 0);

    assert_ok!(socket.send(Message::text("/imu/mag_calibrate")).await);
    let frame = next_text(&mut socket).await;
    assert!(frame.starts_with("{\"raw\": {"));
    assert_eq!(imu.calibration_count(), 1);

    let client = reqwest::Client::new();
    let (_, http_debug) = get_text(&client, format!("http://{addr}/imu/debug")).await;
    assert_ok!(socket.send(Message::text("/imu/debug")).await);
    assert_eq!(next_text(&mut socket).await, http_debug);

    drop(client);
    drop(socket);
    stop(handle).await;
}

#[tokio::test]
async fn unknown_websocket_topic_is_ignored() {
    let imu = Arc::new(FixedImu::sample());
    let (handle, addr) = start(&imu, false);
    let mut socket = connect(addr).await;

    assert_ok!(socket.send(Message::text("/bogus")).await);
    let reply = tokio::time::timeout(Duration::from_millis(300), socket.next());
    assert_err!(reply.await);

    // Still open and serving.
    assert_ok!(socket.send(Message::text("/imu/orientation")).await);
    let frame = next_text(&mut socket).await;
    assert!(frame.contains("\"roll\": 1.25"));

    drop(socket);
    stop(handle).await;
}

#[tokio::test]
async fn unknown_websocket_topic_error_frame_when_enabled() {
    let imu = Arc::new(FixedImu::sample());
    let (handle, addr) = start(&imu, true);
    let mut socket = connect(addr).await;

    assert_ok!(socket.send(Message::text("/bogus")).await);
    let frame = next_text(&mut socket).await;
    let value: serde_json::Value = assert_ok!(serde_json::from_str(&frame));
    assert_eq!(value.pointer("/type"), Some(&serde_json::json!("error")));
    assert_eq!(value.pointer("/payload/code"), Some(&serde_json::json!(404)));

    drop(socket);
    stop(handle).await;
}

#[tokio::test]
async fn calibration_stalls_every_other_connection() {
    let imu = Arc::new(FixedImu::sample().with_calibration_delay(Duration::from_millis(600)));
    let (handle, addr) = start(&imu, false);
    let started = Instant::now();

    let calibrate = tokio::spawn(async move {
        let client = reqwest::Client::new();
        client
            .post(format!("http://{addr}/imu/mag_calibrate"))
            .send()
            .await
            .map(|response| response.status())
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let (a, b) = (reqwest::Client::new(), reqwest::Client::new());
    let (first, second) = tokio::join!(
        get_text(&a, format!("http://{addr}/imu/raw")),
        get_text(&b, format!("http://{addr}/imu/orientation")),
    );
    assert_eq!(first.0, reqwest::StatusCode::OK);
    assert_eq!(second.0, reqwest::StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(500));
    drop((a, b));

    let status = assert_ok!(assert_ok!(calibrate.await));
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(imu.calibration_count(), 1);

    stop(handle).await;
}
