//! End-to-end tests for the rover control server.
//!
//! Each test wires the real stack — SimGateway, ServerContext, dispatcher
//! drain loop, RoverServer on an ephemeral port — and talks to it with a
//! real WebSocket or TCP client.
//!
//! Run: `cargo test -p rover-cockpit --test e2e`

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use rover_cockpit::{RoverServer, ServerHandle, SharedToken};
use rover_hal::SimGateway;
use rover_middleware::ServerContext;
use rover_runtime::CommandDispatcher;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Bind a full stack on an ephemeral port and return its pieces.
async fn start_stack() -> (Arc<SimGateway>, Arc<ServerContext>, ServerHandle) {
    let gateway = Arc::new(SimGateway::new());
    let ctx = Arc::new(ServerContext::new());

    let dispatcher = CommandDispatcher::new(Arc::clone(&gateway) as _);
    tokio::spawn(dispatcher.run(Arc::clone(&ctx)));

    let handle = RoverServer::new(Arc::clone(&ctx), Arc::clone(&gateway) as _)
        .with_port(0)
        .with_video_idle_timeout(Duration::from_millis(300))
        .bind()
        .await
        .expect("server must bind");

    (gateway, ctx, handle)
}

async fn connect_ws(handle: &ServerHandle) -> WsClient {
    let url = format!("ws://{}/ws", handle.addr());
    let (ws, _) = connect_async(&url).await.expect("ws connect");
    ws
}

/// Read messages until one satisfies `pred` or the deadline passes.
async fn wait_for_message(ws: &mut WsClient, pred: impl Fn(&Value) -> bool) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let msg = tokio::time::timeout(remaining, ws.next())
            .await
            .expect("timed out waiting for a matching message")
            .expect("connection ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            let value: Value = serde_json::from_str(text.as_str()).expect("valid json");
            if pred(&value) {
                return value;
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn buzzer_command_reaches_hardware_and_telemetry_reports_it() {
    let (gateway, _ctx, handle) = start_stack().await;
    let mut ws = connect_ws(&handle).await;

    ws.send(Message::Text(r#"{"command": {"buzzer": true}}"#.into()))
        .await
        .unwrap();

    // The dispatcher applies the batch...
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !gateway.buzzer_on() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "buzzer command never reached the gateway"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // ...and the next status message reflects the new state.
    let status = wait_for_message(&mut ws, |v| {
        v.get("status")
            .and_then(|s| s.get("buzzer_on"))
            .and_then(Value::as_bool)
            == Some(true)
    })
    .await;
    assert!(status["status"]["distance_sensor_value"].is_number());
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_log_lines_are_relayed_to_the_client() {
    let (_gateway, ctx, handle) = start_stack().await;
    let mut ws = connect_ws(&handle).await;

    ctx.logs.push("sensors calibrated".to_string());

    let log = wait_for_message(&mut ws, |v| v.get("log").is_some()).await;
    assert_eq!(log["log"], "Log: sensors calibrated");
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_command_changes_no_hardware_state() {
    let (gateway, ctx, handle) = start_stack().await;
    let mut ws = connect_ws(&handle).await;

    ws.send(Message::Text(r#"{"command": {"dance": 1}}"#.into()))
        .await
        .unwrap();

    // Wait until the dispatcher has drained the queue, then a little longer.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !ctx.commands.is_empty() {
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!gateway.buzzer_on());
    assert_eq!(gateway.motor_action(), rover_types::MotorAction::Stop);
    assert_eq!(gateway.reboot_requests(), 0);
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn close_token_ends_the_session() {
    let (_gateway, _ctx, handle) = start_stack().await;
    let mut ws = connect_ws(&handle).await;

    ws.send(Message::Text("close".into())).await.unwrap();

    // The server answers with a close frame and the stream ends.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, ws.next())
            .await
            .expect("session never closed")
        {
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(_)) => break,
        }
    }
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn video_endpoint_streams_multipart_jpeg() {
    let (_gateway, ctx, handle) = start_stack().await;

    let mut stream = TcpStream::connect(handle.addr()).await.unwrap();
    stream
        .write_all(b"GET /video HTTP/1.1\r\nHost: rover\r\n\r\n")
        .await
        .unwrap();

    ctx.frames.put(vec![0xFF, 0xD8, 0x55, 0xFF, 0xD9]);

    // The handler writes the frame then ends on the short idle timeout, so
    // read_to_end terminates.
    let mut body = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut body))
        .await
        .expect("video stream must terminate")
        .unwrap();

    let text = String::from_utf8_lossy(&body);
    assert!(text.starts_with("HTTP/1.1 200 OK"));
    assert!(text.contains("multipart/x-mixed-replace;boundary=ffserver"));
    assert!(text.contains("Content-Type: image/jpeg"));
    assert!(body.windows(5).any(|w| w == [0xFF, 0xD8, 0x55, 0xFF, 0xD9]));
    assert!(text.trim_end().ends_with("--ffserver--"));
    handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_token_gate_rejects_and_admits() {
    let gateway = Arc::new(SimGateway::new());
    let ctx = Arc::new(ServerContext::new());
    let handle = RoverServer::new(Arc::clone(&ctx), gateway)
        .with_port(0)
        .with_auth(Arc::new(SharedToken::new("secret")))
        .bind()
        .await
        .unwrap();

    // No token: the upgrade is refused before the handshake completes.
    let denied = connect_async(format!("ws://{}/ws", handle.addr())).await;
    assert!(denied.is_err(), "connection without token must be refused");

    // Correct token: the session opens normally.
    let (mut ws, _) = connect_async(format!("ws://{}/ws?token=secret", handle.addr()))
        .await
        .expect("token-bearing connection must be admitted");
    ws.close(None).await.ok();
    handle.abort();
}
