//! One WebSocket client session and its per-connection broadcasters.
//!
//! A session owns exactly one client transport.  On open it starts three
//! tasks bound to a single outbound writer channel:
//!
//! - the **writer**, which forwards channel messages to the WebSocket sink;
//! - the **telemetry broadcaster**, which pushes one status message per
//!   second;
//! - the **log broadcaster**, which relays the shared log queue.
//!
//! The inbound loop then reads client messages until the transport closes.
//! Teardown is by observation, not signal: when the session ends, its writer
//! channel closes, and each broadcaster stops the next time it tries to
//! send.  The log broadcaster in particular parks on an empty queue and only
//! notices a dead transport after the next log line arrives; that leak
//! window is deliberate.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tracing::{debug, info};
use uuid::Uuid;

use rover_hal::HardwareGateway;
use rover_middleware::{LogQueue, ServerContext};
use rover_types::{CommandBatch, RoverError, ServerMessage};

/// How often the telemetry broadcaster pushes a status message.
pub const TELEMETRY_PERIOD: Duration = Duration::from_secs(1);

/// Accept the WebSocket handshake and run the session to completion.
///
/// Returns when the client sends the literal `close` token, closes the
/// transport, or the connection errors.  Transport faults are converted into
/// a clean return; they never propagate past this session.
pub async fn run(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Arc<ServerContext>,
    gateway: Arc<dyn HardwareGateway>,
) -> Result<(), RoverError> {
    let ws = accept_async(stream)
        .await
        .map_err(|e| RoverError::Transport(format!("WS handshake from {peer}: {e}")))?;

    let session = Uuid::new_v4();
    info!(%session, %peer, "open websocket connection");

    let (ws_tx, mut ws_rx) = ws.split();
    let (outbound, outbound_rx) = mpsc::unbounded_channel::<Message>();

    tokio::spawn(write_outbound(ws_tx, outbound_rx));
    tokio::spawn(broadcast_telemetry(
        Arc::clone(&gateway),
        outbound.clone(),
        session,
    ));
    tokio::spawn(broadcast_logs(Arc::clone(&ctx), outbound.clone(), session));

    // Inbound protocol loop.
    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if text.as_str() == "close" {
                    let _ = outbound.send(Message::Close(None));
                    break;
                }
                handle_text(text.as_str(), &ctx, session);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%session, error = %e, "websocket connection error");
                break;
            }
        }
    }

    // Dropping `outbound` lets the writer drain and exit; the broadcasters
    // then stop on their next send.
    info!(%session, %peer, "closed websocket connection");
    Ok(())
}

/// Parse one inbound text message: a `command` object becomes a batch on the
/// shared queue, anything else is logged and dropped.
fn handle_text(text: &str, ctx: &ServerContext, session: Uuid) {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        info!(%session, message = %text, "unrecognized message");
        return;
    };
    let Some(command) = value.get("command") else {
        info!(%session, message = %text, "unrecognized message");
        return;
    };
    match CommandBatch::from_value(command) {
        Ok(batch) => ctx.commands.push(batch),
        Err(e) => info!(%session, error = %e, "malformed command payload"),
    }
}

/// Forward outbound channel messages to the WebSocket sink until either side
/// goes away.
async fn write_outbound(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = outbound.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if sink.send(msg).await.is_err() || closing {
            break;
        }
    }
    // Dropping the receiver is what the broadcasters observe as closure.
}

/// Push one status message per [`TELEMETRY_PERIOD`] until the outbound
/// channel closes.
async fn broadcast_telemetry(
    gateway: Arc<dyn HardwareGateway>,
    outbound: mpsc::UnboundedSender<Message>,
    session: Uuid,
) {
    info!(%session, "start sending status messages");
    let mut ticks = interval(TELEMETRY_PERIOD);
    loop {
        ticks.tick().await;
        let snapshot = gateway.snapshot().await;
        let Ok(json) = serde_json::to_string(&ServerMessage::Status(snapshot)) else {
            continue;
        };
        if outbound.send(Message::Text(json.into())).is_err() {
            break;
        }
    }
    info!(%session, "stopped sending status messages");
}

/// Relay shared log lines until the outbound channel closes.
///
/// The dequeue blocks with no timeout, so liveness is only checked after an
/// item arrives; a session that closed while the queue was idle keeps this
/// task parked until the next log line is emitted.
async fn broadcast_logs(
    ctx: Arc<ServerContext>,
    outbound: mpsc::UnboundedSender<Message>,
    session: Uuid,
) {
    info!(%session, "start sending log messages");
    let logs: &LogQueue = &ctx.logs;
    loop {
        let line = logs.pop().await;
        let message = ServerMessage::Log(format!("Log: {line}"));
        let Ok(json) = serde_json::to_string(&message) else {
            continue;
        };
        if outbound.send(Message::Text(json.into())).is_err() {
            break;
        }
    }
    info!(%session, "stopped sending log messages");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ServerContext {
        ServerContext::new()
    }

    #[test]
    fn command_message_is_queued_in_document_order() {
        let ctx = ctx();
        handle_text(
            r#"{"command": {"motors": "move_forward", "buzzer": true}}"#,
            &ctx,
            Uuid::new_v4(),
        );
        let batch = ctx.commands.try_pop().expect("batch queued");
        assert_eq!(batch.names(), vec!["motors", "buzzer"]);
        assert_eq!(
            batch.iter().nth(1).unwrap(),
            &("buzzer".to_string(), json!(true))
        );
    }

    #[test]
    fn invalid_json_is_dropped() {
        let ctx = ctx();
        handle_text("not json at all", &ctx, Uuid::new_v4());
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn message_without_command_field_is_dropped() {
        let ctx = ctx();
        handle_text(r#"{"telemetry": "please"}"#, &ctx, Uuid::new_v4());
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn non_object_command_payload_is_dropped() {
        let ctx = ctx();
        handle_text(r#"{"command": ["buzzer"]}"#, &ctx, Uuid::new_v4());
        assert!(ctx.commands.is_empty());
    }
}
