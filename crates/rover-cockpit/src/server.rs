//! [`RoverServer`] – HTTP + WebSocket front door of the rover.
//!
//! Listens on `0.0.0.0:8080` (configurable via [`RoverServer::with_port`]).
//!
//! * WebSocket upgrades → permission check, then a [`session`].
//! * `GET /video` → permission check, then the multipart JPEG stream.
//! * Any other HTTP request → 200 OK with the embedded control page.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use rover_hal::HardwareGateway;
use rover_middleware::ServerContext;
use rover_types::RoverError;

use crate::auth::{AllowAll, AuthGate, PROTECTED_SCOPE};
use crate::{session, video};

/// Default TCP port for the control server.
pub const DEFAULT_PORT: u16 = 8080;

/// The compiled-in control page (HTML + CSS + JS).
const CONTROL_HTML: &str = include_str!("control.html");

// ---------------------------------------------------------------------------
// RoverServer
// ---------------------------------------------------------------------------

/// Lightweight HTTP + WebSocket server bridging browsers to the rover.
///
/// Every process-wide resource is injected: the [`ServerContext`] owns the
/// shared queues, the [`HardwareGateway`] answers telemetry reads, and the
/// [`AuthGate`] guards the protected surfaces.
pub struct RoverServer {
    shared: Shared,
    port: u16,
}

/// Per-connection handler state, shared by reference.
struct Shared {
    ctx: Arc<ServerContext>,
    gateway: Arc<dyn HardwareGateway>,
    auth: Arc<dyn AuthGate>,
    video_idle_timeout: Duration,
}

impl RoverServer {
    /// Create a server on the [`DEFAULT_PORT`] that grants every connection.
    pub fn new(ctx: Arc<ServerContext>, gateway: Arc<dyn HardwareGateway>) -> Self {
        Self {
            shared: Shared {
                ctx,
                gateway,
                auth: Arc::new(AllowAll),
                video_idle_timeout: video::VIDEO_IDLE_TIMEOUT,
            },
            port: DEFAULT_PORT,
        }
    }

    /// Override the listening port (builder-style).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Install a permission gate (builder-style).
    pub fn with_auth(mut self, auth: Arc<dyn AuthGate>) -> Self {
        self.shared.auth = auth;
        self
    }

    /// Override the video idle timeout (builder-style).
    pub fn with_video_idle_timeout(mut self, timeout: Duration) -> Self {
        self.shared.video_idle_timeout = timeout;
        self
    }

    /// Return the configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Bind and serve until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Transport`] if the TCP listener cannot bind.
    pub async fn run(self) -> Result<(), RoverError> {
        let (listener, addr) = self.listener().await?;
        info!(%addr, "rover control server listening");
        accept_loop(listener, Arc::new(self.shared)).await;
        Ok(())
    }

    /// Bind on the configured port and serve in a background task.
    ///
    /// Useful for tests and embedders that need the actual bound address
    /// (e.g. with port `0`).
    pub async fn bind(self) -> Result<ServerHandle, RoverError> {
        let (listener, addr) = self.listener().await?;
        info!(%addr, "rover control server listening");
        let shared = Arc::new(self.shared);
        let task = tokio::spawn(accept_loop(listener, shared));
        Ok(ServerHandle { addr, task })
    }

    async fn listener(&self) -> Result<(TcpListener, SocketAddr), RoverError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RoverError::Transport(format!("bind error on {addr}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| RoverError::Transport(format!("local_addr: {e}")))?;
        Ok((listener, addr))
    }
}

/// A server detached into a background task.
pub struct ServerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The actual bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections.
    pub fn abort(&self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// Accept loop and per-connection routing
// ---------------------------------------------------------------------------

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, shared).await {
                        warn!(%peer, error = %e, "client connection ended with error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "accept error");
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    shared: Arc<Shared>,
) -> Result<(), RoverError> {
    // Peek at the request head to route without consuming it, so the
    // WebSocket handshaker still sees the full HTTP request.
    let mut buf = [0u8; 1024];
    let n = stream
        .peek(&mut buf)
        .await
        .map_err(|e| RoverError::Transport(format!("peek error from {peer}: {e}")))?;
    let head = String::from_utf8_lossy(&buf[..n]);

    let request_line = head.lines().next().unwrap_or("");
    let target = request_target(request_line);
    let path = target.split('?').next().unwrap_or("/");
    let token = query_param(target, "token");

    if is_ws_upgrade(&head) {
        if let Err(e) = shared.auth.check(token.as_deref(), PROTECTED_SCOPE) {
            warn!(%peer, error = %e, "websocket connection denied");
            return deny(stream).await;
        }
        return session::run(
            stream,
            peer,
            Arc::clone(&shared.ctx),
            Arc::clone(&shared.gateway),
        )
        .await;
    }

    if path == "/video" {
        if let Err(e) = shared.auth.check(token.as_deref(), PROTECTED_SCOPE) {
            warn!(%peer, error = %e, "video stream denied");
            return deny(stream).await;
        }
        video::stream(stream, &shared.ctx.frames, shared.video_idle_timeout).await;
        return Ok(());
    }

    serve_html(stream).await
}

/// Serve the embedded control page.
async fn serve_html(mut stream: TcpStream) -> Result<(), RoverError> {
    let body = CONTROL_HTML;
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        body.len(),
        body
    );
    stream
        .write_all(response.as_bytes())
        .await
        .map_err(|e| RoverError::Transport(format!("HTTP write error: {e}")))?;
    Ok(())
}

/// Reject a connection whose permission check failed.
async fn deny(mut stream: TcpStream) -> Result<(), RoverError> {
    let response = "HTTP/1.1 403 Forbidden\r\n\
                    Content-Length: 0\r\n\
                    Connection: close\r\n\
                    \r\n";
    let _ = stream.write_all(response.as_bytes()).await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Request-head helpers
// ---------------------------------------------------------------------------

/// The request target (path plus query) of an HTTP request line.
fn request_target(request_line: &str) -> &str {
    request_line.split_whitespace().nth(1).unwrap_or("/")
}

/// Extract one query parameter from a request target.
fn query_param(target: &str, key: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

/// Whether the request head asks for a WebSocket upgrade.
fn is_ws_upgrade(head: &str) -> bool {
    head.lines().any(|line| {
        let line = line.to_lowercase();
        line.starts_with("upgrade:") && line.contains("websocket")
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
