//! `rover-cockpit` – The teleoperation web server.
//!
//! Boots a lightweight HTTP + WebSocket server (default port `8080`) that:
//!
//! 1. **Serves** the embedded control page at every plain HTTP path.
//!
//! 2. **Upgrades** WebSocket requests into a [`session`]: an inbound command
//!    loop plus a per-connection telemetry broadcaster and log broadcaster,
//!    all bound to one outbound writer channel.
//!
//! 3. **Streams** the live camera feed at `GET /video` as a continuous
//!    `multipart/x-mixed-replace` JPEG stream with an idle timeout.
//!
//! Both the WebSocket and the video surface are gated by an [`AuthGate`]
//! check for the `"protected"` scope before any handler starts.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rover_hal::SimGateway;
//! use rover_middleware::ServerContext;
//! use rover_cockpit::RoverServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Arc::new(ServerContext::new());
//!     let gateway = Arc::new(SimGateway::new());
//!     RoverServer::new(ctx, gateway)
//!         .run()
//!         .await
//!         .expect("rover server failed");
//! }
//! ```
//!
//! [`AuthGate`]: auth::AuthGate

pub mod auth;
pub mod server;
pub mod session;
pub mod video;

pub use auth::{AllowAll, AuthGate, SharedToken, PROTECTED_SCOPE};
pub use server::{RoverServer, ServerHandle, DEFAULT_PORT};
