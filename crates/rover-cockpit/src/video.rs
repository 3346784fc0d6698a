//! Continuous multipart JPEG streaming of the shared frame buffer.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use rover_middleware::FrameBuffer;

/// The fixed multipart boundary token the frontend's `<img>` tag expects.
pub const BOUNDARY: &str = "ffserver";

/// Default idle timeout: how long the handler waits for a fresh frame
/// before ending the stream.
pub const VIDEO_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve frames from `frames` over `transport` until the client disconnects
/// or no frame arrives within `idle_timeout`.
///
/// Each frame is written as one multipart chunk: boundary line,
/// `Content-Type: image/jpeg`, blank line, the raw bytes, trailing CRLF.  On
/// idle timeout the closing delimiter is written and the stream ends; on a
/// write failure (client disconnect) the handler ends silently.  The handler
/// never propagates a fault to its caller.
pub async fn stream<S>(mut transport: S, frames: &FrameBuffer, idle_timeout: Duration)
where
    S: AsyncWrite + Unpin,
{
    let header = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: multipart/x-mixed-replace;boundary={BOUNDARY}\r\n\
         Connection: close\r\n\
         \r\n"
    );
    if transport.write_all(header.as_bytes()).await.is_err() {
        return;
    }

    info!("start streaming camera images");

    loop {
        match frames.take(idle_timeout).await {
            Some(jpg) => {
                let mut chunk = Vec::with_capacity(jpg.len() + 64);
                chunk.extend_from_slice(
                    format!("--{BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n").as_bytes(),
                );
                chunk.extend_from_slice(&jpg);
                chunk.extend_from_slice(b"\r\n");
                if transport.write_all(&chunk).await.is_err() {
                    // Client went away; nothing to clean up.
                    debug!("video client disconnected");
                    break;
                }
            }
            None => {
                // No frame within the idle window; end the stream cleanly.
                let _ = transport
                    .write_all(format!("--{BOUNDARY}--\r\n").as_bytes())
                    .await;
                let _ = transport.shutdown().await;
                break;
            }
        }
    }

    info!("stopped streaming camera images");
}
