//! Serial command dispatch from the shared queue to the hardware gateway.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use rover_hal::HardwareGateway;
use rover_middleware::ServerContext;
use rover_types::{Command, CommandBatch, CommandParseError};

/// Routes command batches to the [`HardwareGateway`], one batch at a time.
///
/// The dispatcher's drain loop is the only mutator of gateway actuator
/// state, which gives at-most-one-command-applies-at-a-time ordering for the
/// synchronous portion of every command.  Slow actuator moves (camera
/// steps, LED updates) are spawned into a [`JoinSet`] instead of awaited
/// inline, so a sluggish servo never delays the next batch; the set is
/// reaped between batches and aborts any stragglers when the dispatcher is
/// dropped.
pub struct CommandDispatcher {
    gateway: Arc<dyn HardwareGateway>,
    background: JoinSet<()>,
}

impl CommandDispatcher {
    pub fn new(gateway: Arc<dyn HardwareGateway>) -> Self {
        Self {
            gateway,
            background: JoinSet::new(),
        }
    }

    /// Apply one batch in document order and return its unconsumed entries.
    ///
    /// Entries with an unknown name are collected and returned; they are the
    /// dispatcher's reporting channel only and are never surfaced to the
    /// client.  Entries with a known name but invalid parameters fault that
    /// single command (logged) without aborting the batch, and do not appear
    /// in the returned set.
    pub async fn dispatch(&mut self, batch: CommandBatch) -> CommandBatch {
        let mut unconsumed = CommandBatch::new();

        for (name, parameters) in batch {
            match Command::parse(&name, &parameters) {
                Ok(command) if command.is_background() => {
                    let gateway = Arc::clone(&self.gateway);
                    self.background.spawn(async move {
                        if let Err(e) = gateway.execute(command).await {
                            warn!(error = %e, "background actuator move failed");
                        }
                    });
                }
                Ok(command) => {
                    if let Err(e) = self.gateway.execute(command).await {
                        warn!(command = %name, error = %e, "command failed");
                    }
                }
                Err(CommandParseError::UnknownName(_)) => {
                    unconsumed.push(name, parameters);
                }
                Err(e @ CommandParseError::InvalidParameters { .. }) => {
                    warn!(error = %e, "dropping malformed command");
                }
            }
        }

        unconsumed
    }

    /// Drain the shared command queue forever.
    ///
    /// Batches are processed in submission order, but a command's physical
    /// effect (its background move) may complete after the next batch has
    /// already started.
    pub async fn run(mut self, ctx: Arc<ServerContext>) {
        info!("command dispatch loop started");
        loop {
            let batch = ctx.commands.pop().await;
            self.reap_background();

            debug!(commands = ?batch.names(), "dispatching batch");
            let unconsumed = self.dispatch(batch).await;
            if !unconsumed.is_empty() {
                debug!(unknown = ?unconsumed.names(), "unknown hardware commands");
            }
        }
    }

    /// Await every outstanding background move.  Used on teardown and by
    /// tests that need the moves' effects to be visible.
    pub async fn join_background(&mut self) {
        while let Some(result) = self.background.join_next().await {
            if let Err(e) = result
                && !e.is_cancelled()
            {
                warn!(error = %e, "background actuator task panicked");
            }
        }
    }

    /// Collect finished background handles without waiting on unfinished
    /// ones.
    fn reap_background(&mut self) {
        while let Some(result) = self.background.try_join_next() {
            if let Err(e) = result
                && !e.is_cancelled()
            {
                warn!(error = %e, "background actuator task panicked");
            }
        }
    }

    /// Number of background moves still in flight.
    pub fn background_len(&self) -> usize {
        self.background.len()
    }
}
