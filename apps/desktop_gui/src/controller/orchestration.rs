//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL_MESSAGE: &str = "UI command queue is full; please retry";
pub const WORKER_GONE_MESSAGE: &str = "Backend worker is not running; restart the app";

/// Queues `cmd`, returning the user-facing reason when it could not be queued.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(QUEUE_FULL_MESSAGE.to_string()),
        Err(TrySendError::Disconnected(_)) => Err(WORKER_GONE_MESSAGE.to_string()),
    }
}
