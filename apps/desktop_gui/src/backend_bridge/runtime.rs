//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{AnswerTransport, ApiClient};
use crossbeam_channel::{Receiver, Sender};
use tokio::runtime::Handle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Drains `cmd_rx` on a dedicated thread, running each command on `runtime`.
/// Results come back on `ui_tx`; `repaint` wakes the UI when one lands.
pub fn launch(
    runtime: Handle,
    client: ApiClient,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    repaint: impl Fn() + Clone + Send + 'static,
) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            tracing::debug!(command = cmd.name(), "backend command received");
            let client = client.clone();
            let ui_tx = ui_tx.clone();
            let repaint = repaint.clone();
            runtime.spawn(async move {
                let event = match cmd {
                    BackendCommand::SubmitQuestion(request) => {
                        UiEvent::SubmissionFinished(client.request_answer(&request).await)
                    }
                    BackendCommand::LoadCatalog => match client.list_exams().await {
                        Ok(catalog) => UiEvent::CatalogLoaded(catalog),
                        Err(err) => {
                            tracing::warn!(%err, "could not load exam catalog; using built-in lists");
                            return;
                        }
                    },
                };
                if ui_tx.send(event).is_err() {
                    tracing::debug!("ui closed before backend result arrived");
                }
                repaint();
            });
        }
        tracing::debug!("backend command queue closed");
    });
}
