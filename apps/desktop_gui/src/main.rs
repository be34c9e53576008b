use std::sync::Arc;

use clap::Parser;
use client_core::{detect_speech_backend, AnswerController, ApiClient, SpeechCallback};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::{ui_event_channel, UiEvent};
use ui::TutorApp;

const APP_TITLE: &str = "Physics Tutor";

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "TUTOR_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    server_url: String,
    /// Text-to-speech program to use instead of the platform default.
    #[arg(long, env = "TUTOR_SPEECH_PROGRAM")]
    speech_program: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let client = ApiClient::new(&args.server_url).map_err(|err| {
        tracing::error!(server_url = %args.server_url, %err, "invalid server url");
        eframe::Error::AppCreation(Box::new(err))
    })?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            tracing::error!("failed to build backend runtime: {err}");
            eframe::Error::AppCreation(Box::new(err))
        })?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = ui_event_channel();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([480.0, 420.0]),
        ..Default::default()
    };
    let handle = runtime.handle().clone();
    let result = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let repaint = move || ctx.request_repaint();
            backend_bridge::runtime::launch(
                handle.clone(),
                client,
                cmd_rx,
                ui_tx.clone(),
                repaint.clone(),
            );

            let on_speech_event: SpeechCallback = Arc::new(move |event| {
                if ui_tx.send(UiEvent::Speech(event)).is_err() {
                    tracing::debug!("ui closed before speech event arrived");
                }
                repaint();
            });
            let speech = detect_speech_backend(handle, args.speech_program.as_deref());
            let controller = AnswerController::new(speech, on_speech_event);
            Ok(Box::new(TutorApp::new(controller, cmd_tx, ui_rx)))
        }),
    );

    runtime.shutdown_background();
    result
}
