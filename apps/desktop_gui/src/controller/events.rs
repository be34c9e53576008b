//! Events delivered to the UI thread from the backend worker and the speech engine.

use client_core::{AnswerError, SpeechEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use shared::protocol::ExamCatalog;

pub enum UiEvent {
    SubmissionFinished(Result<String, AnswerError>),
    CatalogLoaded(ExamCatalog),
    Speech(SpeechEvent),
}

/// Queue into the UI thread. Unbounded so producers on the tokio runtime
/// never block and terminal events are never dropped.
pub fn ui_event_channel() -> (Sender<UiEvent>, Receiver<UiEvent>) {
    unbounded()
}
