//! The answer form: question input, exam and level selectors, submit/speak/stop
//! controls, a status line and the answer area.
//!
//! Hosts bind their widgets to [`FormInputs`] and render [`FormView`]; every
//! user action goes through an [`AnswerController`] method.

use shared::{
    domain::{Exam, Level},
    protocol::AnswerRequest,
};
use tracing::{debug, info, warn};

use crate::{
    api::{AnswerError, AnswerTransport},
    speech::{SpeechCallback, SpeechEvent, SpeechEventKind, SpeechSynthesizer, Utterance, UtteranceId},
};

pub const PROMPT_STATUS: &str = "Please type a physics question first.";
pub const GENERATING_STATUS: &str = "Generating answer...";
pub const READY_STATUS: &str = "Answer ready. Click \"Speak Answer\" to hear it.";
pub const SPEECH_UNSUPPORTED_STATUS: &str = "Speech synthesis is not supported on this system.";
pub const SPEAKING_STATUS: &str = "Speaking...";
pub const FINISHED_STATUS: &str = "Finished speaking.";
pub const SPEECH_FAILED_STATUS: &str = "Speech playback failed.";
pub const STOPPED_STATUS: &str = "Speech stopped.";

/// User-editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub question: String,
    pub exam: Exam,
    pub level: Level,
}

/// Everything the controller displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub status: String,
    pub answer: String,
    pub submit_enabled: bool,
    pub speak_enabled: bool,
    pub stop_enabled: bool,
}

impl Default for FormView {
    fn default() -> Self {
        Self {
            status: String::new(),
            answer: String::new(),
            submit_enabled: true,
            speak_enabled: false,
            stop_enabled: false,
        }
    }
}

pub struct AnswerController<S> {
    inputs: FormInputs,
    view: FormView,
    latest_answer: Option<String>,
    speech: S,
    on_speech_event: SpeechCallback,
    active_utterance: Option<UtteranceId>,
    next_utterance: u64,
}

impl<S: SpeechSynthesizer> AnswerController<S> {
    /// `on_speech_event` must route events back into
    /// [`handle_speech_event`](Self::handle_speech_event) on the host's
    /// event loop.
    pub fn new(speech: S, on_speech_event: SpeechCallback) -> Self {
        Self {
            inputs: FormInputs::default(),
            view: FormView::default(),
            latest_answer: None,
            speech,
            on_speech_event,
            active_utterance: None,
            next_utterance: 0,
        }
    }

    pub fn inputs(&self) -> &FormInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut FormInputs {
        &mut self.inputs
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub fn latest_answer(&self) -> Option<&str> {
        self.latest_answer.as_deref()
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    pub fn is_speaking(&self) -> bool {
        self.active_utterance.is_some()
    }

    /// Validates the question and locks the submit control. `None` means the
    /// question was blank and nothing should be sent.
    pub fn begin_submission(&mut self) -> Option<AnswerRequest> {
        let request =
            match AnswerRequest::new(&self.inputs.question, self.inputs.exam, self.inputs.level) {
                Ok(request) => request,
                Err(_) => {
                    self.view.status = PROMPT_STATUS.to_string();
                    return None;
                }
            };

        self.view.status = GENERATING_STATUS.to_string();
        self.view.submit_enabled = false;
        info!(exam = %request.exam, level = %request.level, "submitting question");
        Some(request)
    }

    /// Applies the outcome of a submission. Always re-enables submit.
    pub fn complete_submission(&mut self, result: Result<String, AnswerError>) {
        match result {
            Ok(answer) => {
                self.view.answer = answer.clone();
                self.latest_answer = Some(answer);
                self.view.speak_enabled = true;
                self.view.status = READY_STATUS.to_string();
            }
            Err(err) => {
                warn!(%err, "answer request failed");
                self.view.status = format!("Error: {err}");
            }
        }
        self.view.submit_enabled = true;
    }

    pub async fn submit_question<T>(&mut self, transport: &T)
    where
        T: AnswerTransport + ?Sized,
    {
        let Some(request) = self.begin_submission() else {
            return;
        };
        let result = transport.request_answer(&request).await;
        self.complete_submission(result);
    }

    pub fn speak_answer(&mut self) {
        let Some(text) = self
            .latest_answer
            .clone()
            .filter(|answer| !answer.is_empty())
        else {
            return;
        };

        if !self.speech.is_supported() {
            self.view.status = SPEECH_UNSUPPORTED_STATUS.to_string();
            return;
        }

        self.speech.cancel();
        self.next_utterance += 1;
        let id = UtteranceId(self.next_utterance);
        self.active_utterance = Some(id);

        let utterance = Utterance::new(id, text);
        if let Err(err) = self.speech.speak(utterance, self.on_speech_event.clone()) {
            self.handle_speech_event(SpeechEvent::failed(id, err.to_string()));
        }
    }

    pub fn stop_speaking(&mut self) {
        if self.speech.is_supported() {
            self.speech.cancel();
            self.view.status = STOPPED_STATUS.to_string();
        }
        self.active_utterance = None;
        self.view.stop_enabled = false;
    }

    pub fn handle_speech_event(&mut self, event: SpeechEvent) {
        // Cancelled utterances still report a terminal event; only the
        // current one drives the form.
        if self.active_utterance != Some(event.utterance) {
            debug!(utterance = %event.utterance, kind = ?event.kind, "ignoring stale speech event");
            return;
        }

        match event.kind {
            SpeechEventKind::Started => {
                self.view.status = SPEAKING_STATUS.to_string();
                self.view.stop_enabled = true;
            }
            SpeechEventKind::Ended => {
                self.active_utterance = None;
                self.view.status = FINISHED_STATUS.to_string();
                self.view.stop_enabled = false;
            }
            SpeechEventKind::Failed(reason) => {
                warn!(utterance = %event.utterance, %reason, "speech playback failed");
                self.active_utterance = None;
                self.view.status = SPEECH_FAILED_STATUS.to_string();
                self.view.stop_enabled = false;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
