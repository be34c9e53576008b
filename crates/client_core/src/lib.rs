//! Client side of the physics tutor: the answer form controller, the HTTP
//! transport it submits through, and the speech engines it plays answers on.

pub mod api;
pub mod controller;
pub mod speech;

pub use api::{AnswerError, AnswerTransport, ApiClient, UNKNOWN_SERVER_ERROR};
pub use controller::{AnswerController, FormInputs, FormView};
pub use speech::{
    detect_speech_backend, CommandSpeech, SpeechCallback, SpeechError, SpeechEvent,
    SpeechEventKind, SpeechProgram, SpeechSynthesizer, UnsupportedSpeech, Utterance, UtteranceId,
};
