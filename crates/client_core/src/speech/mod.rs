//! Text-to-speech playback for answers.
//!
//! Engines accept one [`Utterance`] at a time and report its lifecycle through
//! a callback: `Started` at most once, then exactly one of `Ended` or `Failed`.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::info;

mod command;

pub use command::{CommandSpeech, SpeechProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    /// Multiplier on the engine's normal speaking rate.
    pub rate: f32,
    /// Multiplier on the engine's normal pitch.
    pub pitch: f32,
}

impl Utterance {
    pub const NEUTRAL: f32 = 1.0;

    pub fn new(id: UtteranceId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            rate: Self::NEUTRAL,
            pitch: Self::NEUTRAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEventKind {
    Started,
    Ended,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEvent {
    pub utterance: UtteranceId,
    pub kind: SpeechEventKind,
}

impl SpeechEvent {
    pub fn started(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: SpeechEventKind::Started,
        }
    }

    pub fn ended(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: SpeechEventKind::Ended,
        }
    }

    pub fn failed(utterance: UtteranceId, reason: impl Into<String>) -> Self {
        Self {
            utterance,
            kind: SpeechEventKind::Failed(reason.into()),
        }
    }
}

/// Invoked from whatever thread the engine runs its playback on.
pub type SpeechCallback = Arc<dyn Fn(SpeechEvent) + Send + Sync>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis is not available")]
    Unsupported,
    #[error("failed to start speech program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait SpeechSynthesizer: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Stops the active utterance, if any. Its terminal event still fires.
    fn cancel(&self);

    fn speak(&self, utterance: Utterance, on_event: SpeechCallback) -> Result<(), SpeechError>;
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Box<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn speak(&self, utterance: Utterance, on_event: SpeechCallback) -> Result<(), SpeechError> {
        (**self).speak(utterance, on_event)
    }
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn speak(&self, utterance: Utterance, on_event: SpeechCallback) -> Result<(), SpeechError> {
        (**self).speak(utterance, on_event)
    }
}

/// Engine for hosts without any text-to-speech program.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSpeech;

impl SpeechSynthesizer for UnsupportedSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    fn cancel(&self) {}

    fn speak(&self, _utterance: Utterance, _on_event: SpeechCallback) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Picks the speech program to use: the explicit one when given and found,
/// otherwise the first platform default on `PATH`.
pub fn detect_speech_backend(
    runtime: Handle,
    program_override: Option<&str>,
) -> Box<dyn SpeechSynthesizer> {
    let program = match program_override {
        Some(name) => SpeechProgram::named(name),
        None => SpeechProgram::detect(),
    };
    match program {
        Some(program) => {
            info!(program = %program.path().display(), "speech playback enabled");
            Box::new(CommandSpeech::new(program, runtime))
        }
        None => {
            info!("no text-to-speech program found; speech playback disabled");
            Box::new(UnsupportedSpeech)
        }
    }
}
