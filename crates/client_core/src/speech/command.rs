//! Speech through an external text-to-speech program, one child process per
//! utterance.

use std::{
    env,
    path::{Path, PathBuf},
    process::Stdio,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::{io::AsyncWriteExt, process::Command, runtime::Handle, sync::oneshot};
use tracing::{debug, warn};

use super::{SpeechCallback, SpeechError, SpeechEvent, SpeechSynthesizer, Utterance, UtteranceId};

const DEFAULT_WORDS_PER_MINUTE: f32 = 175.0;
const ESPEAK_DEFAULT_PITCH: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramKind {
    Espeak,
    Say,
    PowerShell,
    Plain,
}

/// A text-to-speech program. Every kind receives the text on stdin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechProgram {
    path: PathBuf,
    kind: ProgramKind,
    extra_args: Vec<String>,
}

impl SpeechProgram {
    pub fn detect() -> Option<Self> {
        default_candidates()
            .iter()
            .find_map(|name| Self::named(name))
    }

    /// Resolves `name` on `PATH` (or as a path) and infers how to drive it.
    pub fn named(name: &str) -> Option<Self> {
        let path = find_program(name)?;
        Some(Self {
            kind: kind_for(&path),
            path,
            extra_args: Vec::new(),
        })
    }

    /// A program that reads text on stdin and takes fixed arguments.
    pub fn custom(
        path: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: ProgramKind::Plain,
            extra_args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn args(&self, utterance: &Utterance) -> Vec<String> {
        let wpm = (DEFAULT_WORDS_PER_MINUTE * utterance.rate)
            .round()
            .clamp(80.0, 450.0);
        match self.kind {
            ProgramKind::Espeak => {
                let pitch = (ESPEAK_DEFAULT_PITCH * utterance.pitch)
                    .round()
                    .clamp(0.0, 99.0);
                vec![
                    "--stdin".to_string(),
                    "-s".to_string(),
                    format!("{wpm}"),
                    "-p".to_string(),
                    format!("{pitch}"),
                ]
            }
            // `say` reads stdin when given no message; it has no pitch control.
            ProgramKind::Say => vec!["-r".to_string(), format!("{wpm}")],
            ProgramKind::PowerShell => {
                let rate = ((utterance.rate - 1.0) * 10.0).round().clamp(-10.0, 10.0);
                let script = format!(
                    "Add-Type -AssemblyName System.Speech; \
                     $synth = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
                     $synth.Rate = {rate}; \
                     $synth.Speak([Console]::In.ReadToEnd());"
                );
                vec![
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Command".to_string(),
                    script,
                ]
            }
            ProgramKind::Plain => self.extra_args.clone(),
        }
    }
}

fn default_candidates() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["say"]
    } else if cfg!(target_os = "windows") {
        &["powershell"]
    } else {
        &["espeak-ng", "espeak"]
    }
}

fn kind_for(path: &Path) -> ProgramKind {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if stem == "say" {
        ProgramKind::Say
    } else if stem.contains("espeak") {
        ProgramKind::Espeak
    } else if stem == "powershell" || stem == "pwsh" {
        ProgramKind::PowerShell
    } else {
        ProgramKind::Plain
    }
}

fn find_program(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let search_path = env::var_os("PATH")?;
    env::split_paths(&search_path).find_map(|dir| {
        let direct = dir.join(name);
        if direct.is_file() {
            return Some(direct);
        }
        if cfg!(target_os = "windows") {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

struct ActivePlayback {
    id: UtteranceId,
    // Dropping the sender stops the child.
    _stop: oneshot::Sender<()>,
}

type PlaybackSlot = Arc<Mutex<Option<ActivePlayback>>>;

fn lock_slot(slot: &Mutex<Option<ActivePlayback>>) -> MutexGuard<'_, Option<ActivePlayback>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct CommandSpeech {
    program: SpeechProgram,
    runtime: Handle,
    active: PlaybackSlot,
}

impl CommandSpeech {
    pub fn new(program: SpeechProgram, runtime: Handle) -> Self {
        Self {
            program,
            runtime,
            active: Arc::new(Mutex::new(None)),
        }
    }
}

impl SpeechSynthesizer for CommandSpeech {
    fn is_supported(&self) -> bool {
        true
    }

    fn cancel(&self) {
        if let Some(playback) = lock_slot(&self.active).take() {
            debug!(utterance = %playback.id, "cancelling speech");
        }
    }

    fn speak(&self, utterance: Utterance, on_event: SpeechCallback) -> Result<(), SpeechError> {
        self.cancel();

        let mut command = Command::new(self.program.path());
        command
            .args(self.program.args(&utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = {
            let _entered = self.runtime.enter();
            command.spawn().map_err(|source| SpeechError::Spawn {
                program: self.program.path().display().to_string(),
                source,
            })?
        };

        let Utterance { id, text, .. } = utterance;
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        *lock_slot(&self.active) = Some(ActivePlayback { id, _stop: stop_tx });
        debug!(utterance = %id, chars = text.len(), "speech started");

        if let Some(mut stdin) = child.stdin.take() {
            self.runtime.spawn(async move {
                if let Err(err) = stdin.write_all(text.as_bytes()).await {
                    debug!(%err, "speech program closed its input early");
                }
            });
        }

        let active = self.active.clone();
        self.runtime.spawn(async move {
            on_event(SpeechEvent::started(id));

            let outcome = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => SpeechEvent::ended(id),
                    Ok(status) => {
                        SpeechEvent::failed(id, format!("speech program exited with {status}"))
                    }
                    Err(err) => {
                        SpeechEvent::failed(id, format!("failed to wait for speech program: {err}"))
                    }
                },
                _ = stop_rx => {
                    if let Err(err) = child.kill().await {
                        warn!(%err, "failed to stop speech program");
                    }
                    SpeechEvent::failed(id, "interrupted")
                }
            };

            {
                let mut slot = lock_slot(&active);
                if slot.as_ref().is_some_and(|playback| playback.id == id) {
                    slot.take();
                }
            }
            on_event(outcome);
        });

        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
