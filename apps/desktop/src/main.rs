use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    controller::{SPEECH_FAILED_STATUS, SPEECH_UNSUPPORTED_STATUS},
    detect_speech_backend, AnswerController, AnswerTransport, ApiClient, FormView,
    SpeechCallback, SpeechSynthesizer,
};
use shared::domain::{Exam, Level};
use tokio::{runtime::Handle, sync::mpsc};
use tracing_subscriber::EnvFilter;

/// Ask the physics tutor one question and print (or speak) the answer.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "TUTOR_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    server_url: String,
    #[arg(long, default_value = "General", value_parser = parse_exam)]
    exam: Exam,
    #[arg(long, default_value = "high-school", value_parser = parse_level)]
    level: Level,
    /// Read the answer aloud once it arrives.
    #[arg(long)]
    speak: bool,
    /// Text-to-speech program to use instead of the platform default.
    #[arg(long)]
    speech_program: Option<String>,
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,
}

fn parse_exam(raw: &str) -> Result<Exam, String> {
    Exam::from_label(raw).ok_or_else(|| {
        let known: Vec<_> = Exam::ALL.iter().map(|exam| exam.as_str()).collect();
        format!("unknown exam '{raw}' (expected one of: {})", known.join(", "))
    })
}

fn parse_level(raw: &str) -> Result<Level, String> {
    Level::from_label(raw).ok_or_else(|| {
        let known: Vec<_> = Level::ALL.iter().map(|level| level.as_str()).collect();
        format!("unknown level '{raw}' (expected one of: {})", known.join(", "))
    })
}

struct StatusReporter {
    last: String,
}

impl StatusReporter {
    fn report<S: SpeechSynthesizer>(&mut self, controller: &AnswerController<S>) {
        let status = &controller.view().status;
        if !status.is_empty() && *status != self.last {
            eprintln!("{status}");
            self.last = status.clone();
        }
    }
}

/// How a run ended. Any error status left on the form is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

fn final_outcome(view: &FormView) -> Outcome {
    if view.status == SPEECH_FAILED_STATUS || view.status == SPEECH_UNSUPPORTED_STATUS {
        Outcome::Failure
    } else {
        Outcome::Success
    }
}

async fn run<T, S>(args: &Args, transport: &T, speech: S) -> Outcome
where
    T: AnswerTransport + ?Sized,
    S: SpeechSynthesizer,
{
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let on_speech_event: SpeechCallback = Arc::new(move |event| {
        let _ = event_tx.send(event);
    });

    let mut controller = AnswerController::new(speech, on_speech_event);
    let inputs = controller.inputs_mut();
    inputs.question = args.question.join(" ");
    inputs.exam = args.exam;
    inputs.level = args.level;

    let mut reporter = StatusReporter {
        last: String::new(),
    };
    controller.submit_question(transport).await;
    reporter.report(&controller);
    if controller.latest_answer().is_none() {
        return Outcome::Failure;
    }
    println!("{}", controller.view().answer);

    if args.speak {
        controller.speak_answer();
        reporter.report(&controller);
        while controller.is_speaking() {
            tokio::select! {
                event = event_rx.recv() => match event {
                    Some(event) => controller.handle_speech_event(event),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => controller.stop_speaking(),
            }
            reporter.report(&controller);
        }
    }

    final_outcome(controller.view())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let client = ApiClient::new(&args.server_url)?;
    let speech = detect_speech_backend(Handle::current(), args.speech_program.as_deref());
    Ok(run(&args, &client, speech).await.into())
}
