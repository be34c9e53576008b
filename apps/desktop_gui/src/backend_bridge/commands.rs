//! Backend commands queued from UI to backend worker.

use shared::protocol::AnswerRequest;

pub enum BackendCommand {
    SubmitQuestion(AnswerRequest),
    LoadCatalog,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SubmitQuestion(_) => "submit_question",
            BackendCommand::LoadCatalog => "load_catalog",
        }
    }
}
