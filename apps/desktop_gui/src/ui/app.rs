use std::time::Duration;

use client_core::{AnswerController, AnswerError, SpeechSynthesizer};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{Exam, Level},
    protocol::ExamCatalog,
};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{events::UiEvent, orchestration::dispatch_backend_command},
};

const QUESTION_HINT: &str = "e.g. A ball is thrown upward at 20 m/s. How high does it go?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    Submit,
    Speak,
    Stop,
}

pub struct TutorApp<S> {
    controller: AnswerController<S>,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    exam_options: Vec<Exam>,
    level_options: Vec<Level>,
}

impl<S: SpeechSynthesizer> TutorApp<S> {
    pub fn new(
        controller: AnswerController<S>,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let app = Self {
            controller,
            cmd_tx,
            ui_rx,
            exam_options: Exam::ALL.to_vec(),
            level_options: Level::ALL.to_vec(),
        };
        if let Err(reason) = dispatch_backend_command(&app.cmd_tx, BackendCommand::LoadCatalog) {
            tracing::warn!(%reason, "exam catalog request was not queued");
        }
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::SubmissionFinished(result) => self.controller.complete_submission(result),
                UiEvent::CatalogLoaded(catalog) => self.apply_catalog(&catalog),
                UiEvent::Speech(event) => self.controller.handle_speech_event(event),
            }
        }
    }

    /// Narrows the selectors to what the server offers. Labels this build
    /// does not know are skipped.
    fn apply_catalog(&mut self, catalog: &ExamCatalog) {
        let exams: Vec<Exam> = catalog
            .exams
            .iter()
            .filter_map(|label| Exam::from_label(label))
            .collect();
        if !exams.is_empty() {
            self.exam_options = exams;
        }
        let levels: Vec<Level> = catalog
            .levels
            .iter()
            .filter_map(|label| Level::from_label(label))
            .collect();
        if !levels.is_empty() {
            self.level_options = levels;
        }

        let inputs = self.controller.inputs_mut();
        if !self.exam_options.contains(&inputs.exam) {
            inputs.exam = self.exam_options[0];
        }
        if !self.level_options.contains(&inputs.level) {
            inputs.level = self.level_options[0];
        }
    }

    fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::Submit => self.submit(),
            FormAction::Speak => self.controller.speak_answer(),
            FormAction::Stop => self.controller.stop_speaking(),
        }
    }

    fn submit(&mut self) {
        let Some(request) = self.controller.begin_submission() else {
            return;
        };
        if let Err(reason) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::SubmitQuestion(request))
        {
            self.controller
                .complete_submission(Err(AnswerError::Unavailable(reason)));
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) -> Option<FormAction> {
        let view = self.controller.view().clone();
        let mut action = None;

        ui.heading("Physics Tutor");
        ui.add_space(8.0);

        ui.label("Question");
        let inputs = self.controller.inputs_mut();
        ui.add(
            egui::TextEdit::multiline(&mut inputs.question)
                .hint_text(QUESTION_HINT)
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            ui.label("Exam");
            egui::ComboBox::from_id_salt("exam_selector")
                .selected_text(inputs.exam.as_str())
                .show_ui(ui, |ui| {
                    for exam in &self.exam_options {
                        ui.selectable_value(&mut inputs.exam, *exam, exam.as_str());
                    }
                });

            ui.add_space(16.0);
            ui.label("Level");
            egui::ComboBox::from_id_salt("level_selector")
                .selected_text(inputs.level.label())
                .show_ui(ui, |ui| {
                    for level in &self.level_options {
                        ui.selectable_value(&mut inputs.level, *level, level.label());
                    }
                });
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(view.submit_enabled, egui::Button::new("Get Answer"))
                .clicked()
            {
                action = Some(FormAction::Submit);
            }
            if ui
                .add_enabled(view.speak_enabled, egui::Button::new("Speak Answer"))
                .clicked()
            {
                action = Some(FormAction::Speak);
            }
            if ui
                .add_enabled(view.stop_enabled, egui::Button::new("Stop"))
                .clicked()
            {
                action = Some(FormAction::Stop);
            }
        });

        ui.add_space(8.0);
        ui.label(egui::RichText::new(&view.status).italics());
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(egui::Label::new(&view.answer).wrap());
            });

        action
    }
}

impl<S: SpeechSynthesizer> eframe::App for TutorApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let action = egui::CentralPanel::default()
            .show(ctx, |ui| self.show_form(ui))
            .inner;
        if let Some(action) = action {
            self.apply(action);
        }

        let view = self.controller.view();
        if !view.submit_enabled || self.controller.is_speaking() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
