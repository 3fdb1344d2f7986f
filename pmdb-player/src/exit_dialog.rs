//! Exit confirmation

use eframe::egui::{self, Align2, Button, RichText};
use pmdb_core::locale::{Language, Text};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    /// Stay; resume playback if it was running when the dialog opened
    Cancel { resume: bool },
    Exit,
}

#[derive(Debug, Default)]
pub struct ExitDialog {
    open: bool,
    resume_on_cancel: bool,
}

impl ExitDialog {
    pub fn open(&mut self, was_playing: bool) {
        self.open = true;
        self.resume_on_cancel = was_playing;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cancel(&mut self) -> Option<ExitChoice> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(ExitChoice::Cancel {
            resume: self.resume_on_cancel,
        })
    }

    pub fn show(&mut self, ctx: &egui::Context, lang: Language) -> Option<ExitChoice> {
        if !self.open {
            return None;
        }

        let mut choice = None;
        egui::Window::new(lang.text(Text::ConfirmExitTitle))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(lang.text(Text::ConfirmExitMessage));
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button(lang.text(Text::Cancel)).clicked() {
                        choice = Some(false);
                    }
                    let exit = Button::new(RichText::new(lang.text(Text::Exit)).color(egui::Color32::WHITE))
                        .fill(theme::EXIT_BUTTON);
                    if ui.add(exit).clicked() {
                        choice = Some(true);
                    }
                });
            });

        match choice {
            Some(true) => {
                self.open = false;
                Some(ExitChoice::Exit)
            }
            Some(false) => self.cancel(),
            None => None,
        }
    }
}
