//! Control bar
//!
//! Pure view: draws from a [`ControlsView`] snapshot and returns what the user
//! did as [`ControlAction`]s for the app to dispatch.

use eframe::egui::{self, load::SizedTexture, Button, RichText};
use pmdb_core::locale::{Language, Text};
use pmdb_core::progress::format_progress;
use pmdb_core::subtitles::SubtitleBadge;
use pmdb_core::Command;

use crate::icons::{Icon, IconSet};
use crate::progress_bar::ProgressBar;
use crate::theme;

const ICON_SIZE: f32 = 24.0;
const VOLUME_SLIDER_WIDTH: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct ControlsView {
    pub playing: bool,
    pub volume: u8,
    pub muted: bool,
    pub fullscreen: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub subtitles: SubtitleBadge,
    pub has_embedded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Command(Command),
    Seek(f64),
    SetVolume(u8),
}

#[derive(Debug, Default)]
pub struct ControlOutput {
    pub actions: Vec<ControlAction>,
    /// Screen rect of the subtitle menu button, for anchoring the popup
    pub subtitle_menu_button: Option<egui::Rect>,
}

fn icon_button(ui: &mut egui::Ui, icons: &IconSet, icon: Icon, fallback: &str, enabled: bool) -> egui::Response {
    let button = match icons.get(icon) {
        Some(texture) => Button::image(egui::Image::from_texture(SizedTexture::new(
            texture.id(),
            egui::vec2(ICON_SIZE, ICON_SIZE),
        ))),
        None => Button::new(RichText::new(fallback).size(14.0)),
    };
    ui.add_enabled(enabled, button.fill(theme::BUTTON))
}

fn command(actions: &mut Vec<ControlAction>, command: Command) {
    actions.push(ControlAction::Command(command));
}

pub fn show(
    ui: &mut egui::Ui,
    view: &ControlsView,
    icons: &IconSet,
    progress: &mut ProgressBar,
    lang: Language,
) -> ControlOutput {
    let mut out = ControlOutput::default();

    if let Some(fraction) = progress.show(ui, view.position_ms, view.duration_ms) {
        out.actions.push(ControlAction::Seek(fraction));
    }

    ui.horizontal(|ui| {
        let (icon, label) = if view.playing {
            (Icon::Pause, Text::Pause)
        } else {
            (Icon::Play, Text::Play)
        };
        if icon_button(ui, icons, icon, lang.text(label), true).clicked() {
            command(&mut out.actions, Command::PlayPause);
        }
        if icon_button(ui, icons, Icon::Backward, lang.text(Text::Rewind), true).clicked() {
            command(&mut out.actions, Command::Rewind);
        }
        if icon_button(ui, icons, Icon::Forward, lang.text(Text::Forward), true).clicked() {
            command(&mut out.actions, Command::Forward);
        }

        ui.label(
            RichText::new(format_progress(view.position_ms, view.duration_ms))
                .size(13.0)
                .color(theme::TEXT),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if icon_button(ui, icons, Icon::Close, lang.text(Text::Close), true).clicked() {
                command(&mut out.actions, Command::Close);
            }

            let (icon, label) = if view.fullscreen {
                (Icon::NoFullscreen, Text::NoFullscreen)
            } else {
                (Icon::Fullscreen, Text::Fullscreen)
            };
            if icon_button(ui, icons, icon, lang.text(label), true).clicked() {
                command(&mut out.actions, Command::ToggleFullscreen);
            }

            let menu = icon_button(ui, icons, Icon::EmbeddedSub, lang.text(Text::EmbeddedSub), view.has_embedded)
                .on_hover_text(lang.text(Text::SelectSubtitle));
            out.subtitle_menu_button = Some(menu.rect);
            if menu.clicked() {
                command(&mut out.actions, Command::ShowSubtitleMenu);
            }

            let (icon, label) = if view.subtitles.enabled {
                (Icon::SubtitleOn, Text::SubtitleOn)
            } else {
                (Icon::SubtitleOff, Text::SubtitleOff)
            };
            if icon_button(ui, icons, icon, lang.text(label), view.subtitles.available).clicked() {
                command(&mut out.actions, Command::ToggleSubtitles);
            }

            let mut level = view.volume;
            ui.spacing_mut().slider_width = VOLUME_SLIDER_WIDTH;
            if ui
                .add(egui::Slider::new(&mut level, 0..=100).show_value(false))
                .changed()
            {
                out.actions.push(ControlAction::SetVolume(level));
            }

            let (icon, label) = if view.muted {
                (Icon::Mute, Text::Mute)
            } else {
                (Icon::Volume, Text::Volume)
            };
            if icon_button(ui, icons, icon, lang.text(label), true).clicked() {
                command(&mut out.actions, Command::ToggleMute);
            }
        });
    });

    out
}
