//! Dark launcher-matching theme

use eframe::egui::{self, Color32, Rounding};

pub const BACKGROUND: Color32 = Color32::from_rgb(32, 34, 39);
pub const BUTTON: Color32 = Color32::from_rgb(48, 51, 56);
pub const BUTTON_HOVER: Color32 = Color32::from_rgb(64, 67, 72);
pub const PROGRESS: Color32 = Color32::from_rgb(80, 85, 95);
pub const PROGRESS_EMPTY: Color32 = Color32::from_rgb(56, 56, 56);
pub const TEXT: Color32 = Color32::from_rgb(177, 186, 204);
pub const TEXT_DIM: Color32 = Color32::from_rgb(96, 101, 111);
pub const TOAST_SUCCESS: Color32 = Color32::from_rgb(42, 168, 118);
pub const TOAST_FAILURE: Color32 = Color32::from_rgb(231, 76, 60);
pub const EXIT_BUTTON: Color32 = Color32::from_rgb(217, 83, 79);

pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = BACKGROUND;
    visuals.extreme_bg_color = Color32::BLACK;
    visuals.override_text_color = Some(TEXT);

    visuals.selection.bg_fill = PROGRESS;

    visuals.widgets.noninteractive.bg_fill = BACKGROUND;
    visuals.widgets.inactive.bg_fill = BUTTON;
    visuals.widgets.inactive.weak_bg_fill = BUTTON;
    visuals.widgets.hovered.bg_fill = BUTTON_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BUTTON_HOVER;
    visuals.widgets.active.bg_fill = PROGRESS;
    visuals.widgets.active.weak_bg_fill = PROGRESS;

    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);
    visuals.widgets.active.rounding = Rounding::same(4.0);
    visuals.window_rounding = Rounding::same(8.0);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(6.0, 4.0);
    ctx.set_style(style);
}
