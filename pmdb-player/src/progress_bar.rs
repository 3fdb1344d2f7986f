//! Seekable progress bar
//!
//! Click seeks immediately; a drag previews the target and seeks on release.

use eframe::egui::{self, Rounding, Sense};
use pmdb_core::progress::played_fraction;

use crate::theme;

const HEIGHT: f32 = 16.0;
const TRACK_HEIGHT: f32 = 6.0;

#[derive(Debug, Default)]
pub struct ProgressBar {
    drag_fraction: Option<f32>,
}

/// Fraction of the bar under `x`
fn fraction_at(x: f32, left: f32, width: f32) -> f32 {
    if width <= 0.0 {
        return 0.0;
    }
    ((x - left) / width).clamp(0.0, 1.0)
}

impl ProgressBar {
    pub fn is_dragging(&self) -> bool {
        self.drag_fraction.is_some()
    }

    /// Draw the bar. Returns a seek fraction when the user picked a position.
    pub fn show(&mut self, ui: &mut egui::Ui, position_ms: u64, duration_ms: u64) -> Option<f64> {
        let size = egui::vec2(ui.available_width(), HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let at = |pos: egui::Pos2| fraction_at(pos.x, rect.left(), rect.width());

        let mut seek = None;
        if response.drag_started() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag_fraction = Some(at(pos));
            }
        }
        if response.drag_stopped() {
            seek = self.drag_fraction.take().map(f64::from);
        } else if response.clicked() {
            seek = response.interact_pointer_pos().map(|pos| at(pos) as f64);
        }

        let shown = self
            .drag_fraction
            .unwrap_or_else(|| played_fraction(position_ms, duration_ms) as f32);

        let track = egui::Rect::from_center_size(rect.center(), egui::vec2(rect.width(), TRACK_HEIGHT));
        let painter = ui.painter();
        painter.rect_filled(track, Rounding::same(3.0), theme::PROGRESS_EMPTY);
        let filled = egui::Rect::from_min_size(track.min, egui::vec2(track.width() * shown, TRACK_HEIGHT));
        painter.rect_filled(filled, Rounding::same(3.0), theme::PROGRESS);

        if response.hovered() || self.is_dragging() {
            let knob = egui::pos2(track.left() + track.width() * shown, track.center().y);
            painter.circle_filled(knob, TRACK_HEIGHT, theme::TEXT);
        }

        seek
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_at() {
        assert_eq!(fraction_at(150.0, 100.0, 200.0), 0.25);
        assert_eq!(fraction_at(50.0, 100.0, 200.0), 0.0);
        assert_eq!(fraction_at(400.0, 100.0, 200.0), 1.0);
        assert_eq!(fraction_at(10.0, 0.0, 0.0), 0.0);
    }
}
