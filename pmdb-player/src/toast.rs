//! Transient notifications
//!
//! One toast at a time; a new one replaces the current.

use eframe::egui::{self, Align2, Color32, RichText, Rounding};
use std::time::{Duration, Instant};

use crate::theme;

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    text: String,
    success: bool,
    expires: Instant,
}

pub struct Toasts {
    current: Option<Toast>,
    lifetime: Duration,
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self { current: None, lifetime }
    }

    pub fn push(&mut self, text: impl Into<String>, success: bool, now: Instant) {
        self.current = Some(Toast {
            text: text.into(),
            success,
            expires: now + self.lifetime,
        });
    }

    /// Current text, dropping it once expired
    pub fn active(&mut self, now: Instant) -> Option<(&str, bool)> {
        if self.current.as_ref().is_some_and(|t| now >= t.expires) {
            self.current = None;
        }
        self.current.as_ref().map(|t| (t.text.as_str(), t.success))
    }

    /// Time until the current toast expires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.current.as_ref().map(|t| t.expires.saturating_duration_since(now))
    }

    pub fn show(&mut self, ctx: &egui::Context, now: Instant) {
        let Some((text, success)) = self.active(now) else {
            return;
        };
        let fill = if success { theme::TOAST_SUCCESS } else { theme::TOAST_FAILURE };
        let text = text.to_owned();

        egui::Area::new(egui::Id::new("toast"))
            .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 24.0))
            .interactable(false)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(fill)
                    .rounding(Rounding::same(6.0))
                    .inner_margin(egui::Margin::symmetric(16.0, 8.0))
                    .show(ui, |ui| {
                        ui.label(RichText::new(text).size(15.0).color(Color32::WHITE));
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let start = Instant::now();
        let mut toasts = Toasts::new(Duration::from_millis(3000));
        assert!(toasts.active(start).is_none());

        toasts.push("Volumen: 55%", true, start);
        assert_eq!(toasts.active(start + Duration::from_millis(2999)), Some(("Volumen: 55%", true)));
        assert!(toasts.active(start + Duration::from_millis(3000)).is_none());
        assert!(toasts.remaining(start).is_none());
    }

    #[test]
    fn test_new_toast_replaces_current() {
        let start = Instant::now();
        let mut toasts = Toasts::new(Duration::from_millis(3000));
        toasts.push("first", true, start);
        toasts.push("second", false, start + Duration::from_millis(2000));
        assert_eq!(toasts.active(start + Duration::from_millis(4000)), Some(("second", false)));
    }
}
