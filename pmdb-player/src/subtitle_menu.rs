//! Embedded subtitle popup
//!
//! A "disable" entry plus one entry per detected track. Picking an entry,
//! clicking outside, or the window losing focus dismisses it.

use eframe::egui::{self, Align2, RichText};
use pmdb_core::locale::{Language, Text};
use pmdb_core::subtitles::{SubtitleTrack, SPU_DISABLED};

use crate::theme;

const MAX_HEIGHT: f32 = 150.0;

#[derive(Debug, Default)]
pub struct SubtitleMenu {
    open: bool,
    anchor: Option<egui::Rect>,
}

impl SubtitleMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Menu button pressed: open below/above `anchor`, or close if open
    pub fn toggle(&mut self, anchor: Option<egui::Rect>) {
        self.open = !self.open;
        if anchor.is_some() {
            self.anchor = anchor;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Draw the popup. Returns the SPU id picked, -1 for "disable".
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        tracks: &[SubtitleTrack],
        current_id: i32,
        lang: Language,
    ) -> Option<i32> {
        if !self.open {
            return None;
        }
        if !ctx.input(|i| i.focused) {
            self.open = false;
            return None;
        }

        let (pivot, pos) = match self.anchor {
            Some(rect) => (Align2::RIGHT_BOTTOM, rect.right_top() - egui::vec2(0.0, 4.0)),
            None => (Align2::CENTER_CENTER, ctx.screen_rect().center()),
        };

        let mut picked = None;
        let response = egui::Area::new(egui::Id::new("subtitle_menu"))
            .order(egui::Order::Foreground)
            .pivot(pivot)
            .fixed_pos(pos)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).fill(theme::BUTTON).show(ui, |ui| {
                    ui.label(RichText::new(lang.text(Text::SelectSubtitle)).color(theme::TEXT_DIM));
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(MAX_HEIGHT).show(ui, |ui| {
                        if ui
                            .selectable_label(current_id == SPU_DISABLED, lang.text(Text::DisableSubtitles))
                            .clicked()
                        {
                            picked = Some(SPU_DISABLED);
                        }
                        for track in tracks {
                            if ui.selectable_label(current_id == track.id, track.menu_label()).clicked() {
                                picked = Some(track.id);
                            }
                        }
                    });
                });
            })
            .response;

        let on_anchor = self
            .anchor
            .zip(ctx.input(|i| i.pointer.interact_pos()))
            .is_some_and(|(rect, pos)| rect.contains(pos));

        if picked.is_some() || (response.clicked_elsewhere() && !on_anchor) {
            self.open = false;
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_toggles_menu() {
        let mut menu = SubtitleMenu::default();
        let button = egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(24.0, 24.0));

        menu.toggle(Some(button));
        assert!(menu.is_open());
        menu.toggle(None);
        assert!(!menu.is_open());
        assert_eq!(menu.anchor, Some(button));
    }

    fn input(events: Vec<egui::Event>, focused: bool) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1000.0, 1000.0))),
            focused,
            events,
            ..Default::default()
        }
    }

    fn click_at(pos: egui::Pos2) -> Vec<egui::Event> {
        let button = |pressed| egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        };
        vec![egui::Event::PointerMoved(pos), button(true), button(false)]
    }

    fn open_menu(ctx: &egui::Context) -> SubtitleMenu {
        let mut menu = SubtitleMenu::default();
        menu.toggle(Some(egui::Rect::from_min_size(egui::pos2(500.0, 500.0), egui::vec2(24.0, 24.0))));
        let _ = ctx.run(input(Vec::new(), true), |ctx| {
            menu.show(ctx, &[SubtitleTrack::new(2, "English")], SPU_DISABLED, Language::En);
        });
        assert!(menu.is_open());
        menu
    }

    #[test]
    fn test_focus_loss_closes_menu() {
        let ctx = egui::Context::default();
        let mut menu = open_menu(&ctx);

        let mut picked = Some(0);
        let _ = ctx.run(input(Vec::new(), false), |ctx| {
            picked = menu.show(ctx, &[SubtitleTrack::new(2, "English")], SPU_DISABLED, Language::En);
        });
        assert_eq!(picked, None);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_click_outside_closes_menu() {
        let ctx = egui::Context::default();
        let mut menu = open_menu(&ctx);

        let mut picked = Some(0);
        let _ = ctx.run(input(click_at(egui::pos2(50.0, 900.0)), true), |ctx| {
            picked = menu.show(ctx, &[SubtitleTrack::new(2, "English")], SPU_DISABLED, Language::En);
        });
        assert_eq!(picked, None);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_click_on_anchor_keeps_menu_for_button() {
        let ctx = egui::Context::default();
        let mut menu = open_menu(&ctx);

        let _ = ctx.run(input(click_at(egui::pos2(510.0, 510.0)), true), |ctx| {
            menu.show(ctx, &[], SPU_DISABLED, Language::En);
        });
        // The anchor button's own toggle decides
        assert!(menu.is_open());
    }

    #[test]
    fn test_closed_menu_picks_nothing() {
        let ctx = egui::Context::default();
        let mut menu = SubtitleMenu::default();
        let mut picked = Some(0);
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            picked = menu.show(ctx, &[SubtitleTrack::new(2, "English")], SPU_DISABLED, Language::Es);
        });
        assert_eq!(picked, None);
    }
}
