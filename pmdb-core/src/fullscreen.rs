//! Fullscreen presentation state
//!
//! Outside fullscreen the control bar is always shown. In fullscreen it shows
//! on pointer movement and hides after a period without any.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FullscreenState {
    active: bool,
    controls_visible: bool,
    last_activity: Instant,
    hide_after: Duration,
}

impl FullscreenState {
    pub fn new(hide_after: Duration, now: Instant) -> Self {
        Self {
            active: false,
            controls_visible: true,
            last_activity: now,
            hide_after,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flip fullscreen. Returns the new state.
    pub fn toggle(&mut self, now: Instant) -> bool {
        self.active = !self.active;
        self.controls_visible = true;
        self.last_activity = now;
        self.active
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        self.last_activity = now;
        self.controls_visible = true;
    }

    /// Re-evaluate the idle timer. Returns whether the controls should be drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.active {
            self.controls_visible = true;
        } else if self.controls_visible
            && now.saturating_duration_since(self.last_activity) > self.hide_after
        {
            self.controls_visible = false;
        }
        self.controls_visible
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }
}
