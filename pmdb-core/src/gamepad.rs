//! Gamepad Listener
//!
//! A background thread owns the `gilrs` context, uses the first connected
//! controller exclusively and turns its input into [`Command`]s posted to the
//! UI queue. Without a controller it rescans on a slower cadence.

use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::command::Command;
use crate::config::GamepadConfig;
use crate::events::{EventSender, PlayerEvent};

/// Axis magnitude that counts as a pressed hat direction
const HAT_THRESHOLD: f32 = 0.5;

// ============================================================================
// Mapping
// ============================================================================

pub fn button_command(button: Button) -> Option<Command> {
    match button {
        Button::South => Some(Command::PlayPause),
        Button::East => Some(Command::CycleSubtitles),
        Button::West => Some(Command::ToggleFullscreen),
        Button::North => Some(Command::Close),
        Button::DPadUp => Some(Command::VolumeUp),
        Button::DPadDown => Some(Command::VolumeDown),
        Button::DPadLeft => Some(Command::Rewind),
        Button::DPadRight => Some(Command::Forward),
        _ => None,
    }
}

/// Rejects input arriving within `window` of the last accepted one
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    last: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

fn direction(value: f32) -> i8 {
    if value > HAT_THRESHOLD {
        1
    } else if value < -HAT_THRESHOLD {
        -1
    } else {
        0
    }
}

/// D-pad reported as axes. Fires only when a direction newly becomes active.
#[derive(Debug, Default, Clone)]
pub struct HatTracker {
    x: i8,
    y: i8,
}

impl HatTracker {
    pub fn update(&mut self, axis: Axis, value: f32) -> Option<Command> {
        let dir = direction(value);
        let (slot, positive, negative) = match axis {
            Axis::DPadX => (&mut self.x, Command::Forward, Command::Rewind),
            Axis::DPadY => (&mut self.y, Command::VolumeUp, Command::VolumeDown),
            _ => return None,
        };
        let changed = *slot != dir;
        *slot = dir;
        match (changed, dir) {
            (true, 1) => Some(positive),
            (true, -1) => Some(negative),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Listener thread
// ============================================================================

pub struct GamepadListener {
    gilrs: Gilrs,
    config: GamepadConfig,
    events: EventSender,
    active: Option<GamepadId>,
    debounce: Debounce,
    hat: HatTracker,
    next_scan: Instant,
}

impl GamepadListener {
    /// Start the listener thread. Returns `Ok(None)` when disabled.
    pub fn spawn(
        config: GamepadConfig,
        events: EventSender,
        running: Arc<AtomicBool>,
    ) -> std::io::Result<Option<JoinHandle<()>>> {
        if !config.enabled {
            tracing::info!("Gamepad support disabled");
            return Ok(None);
        }
        thread::Builder::new()
            .name("gamepad".into())
            .spawn(move || {
                let gilrs = match Gilrs::new() {
                    Ok(g) => g,
                    Err(gilrs::Error::NotImplemented(g)) => {
                        tracing::warn!("Gamepads not supported on this platform");
                        g
                    }
                    Err(e) => {
                        tracing::warn!("Gamepad init failed: {}", e);
                        return;
                    }
                };
                let mut listener = GamepadListener {
                    gilrs,
                    debounce: Debounce::new(config.debounce()),
                    config,
                    events,
                    active: None,
                    hat: HatTracker::default(),
                    next_scan: Instant::now(),
                };
                listener.run(&running);
            })
            .map(Some)
    }

    fn run(&mut self, running: &AtomicBool) {
        tracing::info!("Gamepad listener started");
        while running.load(Ordering::Acquire) {
            let now = Instant::now();
            self.drain_events(now);
            if self.active.is_none() && now >= self.next_scan {
                self.scan();
                self.next_scan = now + self.config.reconnect_interval();
            }
            thread::sleep(self.config.poll_interval());
        }
        tracing::debug!("Gamepad listener stopped");
    }

    fn scan(&mut self) {
        let found = self
            .gilrs
            .gamepads()
            .find(|(_, pad)| pad.is_connected())
            .map(|(id, pad)| (id, pad.name().to_string()));
        if let Some((id, name)) = found {
            self.attach(id, name);
        }
    }

    fn attach(&mut self, id: GamepadId, name: String) {
        tracing::info!("Gamepad connected: {}", name);
        self.active = Some(id);
        self.hat.reset();
        self.events.post(PlayerEvent::GamepadConnected(name));
    }

    fn drain_events(&mut self, now: Instant) {
        while let Some(event) = self.gilrs.next_event() {
            let id = event.id;
            match event.event {
                EventType::Connected => {
                    if self.active.is_none() {
                        let name = self.gilrs.gamepad(id).name().to_string();
                        self.attach(id, name);
                    }
                }
                EventType::Disconnected => {
                    if self.active == Some(id) {
                        tracing::info!("Gamepad disconnected");
                        self.active = None;
                        self.hat.reset();
                        self.next_scan = now;
                        self.events.post(PlayerEvent::GamepadDisconnected);
                    }
                }
                EventType::ButtonPressed(button, _) if self.active == Some(id) => {
                    if let Some(command) = button_command(button) {
                        self.dispatch(command, now);
                    }
                }
                EventType::AxisChanged(axis, value, _) if self.active == Some(id) => {
                    if let Some(command) = self.hat.update(axis, value) {
                        self.dispatch(command, now);
                    }
                }
                _ => {}
            }
        }
    }

    fn dispatch(&mut self, command: Command, now: Instant) {
        if self.debounce.accept(now) {
            tracing::debug!("Gamepad command {:?}", command);
            self.events.post(PlayerEvent::Command(command));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(button_command(Button::South), Some(Command::PlayPause));
        assert_eq!(button_command(Button::East), Some(Command::CycleSubtitles));
        assert_eq!(button_command(Button::West), Some(Command::ToggleFullscreen));
        assert_eq!(button_command(Button::North), Some(Command::Close));
        assert_eq!(button_command(Button::DPadLeft), Some(Command::Rewind));
        assert_eq!(button_command(Button::DPadUp), Some(Command::VolumeUp));
        assert_eq!(button_command(Button::Start), None);
    }

    #[test]
    fn test_debounce_window() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(200));
        assert!(debounce.accept(start));
        assert!(!debounce.accept(start + Duration::from_millis(150)));
        assert!(debounce.accept(start + Duration::from_millis(210)));
        assert!(!debounce.accept(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_hat_fires_on_new_direction_only() {
        let mut hat = HatTracker::default();
        assert_eq!(hat.update(Axis::DPadX, 1.0), Some(Command::Forward));
        // Held
        assert_eq!(hat.update(Axis::DPadX, 1.0), None);
        // Released
        assert_eq!(hat.update(Axis::DPadX, 0.0), None);
        assert_eq!(hat.update(Axis::DPadX, -1.0), Some(Command::Rewind));
        // Straight from left to right is a new direction
        assert_eq!(hat.update(Axis::DPadX, 1.0), Some(Command::Forward));

        assert_eq!(hat.update(Axis::DPadY, 1.0), Some(Command::VolumeUp));
        assert_eq!(hat.update(Axis::DPadY, -1.0), Some(Command::VolumeDown));
        assert_eq!(hat.update(Axis::LeftStickX, 1.0), None);
    }
}
