//! Volume and mute state
//!
//! Reaching 0 by any path counts as muted. Unmuting restores the last
//! non-zero level, or `DEFAULT_RESTORE_VOLUME` if there never was one.

/// Maximum volume level
pub const MAX_VOLUME: u8 = 100;

/// Level restored by unmute when nothing was remembered
pub const DEFAULT_RESTORE_VOLUME: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeState {
    level: u8,
    remembered: Option<u8>,
}

impl VolumeState {
    pub fn new(level: u8) -> Self {
        let level = level.min(MAX_VOLUME);
        Self {
            level,
            remembered: (level > 0).then_some(level),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.level == 0
    }

    /// Set an absolute level (slider, keyboard, gamepad). Returns the applied level.
    pub fn set(&mut self, level: u8) -> u8 {
        self.level = level.min(MAX_VOLUME);
        if self.level > 0 {
            self.remembered = Some(self.level);
        }
        self.level
    }

    /// Move by `delta` steps, clamped to 0..=100
    pub fn step(&mut self, delta: i16) -> u8 {
        let target = (self.level as i16 + delta).clamp(0, MAX_VOLUME as i16);
        self.set(target as u8)
    }

    /// Mute when audible, otherwise restore the remembered level
    pub fn toggle_mute(&mut self) -> u8 {
        if self.level > 0 {
            self.remembered = Some(self.level);
            self.level = 0;
        } else {
            self.level = self.remembered.unwrap_or(DEFAULT_RESTORE_VOLUME);
        }
        self.level
    }
}

impl Default for VolumeState {
    fn default() -> Self {
        Self::new(DEFAULT_RESTORE_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_unmute_restores_level() {
        let mut volume = VolumeState::new(50);
        volume.set(73);
        assert_eq!(volume.toggle_mute(), 0);
        assert!(volume.is_muted());
        assert_eq!(volume.toggle_mute(), 73);
        assert!(!volume.is_muted());
    }

    #[test]
    fn test_zero_is_implicit_mute() {
        let mut volume = VolumeState::new(10);
        volume.step(-5);
        volume.step(-5);
        assert!(volume.is_muted());
        // Unmute from 0 restores the last audible level
        assert_eq!(volume.toggle_mute(), 5);
    }

    #[test]
    fn test_unmute_without_memory_uses_default() {
        let mut volume = VolumeState::new(0);
        assert!(volume.is_muted());
        assert_eq!(volume.toggle_mute(), DEFAULT_RESTORE_VOLUME);
    }

    #[test]
    fn test_step_clamps() {
        let mut volume = VolumeState::new(98);
        assert_eq!(volume.step(5), 100);
        let mut volume = VolumeState::new(3);
        assert_eq!(volume.step(-5), 0);
        assert_eq!(VolumeState::new(250).level(), 100);
    }
}
