//! UI event queue
//!
//! Worker threads never touch widgets. They post `PlayerEvent`s here and wake
//! the UI, which drains the queue on its own thread in post order.

use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

use crate::command::Command;
use crate::subtitles::SubtitleTrack;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playback was started by the lifecycle worker
    Started,
    /// Duration known (0 if the wait timed out)
    MediaReady { duration_ms: u64 },
    /// Embedded subtitle tracks, detected once per media
    SubtitlesDetected(Vec<SubtitleTrack>),
    /// Natural end of the media
    Ended,
    /// The library could not start or continue playback
    Failed,
    /// Command from the gamepad
    Command(Command),
    GamepadConnected(String),
    GamepadDisconnected,
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Sending half of the UI queue
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<PlayerEvent>,
    waker: Waker,
}

impl EventSender {
    pub fn post(&self, event: PlayerEvent) {
        tracing::trace!("Posting {:?}", event);
        if self.tx.send(event).is_ok() {
            (self.waker)();
        }
    }
}

/// Create the UI queue. `waker` is called after every post (e.g. request a repaint).
pub fn event_queue(waker: impl Fn() + Send + Sync + 'static) -> (EventSender, Receiver<PlayerEvent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        EventSender {
            tx,
            waker: Arc::new(waker),
        },
        rx,
    )
}
