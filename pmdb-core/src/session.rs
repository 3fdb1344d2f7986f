//! Media lifecycle worker
//!
//! Background thread that starts playback, waits (bounded) for the duration,
//! snapshots the embedded subtitle tracks and then watches for the end of the
//! media. It only reads the backend and posts `PlayerEvent`s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::WorkerConfig;
use crate::events::{EventSender, PlayerEvent};
use crate::media::{MediaBackend, MediaState};

pub fn spawn_media_worker<B: MediaBackend + 'static>(
    backend: Arc<B>,
    events: EventSender,
    running: Arc<AtomicBool>,
    config: WorkerConfig,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("media-worker".into())
        .spawn(move || run(backend.as_ref(), &events, &running, &config))
}

/// Sleep in poll-sized slices so a cleared flag is noticed promptly
fn sleep_while_running(total: Duration, slice: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(slice.min(deadline - now));
    }
    false
}

fn run<B: MediaBackend>(backend: &B, events: &EventSender, running: &AtomicBool, config: &WorkerConfig) {
    let poll = config.poll_interval();

    if !sleep_while_running(config.start_delay(), poll, running) {
        return;
    }

    if let Err(e) = backend.play() {
        tracing::error!("Failed to start playback: {}", e);
        events.post(PlayerEvent::Failed);
        return;
    }
    events.post(PlayerEvent::Started);

    let deadline = Instant::now() + config.ready_timeout();
    let mut duration_ms = backend.duration_ms();
    while duration_ms == 0 && Instant::now() < deadline {
        if !running.load(Ordering::Acquire) {
            return;
        }
        thread::sleep(poll);
        duration_ms = backend.duration_ms();
    }
    if duration_ms == 0 {
        tracing::warn!("Duration still unknown after {:?}", config.ready_timeout());
    }
    events.post(PlayerEvent::MediaReady { duration_ms });

    backend.use_native_aspect();
    events.post(PlayerEvent::SubtitlesDetected(backend.subtitle_tracks()));

    while running.load(Ordering::Acquire) {
        match backend.state() {
            MediaState::Ended => {
                events.post(PlayerEvent::Ended);
                break;
            }
            MediaState::Error => {
                tracing::error!("Media library reported a playback error");
                events.post(PlayerEvent::Failed);
                break;
            }
            _ => thread::sleep(poll),
        }
    }
    tracing::debug!("Media worker finished");
}
