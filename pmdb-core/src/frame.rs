//! Video frame hand-off
//!
//! The media library renders into a back buffer from its own video output
//! thread; `publish` copies the finished picture into the front frame that the
//! UI thread uploads to a texture.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Bytes per pixel of the RGBA output format
pub const BYTES_PER_PIXEL: u32 = 4;

/// Largest accepted picture side; anything bigger is refused at negotiation
pub const MAX_DIMENSION: u32 = 16_384;

/// RGBA frame ready for display
#[derive(Debug, Clone, Default)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct FrameSink {
    back: Mutex<VideoFrame>,
    front: Mutex<VideoFrame>,
    generation: AtomicU64,
    waker: Mutex<Option<Waker>>,
}

impl FrameSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Called whenever a frame is published (e.g. to request a UI repaint)
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.waker.lock() = Some(Arc::new(waker));
    }

    /// Size the back buffer for the decoder's picture format. Returns the pitch
    /// in bytes, or `None` for an empty or oversized picture.
    pub fn configure(&self, width: u32, height: u32) -> Option<u32> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            tracing::warn!("Refusing {}x{} picture format", width, height);
            return None;
        }
        let pitch = width.checked_mul(BYTES_PER_PIXEL)?;
        let len = usize::try_from(pitch)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?;
        let mut back = self.back.lock();
        back.width = width;
        back.height = height;
        back.pixels.clear();
        back.pixels.resize(len, 0);
        tracing::debug!("Frame sink configured: {}x{}", width, height);
        Some(pitch)
    }

    /// Pointer to the back buffer's pixels.
    ///
    /// Only valid until the next `configure`; the library writes through it
    /// between its lock and unlock callbacks.
    pub fn back_buffer_ptr(&self) -> *mut u8 {
        self.back.lock().pixels.as_mut_ptr()
    }

    /// Copy the back buffer to the front frame and notify the waker
    pub fn publish(&self) {
        {
            let back = self.back.lock();
            let mut front = self.front.lock();
            front.width = back.width;
            front.height = back.height;
            front.pixels.clear();
            front.pixels.extend_from_slice(&back.pixels);
        }
        self.generation.fetch_add(1, Ordering::AcqRel);

        let waker = self.waker.lock().clone();
        if let Some(wake) = waker {
            wake();
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Run `f` on the front frame if one newer than `seen` was published.
    /// Returns the generation that was read.
    pub fn read_if_newer<F: FnOnce(&VideoFrame)>(&self, seen: u64, f: F) -> Option<u64> {
        let current = self.generation();
        if current <= seen {
            return None;
        }
        let front = self.front.lock();
        if front.pixels.is_empty() {
            return None;
        }
        f(&front);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_and_read() {
        let sink = FrameSink::new();
        let pitch = sink.configure(4, 2);
        assert_eq!(pitch, Some(16));

        // Nothing published yet
        assert!(sink.read_if_newer(0, |_| {}).is_none());

        unsafe {
            *sink.back_buffer_ptr() = 0xAB;
        }
        sink.publish();

        let mut seen_size = (0, 0);
        let mut first_byte = 0;
        let generation = sink.read_if_newer(0, |frame| {
            seen_size = (frame.width, frame.height);
            first_byte = frame.pixels[0];
        });
        assert_eq!(generation, Some(1));
        assert_eq!(seen_size, (4, 2));
        assert_eq!(first_byte, 0xAB);

        // Already seen
        assert!(sink.read_if_newer(1, |_| {}).is_none());
    }

    #[test]
    fn test_waker_called_on_publish() {
        let sink = FrameSink::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        sink.set_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sink.configure(2, 2);
        sink.publish();
        sink.publish();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(sink.generation(), 2);
    }

    #[test]
    fn test_oversized_picture_rejected() {
        let sink = FrameSink::new();
        sink.configure(4, 2);

        assert_eq!(sink.configure(40_000, 30_000), None);
        assert_eq!(sink.configure(u32::MAX, 1), None);
        assert_eq!(sink.configure(0, 240), None);
        // Previous buffer left untouched
        assert_eq!(sink.back.lock().pixels.len(), 32);

        let pitch = sink.configure(MAX_DIMENSION, 2);
        assert_eq!(pitch, Some(MAX_DIMENSION * BYTES_PER_PIXEL));
    }
}
