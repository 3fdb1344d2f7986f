//! libVLC backend
//!
//! libVLC 3.x is loaded at runtime with `libloading`, so the player builds
//! without the VLC SDK and reports a clear error when VLC is not installed.
//! Video goes through the `libvlc_video_set_callbacks` path into a
//! [`FrameSink`] as RGBA, which the UI shows as a texture.

use libloading::{Library, Symbol};
use std::ffi::{c_char, c_float, c_int, c_uint, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

use crate::frame::FrameSink;
use crate::media::{MediaBackend, MediaError, MediaState};
use crate::subtitles::SubtitleTrack;

/// Environment variable overriding the library location
pub const LIBVLC_ENV: &str = "PMDB_LIBVLC";

/// Instance arguments: no console chatter, and sidecar subtitles are chosen
/// by the player rather than auto-loaded
const VLC_ARGS: &[&str] = &["--quiet", "--no-sub-autodetect-file", "--no-video-title-show"];

#[cfg(target_os = "windows")]
const PLATFORM_LIBRARIES: &[&str] = &["libvlc.dll", "C:\\Program Files\\VideoLAN\\VLC\\libvlc.dll"];
#[cfg(target_os = "macos")]
const PLATFORM_LIBRARIES: &[&str] = &["libvlc.dylib", "/Applications/VLC.app/Contents/MacOS/lib/libvlc.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_LIBRARIES: &[&str] = &["libvlc.so.5", "libvlc.so"];

// ============================================================================
// FFI surface
// ============================================================================

type Handle = *mut c_void;

#[repr(C)]
struct TrackDescription {
    id: c_int,
    name: *mut c_char,
    next: *mut TrackDescription,
}

type VideoFormatCb = unsafe extern "C" fn(
    *mut *mut c_void,
    *mut c_char,
    *mut c_uint,
    *mut c_uint,
    *mut c_uint,
    *mut c_uint,
) -> c_uint;
type VideoCleanupCb = unsafe extern "C" fn(*mut c_void);
type VideoLockCb = unsafe extern "C" fn(*mut c_void, *mut *mut c_void) -> *mut c_void;
type VideoUnlockCb = unsafe extern "C" fn(*mut c_void, *mut c_void, *const *mut c_void);
type VideoDisplayCb = unsafe extern "C" fn(*mut c_void, *mut c_void);

struct VlcApi {
    new: unsafe extern "C" fn(c_int, *const *const c_char) -> Handle,
    release: unsafe extern "C" fn(Handle),
    media_new_path: unsafe extern "C" fn(Handle, *const c_char) -> Handle,
    media_release: unsafe extern "C" fn(Handle),
    media_get_duration: unsafe extern "C" fn(Handle) -> i64,
    player_new_from_media: unsafe extern "C" fn(Handle) -> Handle,
    player_release: unsafe extern "C" fn(Handle),
    play: unsafe extern "C" fn(Handle) -> c_int,
    set_pause: unsafe extern "C" fn(Handle, c_int),
    stop: unsafe extern "C" fn(Handle),
    get_state: unsafe extern "C" fn(Handle) -> c_int,
    get_time: unsafe extern "C" fn(Handle) -> i64,
    set_time: unsafe extern "C" fn(Handle, i64),
    get_length: unsafe extern "C" fn(Handle) -> i64,
    audio_set_volume: unsafe extern "C" fn(Handle, c_int) -> c_int,
    get_spu: unsafe extern "C" fn(Handle) -> c_int,
    set_spu: unsafe extern "C" fn(Handle, c_int) -> c_int,
    get_spu_description: unsafe extern "C" fn(Handle) -> *mut TrackDescription,
    track_description_list_release: unsafe extern "C" fn(*mut TrackDescription),
    set_subtitle_file: unsafe extern "C" fn(Handle, *const c_char) -> c_int,
    set_scale: unsafe extern "C" fn(Handle, c_float),
    set_aspect_ratio: unsafe extern "C" fn(Handle, *const c_char),
    set_callbacks: unsafe extern "C" fn(
        Handle,
        Option<VideoLockCb>,
        Option<VideoUnlockCb>,
        Option<VideoDisplayCb>,
        *mut c_void,
    ),
    set_format_callbacks: unsafe extern "C" fn(Handle, Option<VideoFormatCb>, Option<VideoCleanupCb>),
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T, MediaError> {
    let sym: Symbol<T> = lib.get(name.as_bytes()).map_err(|e| MediaError::MissingSymbol {
        name,
        reason: e.to_string(),
    })?;
    Ok(*sym)
}

impl VlcApi {
    unsafe fn load(lib: &Library) -> Result<Self, MediaError> {
        Ok(Self {
            new: symbol(lib, "libvlc_new")?,
            release: symbol(lib, "libvlc_release")?,
            media_new_path: symbol(lib, "libvlc_media_new_path")?,
            media_release: symbol(lib, "libvlc_media_release")?,
            media_get_duration: symbol(lib, "libvlc_media_get_duration")?,
            player_new_from_media: symbol(lib, "libvlc_media_player_new_from_media")?,
            player_release: symbol(lib, "libvlc_media_player_release")?,
            play: symbol(lib, "libvlc_media_player_play")?,
            set_pause: symbol(lib, "libvlc_media_player_set_pause")?,
            stop: symbol(lib, "libvlc_media_player_stop")?,
            get_state: symbol(lib, "libvlc_media_player_get_state")?,
            get_time: symbol(lib, "libvlc_media_player_get_time")?,
            set_time: symbol(lib, "libvlc_media_player_set_time")?,
            get_length: symbol(lib, "libvlc_media_player_get_length")?,
            audio_set_volume: symbol(lib, "libvlc_audio_set_volume")?,
            get_spu: symbol(lib, "libvlc_video_get_spu")?,
            set_spu: symbol(lib, "libvlc_video_set_spu")?,
            get_spu_description: symbol(lib, "libvlc_video_get_spu_description")?,
            track_description_list_release: symbol(lib, "libvlc_track_description_list_release")?,
            set_subtitle_file: symbol(lib, "libvlc_video_set_subtitle_file")?,
            set_scale: symbol(lib, "libvlc_video_set_scale")?,
            set_aspect_ratio: symbol(lib, "libvlc_video_set_aspect_ratio")?,
            set_callbacks: symbol(lib, "libvlc_video_set_callbacks")?,
            set_format_callbacks: symbol(lib, "libvlc_video_set_format_callbacks")?,
        })
    }
}

// ============================================================================
// Video callbacks
// ============================================================================

/// Negotiate RGBA at the source size and size the sink to match.
/// Returning 0 buffers makes the library refuse the format.
unsafe extern "C" fn video_format(
    opaque: *mut *mut c_void,
    chroma: *mut c_char,
    width: *mut c_uint,
    height: *mut c_uint,
    pitches: *mut c_uint,
    lines: *mut c_uint,
) -> c_uint {
    let sink = &*(*opaque as *const FrameSink);
    ptr::copy_nonoverlapping(b"RGBA".as_ptr() as *const c_char, chroma, 4);
    let (w, h) = (*width, *height);
    match sink.configure(w, h) {
        Some(pitch) => {
            *pitches = pitch;
            *lines = h;
            1
        }
        None => 0,
    }
}

unsafe extern "C" fn video_cleanup(_opaque: *mut c_void) {}

unsafe extern "C" fn video_lock(opaque: *mut c_void, planes: *mut *mut c_void) -> *mut c_void {
    let sink = &*(opaque as *const FrameSink);
    *planes = sink.back_buffer_ptr() as *mut c_void;
    ptr::null_mut()
}

unsafe extern "C" fn video_unlock(_opaque: *mut c_void, _picture: *mut c_void, _planes: *const *mut c_void) {}

unsafe extern "C" fn video_display(opaque: *mut c_void, _picture: *mut c_void) {
    let sink = &*(opaque as *const FrameSink);
    sink.publish();
}

// ============================================================================
// Library discovery
// ============================================================================

/// Library paths to try, in order: env var, configured path, platform names
pub fn library_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(env_path) = std::env::var_os(LIBVLC_ENV) {
        candidates.push(PathBuf::from(env_path));
    }
    if let Some(path) = configured {
        candidates.push(path.to_path_buf());
    }
    candidates.extend(PLATFORM_LIBRARIES.iter().map(PathBuf::from));
    candidates
}

fn load_library(configured: Option<&Path>) -> Result<Library, MediaError> {
    let candidates = library_candidates(configured);
    for candidate in &candidates {
        match unsafe { Library::new(candidate) } {
            Ok(lib) => {
                tracing::info!("Loaded libVLC from {}", candidate.display());
                return Ok(lib);
            }
            Err(e) => tracing::debug!("libVLC not at {}: {}", candidate.display(), e),
        }
    }
    Err(MediaError::LibraryNotFound(
        candidates.iter().map(|p| p.display().to_string()).collect(),
    ))
}

/// Path as the library expects it: raw bytes on Unix, UTF-8 elsewhere
fn c_path(path: &Path) -> Result<CString, MediaError> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_string_lossy().into_owned().into_bytes();

    CString::new(bytes).map_err(|_| MediaError::InvalidPath(path.display().to_string()))
}

// ============================================================================
// Player
// ============================================================================

pub struct VlcPlayer {
    api: VlcApi,
    instance: Handle,
    media: Handle,
    player: Handle,
    /// Target of the video callbacks; must outlive `player`
    _frames: Arc<FrameSink>,
    _lib: Library,
}

// libVLC instance, media and player handles are thread-safe
unsafe impl Send for VlcPlayer {}
unsafe impl Sync for VlcPlayer {}

impl VlcPlayer {
    /// Load libVLC, open `media_path` and route its video into `frames`.
    /// Playback is not started.
    pub fn open(media_path: &Path, libvlc_path: Option<&Path>, frames: Arc<FrameSink>) -> Result<Self, MediaError> {
        let lib = load_library(libvlc_path)?;
        let api = unsafe { VlcApi::load(&lib)? };

        let args: Vec<CString> = VLC_ARGS
            .iter()
            .filter_map(|a| CString::new(*a).ok())
            .collect();
        let argv: Vec<*const c_char> = args.iter().map(|a| a.as_ptr()).collect();

        let instance = unsafe { (api.new)(argv.len() as c_int, argv.as_ptr()) };
        if instance.is_null() {
            return Err(MediaError::InitFailed);
        }

        let path = match c_path(media_path) {
            Ok(p) => p,
            Err(e) => {
                unsafe { (api.release)(instance) };
                return Err(e);
            }
        };
        let media = unsafe { (api.media_new_path)(instance, path.as_ptr()) };
        if media.is_null() {
            unsafe { (api.release)(instance) };
            return Err(MediaError::OpenFailed(media_path.display().to_string()));
        }

        let player = unsafe { (api.player_new_from_media)(media) };
        if player.is_null() {
            unsafe {
                (api.media_release)(media);
                (api.release)(instance);
            }
            return Err(MediaError::OpenFailed(media_path.display().to_string()));
        }

        let opaque = Arc::as_ptr(&frames) as *mut c_void;
        unsafe {
            (api.set_callbacks)(
                player,
                Some(video_lock),
                Some(video_unlock),
                Some(video_display),
                opaque,
            );
            (api.set_format_callbacks)(player, Some(video_format), Some(video_cleanup));
        }

        tracing::info!("Opened {}", media_path.display());
        Ok(Self {
            api,
            instance,
            media,
            player,
            _frames: frames,
            _lib: lib,
        })
    }
}

impl MediaBackend for VlcPlayer {
    fn play(&self) -> Result<(), MediaError> {
        if unsafe { (self.api.play)(self.player) } == 0 {
            Ok(())
        } else {
            Err(MediaError::CallFailed("libvlc_media_player_play"))
        }
    }

    fn pause(&self) {
        unsafe { (self.api.set_pause)(self.player, 1) }
    }

    fn stop(&self) {
        unsafe { (self.api.stop)(self.player) }
    }

    fn state(&self) -> MediaState {
        MediaState::from_raw(unsafe { (self.api.get_state)(self.player) })
    }

    fn time_ms(&self) -> Option<u64> {
        let t = unsafe { (self.api.get_time)(self.player) };
        (t >= 0).then_some(t as u64)
    }

    fn set_time_ms(&self, ms: u64) {
        unsafe { (self.api.set_time)(self.player, ms.min(i64::MAX as u64) as i64) }
    }

    fn duration_ms(&self) -> u64 {
        let length = unsafe { (self.api.get_length)(self.player) };
        if length > 0 {
            return length as u64;
        }
        let parsed = unsafe { (self.api.media_get_duration)(self.media) };
        parsed.max(0) as u64
    }

    fn set_volume(&self, volume: u8) -> Result<(), MediaError> {
        if unsafe { (self.api.audio_set_volume)(self.player, volume as c_int) } == 0 {
            Ok(())
        } else {
            Err(MediaError::CallFailed("libvlc_audio_set_volume"))
        }
    }

    fn subtitle_tracks(&self) -> Vec<SubtitleTrack> {
        let head = unsafe { (self.api.get_spu_description)(self.player) };
        let mut tracks = Vec::new();
        let mut node = head;
        while !node.is_null() {
            let entry = unsafe { &*node };
            let label = if entry.name.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(entry.name) }.to_string_lossy().into_owned()
            };
            tracks.push(SubtitleTrack::new(entry.id, label));
            node = entry.next;
        }
        if !head.is_null() {
            unsafe { (self.api.track_description_list_release)(head) };
        }
        tracks
    }

    fn current_subtitle(&self) -> i32 {
        unsafe { (self.api.get_spu)(self.player) }
    }

    fn set_subtitle(&self, id: i32) -> Result<(), MediaError> {
        if unsafe { (self.api.set_spu)(self.player, id) } == 0 {
            Ok(())
        } else {
            Err(MediaError::CallFailed("libvlc_video_set_spu"))
        }
    }

    fn load_subtitle_file(&self, path: &Path) -> Result<(), MediaError> {
        let file = c_path(path)?;
        // Returns non-zero on success
        if unsafe { (self.api.set_subtitle_file)(self.player, file.as_ptr()) } != 0 {
            Ok(())
        } else {
            Err(MediaError::CallFailed("libvlc_video_set_subtitle_file"))
        }
    }

    fn use_native_aspect(&self) {
        unsafe {
            (self.api.set_scale)(self.player, 0.0);
            (self.api.set_aspect_ratio)(self.player, ptr::null());
        }
    }
}

impl Drop for VlcPlayer {
    fn drop(&mut self) {
        unsafe {
            (self.api.stop)(self.player);
            (self.api.player_release)(self.player);
            (self.api.media_release)(self.media);
            (self.api.release)(self.instance);
        }
        tracing::debug!("libVLC player released");
    }
}
