//! Control-bar icons
//!
//! PNGs from `assets/icons`. Any icon that fails to load is simply absent and
//! the control falls back to a text label.

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const WINDOW_ICON: &str = "pmdbmp.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Volume,
    Mute,
    Fullscreen,
    NoFullscreen,
    Play,
    Pause,
    Close,
    Forward,
    Backward,
    SubtitleOn,
    SubtitleOff,
    EmbeddedSub,
}

impl Icon {
    pub const ALL: [Icon; 12] = [
        Icon::Volume,
        Icon::Mute,
        Icon::Fullscreen,
        Icon::NoFullscreen,
        Icon::Play,
        Icon::Pause,
        Icon::Close,
        Icon::Forward,
        Icon::Backward,
        Icon::SubtitleOn,
        Icon::SubtitleOff,
        Icon::EmbeddedSub,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Icon::Volume => "volume.png",
            Icon::Mute => "mute.png",
            Icon::Fullscreen => "fullscreen.png",
            Icon::NoFullscreen => "no-fullscreen.png",
            Icon::Play => "play.png",
            Icon::Pause => "pause.png",
            Icon::Close => "close.png",
            Icon::Forward => "forward.png",
            Icon::Backward => "backward.png",
            Icon::SubtitleOn => "subtitle-on.png",
            Icon::SubtitleOff => "subtitle-off.png",
            Icon::EmbeddedSub => "embedded-sub.png",
        }
    }
}

/// First existing `assets/icons` next to the executable or in the working directory
pub fn icons_dir() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        candidates.push(exe_dir.join("assets").join("icons"));
    }
    candidates.push(PathBuf::from("assets").join("icons"));
    candidates.into_iter().find(|p| p.is_dir())
}

fn load_rgba(path: &Path) -> Result<(Vec<u8>, u32, u32), image::ImageError> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok((image.into_raw(), width, height))
}

/// Window icon, if present
pub fn window_icon(dir: Option<&Path>) -> Option<egui::IconData> {
    let path = dir?.join(WINDOW_ICON);
    match load_rgba(&path) {
        Ok((rgba, width, height)) => Some(egui::IconData { rgba, width, height }),
        Err(e) => {
            tracing::debug!("No window icon at {}: {}", path.display(), e);
            None
        }
    }
}

#[derive(Default)]
pub struct IconSet {
    textures: HashMap<Icon, TextureHandle>,
}

impl IconSet {
    pub fn load(ctx: &egui::Context, dir: Option<&Path>) -> Self {
        let mut textures = HashMap::new();
        let Some(dir) = dir else {
            tracing::warn!("Icon directory not found, using text labels");
            return Self { textures };
        };

        for icon in Icon::ALL {
            let path = dir.join(icon.file_name());
            match load_rgba(&path) {
                Ok((rgba, width, height)) => {
                    let image = ColorImage::from_rgba_unmultiplied([width as usize, height as usize], &rgba);
                    let texture = ctx.load_texture(icon.file_name(), image, TextureOptions::LINEAR);
                    textures.insert(icon, texture);
                }
                Err(e) => tracing::warn!("Icon {} unavailable: {}", path.display(), e),
            }
        }
        tracing::info!("Loaded {}/{} icons from {}", textures.len(), Icon::ALL.len(), dir.display());
        Self { textures }
    }

    pub fn get(&self, icon: Icon) -> Option<&TextureHandle> {
        self.textures.get(&icon)
    }
}
