//! # PMDB Media Player
//!
//! Desktop video player launched by the PMDB theme for Pegasus Frontend.
//! Decoding is done by libVLC; positions are written back to the theme's
//! database so the launcher can resume.

mod app;
mod cli;
mod controls;
mod exit_dialog;
mod icons;
mod progress_bar;
mod subtitle_menu;
mod theme;
mod toast;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use pmdb_core::frame::FrameSink;
use pmdb_core::history::PositionStore;
use pmdb_core::vlc::VlcPlayer;
use pmdb_core::PlayerConfig;
use tracing_subscriber::EnvFilter;

use crate::app::{Launch, PlayerApp};
use crate::cli::Cli;

const DEFAULT_LOG_FILTER: &str = "pmdb_core=info,pmdb_player=info,eframe=warn";

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.video.exists() {
        eprintln!("Error: file not found: {}", cli.video.display());
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    tracing::info!("PMDB Media Player v{}", pmdb_core::VERSION);

    let mut config = PlayerConfig::load(cli.config.as_deref());
    cli.apply(&mut config);

    let store = match &config.database_path {
        Some(path) => PositionStore::open(path),
        None => PositionStore::open_default(),
    };

    let frames = FrameSink::new();
    let player = VlcPlayer::open(&cli.video, config.libvlc_path.as_deref(), frames.clone())
        .context("Could not start the media library (is VLC installed?)")?;

    let file_name = cli
        .video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = config.language.window_title(&file_name);

    let mut viewport = egui::ViewportBuilder::default()
        .with_title(&title)
        .with_inner_size([800.0, 600.0])
        .with_min_inner_size([600.0, 400.0]);
    if let Some(icon) = icons::window_icon(icons::icons_dir().as_deref()) {
        viewport = viewport.with_icon(icon);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let launch = Launch {
        config,
        video_path: cli.video,
        player,
        frames,
        store,
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(PlayerApp::new(cc, launch)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
