//! Player window
//!
//! Owns the controller and all widget state. Everything here runs on the UI
//! thread; the media worker and the gamepad listener talk to it only through
//! the `PlayerEvent` queue, drained at the start of every frame.

use crossbeam_channel::Receiver;
use eframe::egui::{self, Align2, ColorImage, TextureHandle, TextureOptions};
use pmdb_core::frame::FrameSink;
use pmdb_core::gamepad::GamepadListener;
use pmdb_core::history::PositionStore;
use pmdb_core::locale::{Language, Text};
use pmdb_core::session::spawn_media_worker;
use pmdb_core::vlc::VlcPlayer;
use pmdb_core::{
    event_queue, Command, CommandSource, ControllerSettings, Notice, PlaybackController, PlayerConfig,
    PlayerEvent,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::controls::{self, ControlAction, ControlsView};
use crate::exit_dialog::{ExitChoice, ExitDialog};
use crate::icons::{self, IconSet};
use crate::progress_bar::ProgressBar;
use crate::subtitle_menu::SubtitleMenu;
use crate::theme;
use crate::toast::Toasts;

/// Fraction of the screen width used by the fullscreen control overlay
const FULLSCREEN_CONTROLS_WIDTH: f32 = 0.6;
const FULLSCREEN_CONTROLS_MARGIN: f32 = 20.0;

/// Everything `main` prepares before the window exists
pub struct Launch {
    pub config: PlayerConfig,
    pub video_path: PathBuf,
    pub player: VlcPlayer,
    pub frames: Arc<FrameSink>,
    pub store: PositionStore,
}

pub struct PlayerApp {
    controller: PlaybackController<VlcPlayer>,
    frames: Arc<FrameSink>,
    events: Receiver<PlayerEvent>,
    workers: Vec<JoinHandle<()>>,

    language: Language,
    icons: IconSet,
    refresh_every: Duration,
    last_refresh: Instant,

    video: Option<TextureHandle>,
    frame_generation: u64,
    frame_size: [usize; 2],

    progress: ProgressBar,
    subtitle_menu: SubtitleMenu,
    subtitle_anchor: Option<egui::Rect>,
    exit_dialog: ExitDialog,
    toasts: Toasts,
    closing: bool,
}

impl PlayerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, launch: Launch) -> Self {
        theme::apply(&cc.egui_ctx);

        let Launch {
            config,
            video_path,
            player,
            frames,
            store,
        } = launch;
        let now = Instant::now();

        let repaint = cc.egui_ctx.clone();
        frames.set_waker(move || repaint.request_repaint());

        let repaint = cc.egui_ctx.clone();
        let (sender, events) = event_queue(move || repaint.request_repaint());

        let mut controller = PlaybackController::new(
            Arc::new(player),
            store,
            &video_path,
            ControllerSettings::from(&config),
            now,
        );

        let mut workers = Vec::new();
        match spawn_media_worker(
            controller.backend().clone(),
            sender.clone(),
            controller.running(),
            config.worker.clone(),
        ) {
            Ok(handle) => workers.push(handle),
            Err(e) => tracing::error!("Failed to start media worker: {}", e),
        }
        match GamepadListener::spawn(config.gamepad.clone(), sender, controller.running()) {
            Ok(Some(handle)) => workers.push(handle),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to start gamepad listener: {}", e),
        }

        if config.start_fullscreen {
            controller.toggle_fullscreen(now);
            cc.egui_ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
        }

        Self {
            controller,
            frames,
            events,
            workers,
            language: config.language,
            icons: IconSet::load(&cc.egui_ctx, icons::icons_dir().as_deref()),
            refresh_every: config.ui_refresh(),
            last_refresh: now,
            video: None,
            frame_generation: 0,
            frame_size: [0, 0],
            progress: ProgressBar::default(),
            subtitle_menu: SubtitleMenu::default(),
            subtitle_anchor: None,
            exit_dialog: ExitDialog::default(),
            toasts: Toasts::new(config.notification_duration()),
            closing: false,
        }
    }

    // ------------------------------------------------------------------------
    // Events and commands
    // ------------------------------------------------------------------------

    fn drain_events(&mut self, ctx: &egui::Context) {
        let pending: Vec<PlayerEvent> = self.events.try_iter().collect();
        for event in pending {
            match event {
                PlayerEvent::Started => self.controller.on_started(),
                PlayerEvent::MediaReady { duration_ms } => self.controller.on_media_ready(duration_ms),
                PlayerEvent::SubtitlesDetected(tracks) => self.controller.on_subtitles_detected(tracks),
                PlayerEvent::Ended => {
                    self.controller.on_media_ended();
                    self.close(ctx);
                }
                PlayerEvent::Failed => self.controller.on_media_failed(),
                PlayerEvent::Command(command) => self.execute(ctx, command, CommandSource::Gamepad),
                PlayerEvent::GamepadConnected(name) => self.controller.notify(Notice::GamepadConnected(name)),
                PlayerEvent::GamepadDisconnected => self.controller.notify(Notice::GamepadDisconnected),
            }
        }
    }

    fn execute(&mut self, ctx: &egui::Context, command: Command, source: CommandSource) {
        if self.closing {
            return;
        }
        let now = Instant::now();
        let from_gamepad = source == CommandSource::Gamepad;
        tracing::debug!("{:?} from {:?}", command, source);

        let notice = match command {
            Command::PlayPause => {
                let playing = self.controller.toggle_play_pause(now);
                Some(Notice::Playback { playing })
            }
            Command::Rewind => self
                .controller
                .rewind(now)
                .map(|position_ms| Notice::Seeked { forward: false, position_ms }),
            Command::Forward => self
                .controller
                .forward(now)
                .map(|position_ms| Notice::Seeked { forward: true, position_ms }),
            Command::VolumeUp => Some(Notice::Volume(self.controller.step_volume(true))),
            Command::VolumeDown => Some(Notice::Volume(self.controller.step_volume(false))),
            Command::ToggleMute => Some(Notice::Volume(self.controller.toggle_mute())),
            Command::ToggleFullscreen => {
                let fullscreen = self.toggle_fullscreen(ctx, now);
                Some(Notice::WindowMode { fullscreen })
            }
            Command::ExitFullscreenOrClose => {
                if self.controller.is_fullscreen() {
                    self.toggle_fullscreen(ctx, now);
                } else if !self.exit_dialog.is_open() {
                    let was_playing = self.controller.is_playing();
                    if was_playing {
                        self.controller.pause();
                    }
                    self.exit_dialog.open(was_playing);
                }
                None
            }
            Command::ToggleSubtitles => {
                self.controller.toggle_subtitles();
                None
            }
            Command::CycleSubtitles => {
                self.controller.cycle_subtitles();
                None
            }
            Command::ShowSubtitleMenu => {
                self.subtitle_menu.toggle(self.subtitle_anchor);
                None
            }
            Command::Close => {
                self.close(ctx);
                None
            }
        };

        // Keyboard and mouse changes are visible in the control bar already
        if from_gamepad {
            if let Some(notice) = notice {
                self.controller.notify(notice);
            }
        }
    }

    fn toggle_fullscreen(&mut self, ctx: &egui::Context, now: Instant) -> bool {
        let fullscreen = self.controller.toggle_fullscreen(now);
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
        fullscreen
    }

    fn close(&mut self, ctx: &egui::Context) {
        if self.closing {
            return;
        }
        self.closing = true;
        self.subtitle_menu.close();
        self.controller.close();
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let dialog_open = self.exit_dialog.is_open();
        let mut commands = Vec::new();
        let mut cancel_dialog = false;

        ctx.input(|i| {
            if dialog_open {
                cancel_dialog = i.key_pressed(egui::Key::Escape);
                return;
            }
            let bindings = [
                (egui::Key::F11, Command::ToggleFullscreen),
                (egui::Key::Escape, Command::ExitFullscreenOrClose),
                (egui::Key::ArrowLeft, Command::Rewind),
                (egui::Key::ArrowRight, Command::Forward),
                (egui::Key::Space, Command::PlayPause),
                (egui::Key::ArrowUp, Command::VolumeUp),
                (egui::Key::ArrowDown, Command::VolumeDown),
            ];
            for (key, command) in bindings {
                if i.key_pressed(key) {
                    commands.push(command);
                }
            }
        });

        if cancel_dialog {
            if let Some(choice) = self.exit_dialog.cancel() {
                self.apply_exit_choice(ctx, choice);
            }
        }
        for command in commands {
            self.execute(ctx, command, CommandSource::Keyboard);
        }
    }

    fn apply_exit_choice(&mut self, ctx: &egui::Context, choice: ExitChoice) {
        match choice {
            ExitChoice::Cancel { resume } => {
                if resume {
                    self.controller.play(Instant::now());
                }
            }
            ExitChoice::Exit => self.close(ctx),
        }
    }

    fn apply_control_actions(&mut self, ctx: &egui::Context, actions: Vec<ControlAction>) {
        let now = Instant::now();
        for action in actions {
            match action {
                ControlAction::Command(command) => self.execute(ctx, command, CommandSource::Pointer),
                ControlAction::Seek(fraction) => {
                    self.controller.seek_fraction(fraction, now);
                }
                ControlAction::SetVolume(level) => {
                    self.controller.set_volume(level);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let frames = self.frames.clone();
        let video = &mut self.video;
        let frame_size = &mut self.frame_size;
        let read = frames.read_if_newer(self.frame_generation, |frame| {
            let size = [frame.width as usize, frame.height as usize];
            let image = ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
            match video {
                Some(texture) => texture.set(image, TextureOptions::LINEAR),
                None => *video = Some(ctx.load_texture("video_frame", image, TextureOptions::LINEAR)),
            }
            *frame_size = size;
        });
        if let Some(generation) = read {
            self.frame_generation = generation;
        }
    }

    fn controls_view(&self) -> ControlsView {
        ControlsView {
            playing: self.controller.is_playing(),
            volume: self.controller.volume(),
            muted: self.controller.is_muted(),
            fullscreen: self.controller.is_fullscreen(),
            position_ms: self.controller.position_ms(),
            duration_ms: self.controller.duration_ms(),
            subtitles: self.controller.subtitle_badge(),
            has_embedded: !self.controller.subtitle_tracks().is_empty(),
        }
    }

    /// Video canvas. Returns whether it was double-clicked.
    fn draw_video(&self, ui: &mut egui::Ui) -> bool {
        let rect = ui.available_rect_before_wrap();
        let response = ui.interact(rect, egui::Id::new("video_canvas"), egui::Sense::click());

        match &self.video {
            Some(texture) if self.frame_size[0] > 0 && self.frame_size[1] > 0 => {
                let aspect = self.frame_size[0] as f32 / self.frame_size[1] as f32;
                let panel_aspect = rect.width() / rect.height().max(1.0);
                let (w, h) = if aspect > panel_aspect {
                    (rect.width(), rect.width() / aspect)
                } else {
                    (rect.height() * aspect, rect.height())
                };
                let video_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(w, h));
                ui.painter().image(
                    texture.id(),
                    video_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            _ => {
                ui.painter().text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    self.language.text(Text::Loading),
                    egui::FontId::proportional(24.0),
                    theme::TEXT_DIM,
                );
            }
        }

        response.double_clicked()
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.drain_events(ctx);
        if self.closing {
            return;
        }

        if ctx.input(|i| i.viewport().close_requested()) {
            self.close(ctx);
            return;
        }

        if now.duration_since(self.last_refresh) >= self.refresh_every {
            self.controller.refresh();
            self.last_refresh = now;
        }
        self.controller.tick(now);

        if ctx.input(|i| i.pointer.is_moving()) {
            self.controller.pointer_moved(now);
        }
        self.handle_keys(ctx);
        if self.closing {
            return;
        }

        self.upload_frame(ctx);

        let fullscreen = self.controller.is_fullscreen();
        let controls_visible = self.controller.controls_visible(now);
        let view = self.controls_view();
        let mut output = None;

        if !fullscreen {
            egui::TopBottomPanel::bottom("controls")
                .frame(
                    egui::Frame::none()
                        .fill(theme::BACKGROUND)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
                )
                .show(ctx, |ui| {
                    output = Some(controls::show(ui, &view, &self.icons, &mut self.progress, self.language));
                });
        }

        let mut double_clicked = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                double_clicked = self.draw_video(ui);
            });

        if fullscreen {
            if controls_visible {
                let width = ctx.screen_rect().width() * FULLSCREEN_CONTROLS_WIDTH;
                egui::Area::new(egui::Id::new("fullscreen_controls"))
                    .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -FULLSCREEN_CONTROLS_MARGIN))
                    .order(egui::Order::Foreground)
                    .show(ctx, |ui| {
                        ui.set_width(width);
                        egui::Frame::none()
                            .fill(theme::BACKGROUND.gamma_multiply(0.9))
                            .rounding(egui::Rounding::same(8.0))
                            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                            .show(ui, |ui| {
                                output = Some(controls::show(ui, &view, &self.icons, &mut self.progress, self.language));
                            });
                    });
            } else {
                ctx.set_cursor_icon(egui::CursorIcon::None);
            }
        }

        if let Some(output) = output {
            if output.subtitle_menu_button.is_some() {
                self.subtitle_anchor = output.subtitle_menu_button;
            }
            self.apply_control_actions(ctx, output.actions);
        }
        if double_clicked {
            self.execute(ctx, Command::ToggleFullscreen, CommandSource::Pointer);
        }

        let current = self.controller.current_embedded_id();
        if let Some(id) = self
            .subtitle_menu
            .show(ctx, self.controller.subtitle_tracks(), current, self.language)
        {
            self.controller.select_subtitle(id);
        }

        if let Some(choice) = self.exit_dialog.show(ctx, self.language) {
            self.apply_exit_choice(ctx, choice);
        }

        for notice in self.controller.take_notices() {
            self.toasts.push(notice.render(self.language), notice.is_success(), now);
        }
        self.toasts.show(ctx, now);

        let mut next = self.refresh_every;
        if let Some(remaining) = self.toasts.remaining(now) {
            next = next.min(remaining);
        }
        ctx.request_repaint_after(next);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.closing {
            self.controller.close();
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("Worker thread panicked");
            }
        }
    }
}
