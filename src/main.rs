//! texview: texture and image viewer
//! Built with Rust + egui (eframe)

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(feature = "mimalloc-allocator")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::{Path, PathBuf};

use eframe::egui;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use texview::config::{Action, Config, InputBinding, Profile, TextureFilter};
use texview::image::{MultiFrameType, ViewerImage};
use texview::image_loader::{get_images_in_directory, LoadedImage};
use texview::properties::{show_properties_window, toggle_play};
use texview::state::ViewState;

/// What the uploaded texture was built from. A different key means re-upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UploadKey {
    frame: usize,
    alt_enabled: bool,
    overview: (bool, bool, bool),
    filter: TextureFilter,
}

/// Application state
struct ImageViewer {
    /// Current image. Kept even when loading failed so the properties window can say so.
    image: Option<LoadedImage>,
    /// Texture handle for the current picture
    texture: Option<egui::TextureHandle>,
    uploaded: Option<UploadKey>,
    /// List of images in the current directory
    image_list: Vec<PathBuf>,
    /// Current image index in the list
    current_index: usize,
    /// Current zoom level (1.0 = 100%)
    zoom: f32,
    /// Image offset for panning
    offset: egui::Vec2,
    config: Config,
    view: ViewState,
    is_fullscreen: bool,
    /// Error message to display
    error_message: Option<String>,
    /// Set when the window title and visuals need refreshing
    image_changed: bool,
    profile_changed: bool,
    should_exit: bool,
    toggle_fullscreen: bool,
}

impl ImageViewer {
    fn new(cc: &eframe::CreationContext<'_>, config: Config, path: Option<PathBuf>) -> Self {
        let view = ViewState {
            show_properties: config.current().show_properties,
            ..ViewState::default()
        };
        let mut viewer = Self {
            image: None,
            texture: None,
            uploaded: None,
            image_list: Vec::new(),
            current_index: 0,
            zoom: 1.0,
            offset: egui::Vec2::ZERO,
            is_fullscreen: config.start_fullscreen,
            config,
            view,
            error_message: None,
            image_changed: false,
            profile_changed: false,
            should_exit: false,
            toggle_fullscreen: false,
        };

        viewer.apply_visuals(&cc.egui_ctx);

        if let Some(path) = path {
            viewer.load_image(&path);
        }

        viewer
    }

    fn run_action(&mut self, action: Action) {
        match action {
            Action::Exit => self.should_exit = true,
            Action::ToggleFullscreen => self.toggle_fullscreen = true,
            Action::NextImage => self.next_image(),
            Action::PreviousImage => self.prev_image(),
            Action::NextFrame => self.with_frames(|img, n| {
                img.stop();
                img.playback_mut().step_forward(n);
            }),
            Action::PreviousFrame => self.with_frames(|img, _| {
                img.stop();
                img.playback_mut().step_back();
            }),
            Action::FirstFrame => self.with_frames(|img, _| {
                img.stop();
                img.playback_mut().skip_to_begin();
            }),
            Action::LastFrame => self.with_frames(|img, n| {
                img.stop();
                img.playback_mut().skip_to_end(n);
            }),
            Action::PlayPause => self.with_frames(|img, _| {
                let reverse = img.playback().play_reverse;
                toggle_play(img, reverse);
            }),
            Action::ToggleProperties => {
                self.view.show_properties = !self.view.show_properties;
                self.config.current_mut().show_properties = self.view.show_properties;
            }
            Action::CycleProfile => {
                let profile = self.config.cycle_profile();
                info!("switched to {}", profile.long_name());
                self.view.show_properties = self.config.current().show_properties;
                self.profile_changed = true;
            }
        }
    }

    /// Runs `f` on the current image when it has more than one frame.
    fn with_frames(&mut self, f: impl FnOnce(&mut dyn ViewerImage, usize)) {
        if let Some(img) = self.image.as_mut() {
            let n = img.num_frames();
            if n > 1 {
                f(img as &mut dyn ViewerImage, n);
            }
        }
    }

    fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.background_color32();
        ctx.set_visuals(visuals);
    }

    /// Load an image from path
    fn load_image(&mut self, path: &Path) {
        let mut img = LoadedImage::new(path, self.config.current().default_gamma);
        match img.load() {
            Ok(()) => {
                if self.config.autoplay && img.multi_frame_type() == MultiFrameType::Animation {
                    img.play();
                }
                self.error_message = None;
            }
            Err(e) => {
                warn!("{e}");
                self.error_message = Some(e.to_string());
            }
        }

        self.image_list = get_images_in_directory(path);
        self.current_index = self.image_list.iter().position(|p| p == path).unwrap_or(0);
        self.image = Some(img);
        self.texture = None;
        self.uploaded = None;
        self.zoom = 1.0;
        self.offset = egui::Vec2::ZERO;
        self.image_changed = true;
    }

    /// Load next image
    fn next_image(&mut self) {
        if self.image_list.is_empty() {
            return;
        }
        self.current_index = (self.current_index + 1) % self.image_list.len();
        let path = self.image_list[self.current_index].clone();
        self.load_image(&path);
    }

    /// Load previous image
    fn prev_image(&mut self) {
        if self.image_list.is_empty() {
            return;
        }
        self.current_index = if self.current_index == 0 {
            self.image_list.len() - 1
        } else {
            self.current_index - 1
        };
        let path = self.image_list[self.current_index].clone();
        self.load_image(&path);
    }

    fn background_color32(&self) -> egui::Color32 {
        let [r, g, b] = self.config.current().background_rgb;
        egui::Color32::from_rgb(r, g, b)
    }

    fn background_clear_color(&self) -> [f32; 4] {
        let [r, g, b] = self.config.current().background_rgb;
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }

    /// Zoom at a specific point
    fn zoom_at(&mut self, center: egui::Pos2, factor: f32, available_rect: egui::Rect) {
        let old_zoom = self.zoom;
        self.zoom = (self.zoom * factor).clamp(0.05, 64.0);

        let cursor_offset = center - available_rect.center();
        let zoom_ratio = self.zoom / old_zoom;
        self.offset = self.offset * zoom_ratio - cursor_offset * (zoom_ratio - 1.0);
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            warn!("failed to save config: {e}");
        }
    }

    /// Advance playback and upload the displayed picture when it changed.
    fn update_texture(&mut self, ctx: &egui::Context) {
        let Some(img) = self.image.as_mut() else {
            self.texture = None;
            return;
        };

        if img.playback().playing {
            let dt = ctx.input(|i| i.stable_dt).min(0.1);
            img.update_playing(dt);
            ctx.request_repaint();
        }

        let filter = self.config.current().texture_filter;
        let key = UploadKey {
            frame: img.frame_num(),
            alt_enabled: img.is_alt_picture_enabled(),
            overview: (
                self.view.show_all_mips_unified,
                self.view.show_all_array_layers,
                self.view.show_layer_mip_matrix,
            ),
            filter,
        };

        let forced = img.take_needs_upload();
        if !forced && self.uploaded == Some(key) {
            return;
        }

        self.texture = img.display_picture(&self.view).map(|pic| {
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [pic.width as usize, pic.height as usize],
                &pic.pixels,
            );
            ctx.load_texture("image", color_image, filter.to_egui_options())
        });
        self.uploaded = Some(key);
    }

    /// Handle keyboard and mouse input
    fn handle_input(&mut self, ctx: &egui::Context) {
        let typing = ctx.wants_keyboard_input();
        let actions: Vec<Action> = ctx.input(|input| {
            let mut actions = Vec::new();

            if !typing {
                for event in &input.events {
                    if let egui::Event::Key { key, pressed: true, modifiers, .. } = event {
                        let binding = if modifiers.ctrl {
                            InputBinding::KeyWithCtrl(*key)
                        } else if modifiers.shift {
                            InputBinding::KeyWithShift(*key)
                        } else if modifiers.alt {
                            InputBinding::KeyWithAlt(*key)
                        } else {
                            InputBinding::Key(*key)
                        };
                        actions.extend(self.config.action_for(&binding));
                    }
                }
            }

            for (button, binding) in [
                (egui::PointerButton::Middle, InputBinding::MouseMiddle),
                (egui::PointerButton::Extra1, InputBinding::Mouse4),
                (egui::PointerButton::Extra2, InputBinding::Mouse5),
            ] {
                if input.pointer.button_pressed(button) {
                    actions.extend(self.config.action_for(&binding));
                }
            }

            actions
        });

        for action in actions {
            self.run_action(action);
        }
    }

    fn draw_properties(&mut self, ctx: &egui::Context) {
        let image = self.image.as_mut().map(|img| img as &mut dyn ViewerImage);
        show_properties_window(ctx, image, &mut self.view, self.config.current_mut());
        // Closing the window with its X persists to the profile too.
        self.config.current_mut().show_properties = self.view.show_properties;
    }

    fn draw_scrubber(&mut self, ctx: &egui::Context) {
        if !self.config.current().show_frame_scrubber {
            return;
        }
        let Some(img) = self.image.as_mut() else {
            return;
        };
        let num_frames = img.num_frames();
        if num_frames < 2 || img.is_alt_picture_enabled() {
            return;
        }

        egui::TopBottomPanel::bottom("frame_scrubber").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut frame = img.frame_num();
                ui.spacing_mut().slider_width = (ui.available_width() - 80.0).max(100.0);
                let response = ui.add(
                    egui::Slider::new(&mut frame, 0..=num_frames - 1)
                        .show_value(false)
                        .trailing_fill(true),
                );
                if response.changed() {
                    img.stop();
                    img.set_frame_num(frame);
                }
                ui.label(
                    egui::RichText::new(format!("{}/{}", frame + 1, num_frames))
                        .color(egui::Color32::GRAY),
                );
            });
        });
    }

    fn draw_info_bar(&self, ctx: &egui::Context) {
        if self.config.profile == Profile::Kiosk {
            return;
        }
        let Some(img) = self.image.as_ref() else {
            return;
        };

        egui::Area::new(egui::Id::new("info_bar"))
            .fixed_pos(ctx.screen_rect().min + egui::vec2(8.0, 6.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let filename = img.path.file_name().and_then(|n| n.to_str()).unwrap_or("Unknown");
                    ui.label(egui::RichText::new(filename).color(egui::Color32::WHITE));
                    if let Some(texture) = &self.texture {
                        let [w, h] = texture.size();
                        ui.label(egui::RichText::new(format!("{}x{}", w, h)).color(egui::Color32::GRAY));
                    }
                    ui.label(
                        egui::RichText::new(format!("{:.0}%", self.zoom * 100.0)).color(egui::Color32::GRAY),
                    );
                    if !self.image_list.is_empty() {
                        ui.label(
                            egui::RichText::new(format!(
                                "[{}/{}]",
                                self.current_index + 1,
                                self.image_list.len()
                            ))
                            .color(egui::Color32::GRAY),
                        );
                    }
                });
            });
    }

    /// Draw the main image
    fn draw_image(&mut self, ctx: &egui::Context) {
        let bg = self.background_color32();
        let zoom_step = self.config.current().zoom_step;
        // The file's own canvas colour replaces the viewer background when overridden.
        let file_background = self
            .image
            .as_ref()
            .and_then(|img| img.background_override())
            .map(|[r, g, b, a]| egui::Color32::from_rgba_unmultiplied(r, g, b, a));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(bg))
            .show(ctx, |ui| {
                let available = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(available, egui::Sense::click_and_drag());

                if response.dragged() {
                    self.offset += response.drag_delta();
                }
                if response.double_clicked() {
                    self.zoom = 1.0;
                    self.offset = egui::Vec2::ZERO;
                }
                if response.hovered() {
                    let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
                    if scroll_delta != 0.0 {
                        if let Some(pos) = response.hover_pos() {
                            let factor = if scroll_delta > 0.0 { zoom_step } else { 1.0 / zoom_step };
                            self.zoom_at(pos, factor, available);
                        }
                    }
                }

                let painter = ui.painter_at(available);
                if let Some(texture) = &self.texture {
                    let image_rect =
                        egui::Rect::from_center_size(available.center() + self.offset, texture.size_vec2() * self.zoom);
                    if let Some(fill) = file_background {
                        painter.rect_filled(image_rect, 0.0, fill);
                    }
                    painter.image(
                        texture.id(),
                        image_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                } else if let Some(error) = &self.error_message {
                    painter.text(
                        available.center(),
                        egui::Align2::CENTER_CENTER,
                        error,
                        egui::FontId::proportional(18.0),
                        egui::Color32::RED,
                    );
                } else {
                    painter.text(
                        available.center(),
                        egui::Align2::CENTER_CENTER,
                        "Drag and drop an image or pass a file path as argument",
                        egui::FontId::proportional(16.0),
                        egui::Color32::GRAY,
                    );
                }
            });
    }
}

impl eframe::App for ImageViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle file drops
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.load_image(&path);
        }

        self.handle_input(ctx);

        if self.profile_changed {
            self.apply_visuals(ctx);
            self.profile_changed = false;
        }

        if self.image_changed {
            let title = match self.image.as_ref().and_then(|img| img.path.file_name()) {
                Some(name) => format!("texview - {}", name.to_string_lossy()),
                None => "texview".to_string(),
            };
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
            self.image_changed = false;
        }

        if self.toggle_fullscreen {
            self.is_fullscreen = !self.is_fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
            self.toggle_fullscreen = false;
        }

        // Property edits may reload the image, so they run before the upload.
        self.draw_properties(ctx);
        self.draw_scrubber(ctx);
        self.update_texture(ctx);
        self.draw_image(ctx);
        self.draw_info_bar(ctx);

        if self.should_exit {
            self.save_config();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            self.should_exit = false;
        } else if ctx.input(|i| i.viewport().close_requested()) {
            self.save_config();
        }
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        self.background_clear_color()
    }
}

/// Get primary monitor size on Windows
#[cfg(target_os = "windows")]
fn get_primary_monitor_size() -> egui::Vec2 {
    use winapi::um::winuser::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

    unsafe {
        let width = GetSystemMetrics(SM_CXSCREEN) as f32;
        let height = GetSystemMetrics(SM_CYSCREEN) as f32;
        egui::Vec2::new(width, height)
    }
}

#[cfg(not(target_os = "windows"))]
fn get_primary_monitor_size() -> egui::Vec2 {
    egui::Vec2::new(1920.0, 1080.0)
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("texview=info")),
        )
        .init();

    let image_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load();
    info!("using {}", config.profile.long_name());

    let initial_size = (get_primary_monitor_size() * 0.6).max(egui::vec2(640.0, 480.0));
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("texview")
            .with_min_inner_size([320.0, 240.0])
            .with_inner_size(initial_size)
            .with_fullscreen(config.start_fullscreen)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "texview",
        options,
        Box::new(move |cc| Ok(Box::new(ImageViewer::new(cc, config, image_path)))),
    )
}
