use texview::config::ProfileData;
use texview::image::{
    AltPictureKind, FileType, ImageInfo, LoadError, MultiFrameType, Opacity, PixelFormat, ViewerImage,
};
use texview::params::LoadParams;
use texview::playback::FramePlayback;
use texview::properties::formats::{commit_edit, commit_reload, reset_params};
use texview::properties::multi_surface::{set_show_all_mips_unified, FrameEditor, SurfaceDisclosure};
use texview::properties::{properties_ui, show_properties_window, toggle_play, PanelOutcome};
use texview::state::ViewState;

/// In-memory image that counts loads and binds.
struct FakeImage {
    file_type: FileType,
    loaded: bool,
    fail_load: bool,
    loads: usize,
    unloads: usize,
    binds: usize,
    params: LoadParams,
    info: ImageInfo,
    frames: usize,
    mips: usize,
    layers: usize,
    multi: MultiFrameType,
    alt_kind: AltPictureKind,
    alt_enabled: bool,
    playback: FramePlayback,
    durations: Vec<f32>,
    override_bg: bool,
}

impl FakeImage {
    fn new(file_type: FileType, frames: usize) -> Self {
        Self {
            file_type,
            loaded: true,
            fail_load: false,
            loads: 0,
            unloads: 0,
            binds: 0,
            params: LoadParams::with_gamma(2.2),
            info: ImageInfo {
                src_pixel_format: PixelFormat::R8G8B8A8,
                ..ImageInfo::default()
            },
            frames,
            mips: 1,
            layers: 1,
            multi: if frames > 1 { MultiFrameType::Animation } else { MultiFrameType::None },
            alt_kind: AltPictureKind::None,
            alt_enabled: false,
            playback: FramePlayback::default(),
            durations: vec![0.1; frames],
            override_bg: false,
        }
    }

    fn cubemap(mips_per_face: usize) -> Self {
        Self {
            multi: MultiFrameType::Cubemap,
            alt_kind: AltPictureKind::CubemapTLayout,
            info: ImageInfo {
                src_pixel_format: PixelFormat::Bc1,
                ..ImageInfo::default()
            },
            ..Self::new(FileType::Dds, mips_per_face * 6)
        }
    }

    fn mipmapped(levels: usize) -> Self {
        Self {
            multi: MultiFrameType::Mipmaps,
            alt_kind: AltPictureKind::MipmapSideBySide,
            mips: levels,
            ..Self::new(FileType::Dds, levels)
        }
    }
}

impl ViewerImage for FakeImage {
    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn load(&mut self) -> Result<(), LoadError> {
        if self.fail_load {
            self.loaded = false;
            return Err(LoadError::Decode {
                path: "fake.dds".to_string(),
                reason: "bad header".to_string(),
            });
        }
        self.loaded = true;
        self.loads += 1;
        Ok(())
    }

    fn unload(&mut self) {
        self.unloads += 1;
        self.loaded = false;
        self.alt_enabled = false;
    }

    fn load_params(&self) -> &LoadParams {
        &self.params
    }

    fn load_params_mut(&mut self) -> &mut LoadParams {
        &mut self.params
    }

    fn reset_load_params(&mut self, default_gamma: f32) {
        self.params = LoadParams::with_gamma(default_gamma);
    }

    fn info(&self) -> ImageInfo {
        self.info
    }

    fn num_frames(&self) -> usize {
        self.frames
    }

    fn num_mip_levels(&self) -> usize {
        self.mips
    }

    fn num_array_layers(&self) -> usize {
        self.layers
    }

    fn multi_frame_type(&self) -> MultiFrameType {
        self.multi
    }

    fn alt_picture_kind(&self) -> AltPictureKind {
        self.alt_kind
    }

    fn is_alt_picture_enabled(&self) -> bool {
        self.alt_enabled
    }

    fn enable_alt_picture(&mut self, enabled: bool) {
        self.alt_enabled = enabled;
    }

    fn bind(&mut self) {
        self.binds += 1;
    }

    fn playback(&self) -> &FramePlayback {
        &self.playback
    }

    fn playback_mut(&mut self) -> &mut FramePlayback {
        &mut self.playback
    }

    fn frame_duration(&self, frame: usize) -> f32 {
        self.durations.get(frame).copied().unwrap_or(0.0)
    }

    fn set_frame_duration(&mut self, seconds: f32, all_frames: bool) {
        if all_frames {
            self.durations.iter_mut().for_each(|d| *d = seconds);
        } else if let Some(d) = self.durations.get_mut(self.playback.frame_num) {
            *d = seconds;
        }
    }

    fn override_background(&self) -> bool {
        self.override_bg
    }

    fn set_override_background(&mut self, enabled: bool) {
        self.override_bg = enabled;
    }
}

/// Runs the properties contents for one headless frame.
fn run_panel(image: Option<&mut FakeImage>, view: &mut ViewState) -> PanelOutcome {
    run_panel_with(image, view, &mut ProfileData::default())
}

fn run_panel_with(image: Option<&mut FakeImage>, view: &mut ViewState, profile: &mut ProfileData) -> PanelOutcome {
    let ctx = egui::Context::default();
    let mut image = image;
    let mut outcome = None;
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            let image = image.as_deref_mut().map(|img| img as &mut dyn ViewerImage);
            outcome = Some(properties_ui(ui, image, view, profile));
        });
    });
    outcome.unwrap_or(PanelOutcome::NoImages)
}

#[test]
fn test_reload_restores_alt_picture() {
    let mut img = FakeImage::cubemap(1);
    img.alt_enabled = true;

    commit_reload(&mut img, true).unwrap();
    assert!(img.is_loaded());
    assert!(img.alt_enabled);
    assert_eq!(img.loads, 1);
    assert_eq!(img.binds, 1);
}

#[test]
fn test_reload_without_restore_leaves_alt_off() {
    let mut img = FakeImage::cubemap(1);
    img.alt_enabled = true;

    commit_reload(&mut img, false).unwrap();
    assert!(!img.alt_enabled);
    assert_eq!(img.binds, 0);
}

#[test]
fn test_failed_reload_shows_failure() {
    let mut img = FakeImage::new(FileType::Dds, 1);
    img.fail_load = true;

    assert!(commit_reload(&mut img, true).is_err());
    assert!(!img.is_loaded());
    assert!(!img.alt_enabled);

    let mut view = ViewState::default();
    assert_eq!(run_panel(Some(&mut img), &mut view), PanelOutcome::LoadFailed);
}

#[test]
fn test_disabling_unified_mips_drops_alt_picture() {
    let mut img = FakeImage::new(FileType::Dds, 6);
    img.multi = MultiFrameType::TextureArray;
    img.mips = 3;
    img.layers = 2;
    img.alt_enabled = true;
    let mut view = ViewState {
        show_all_mips_unified: true,
        ..ViewState::default()
    };

    set_show_all_mips_unified(&mut img, &mut view, false);
    assert!(!view.show_all_mips_unified);
    assert!(!img.alt_enabled);
    assert_eq!(img.binds, 1);

    // Turning it on again leaves the alt picture alone.
    set_show_all_mips_unified(&mut img, &mut view, true);
    assert!(view.show_all_mips_unified);
    assert_eq!(img.binds, 1);
}

#[test]
fn test_disclosure_cubemap() {
    let img = FakeImage::cubemap(2);
    let disclosure = SurfaceDisclosure::evaluate(&img, &ViewState::default());

    assert!(disclosure.alt_cubemap);
    assert!(!disclosure.alt_mipmaps);
    assert_eq!(disclosure.frame_editor, Some(FrameEditor::Cube { mips_per_face: 2 }));
}

#[test]
fn test_disclosure_short_cubemap_uses_texture_editor() {
    let mut img = FakeImage::cubemap(1);
    img.frames = 5;
    let disclosure = SurfaceDisclosure::evaluate(&img, &ViewState::default());

    assert_eq!(disclosure.frame_editor, Some(FrameEditor::Texture { count: 5 }));
}

#[test]
fn test_disclosure_crop_mode_hides_alt_pictures() {
    let img = FakeImage::mipmapped(4);
    let view = ViewState {
        crop_mode: true,
        ..ViewState::default()
    };
    let disclosure = SurfaceDisclosure::evaluate(&img, &view);

    assert!(!disclosure.alt_mipmaps);
    assert_eq!(disclosure.frame_editor, Some(FrameEditor::Texture { count: 4 }));

    let disclosure = SurfaceDisclosure::evaluate(&img, &ViewState::default());
    assert!(disclosure.alt_mipmaps);
    assert_eq!(disclosure.frame_editor, Some(FrameEditor::Mipmap { count: 4 }));
}

#[test]
fn test_disclosure_alt_enabled_hides_frame_editor() {
    let mut img = FakeImage::mipmapped(4);
    img.alt_enabled = true;
    let disclosure = SurfaceDisclosure::evaluate(&img, &ViewState::default());

    assert!(disclosure.alt_mipmaps);
    assert_eq!(disclosure.frame_editor, None);
}

#[test]
fn test_disclosure_texture_array() {
    let mut img = FakeImage::new(FileType::Ktx2, 6);
    img.multi = MultiFrameType::TextureArray;
    img.alt_kind = AltPictureKind::MipmapSideBySide;
    img.mips = 3;
    img.layers = 2;
    let disclosure = SurfaceDisclosure::evaluate(&img, &ViewState::default());

    assert!(disclosure.all_mips_unified);
    assert!(disclosure.array_layer_toggles);
    // The unified view replaces the side-by-side toggle.
    assert!(!disclosure.alt_mipmaps);

    img.layers = 1;
    let disclosure = SurfaceDisclosure::evaluate(&img, &ViewState::default());
    assert!(disclosure.all_mips_unified);
    assert!(!disclosure.array_layer_toggles);
}

#[test]
fn test_single_surface_discloses_nothing() {
    let img = FakeImage::new(FileType::Dds, 1);
    assert!(!SurfaceDisclosure::evaluate(&img, &ViewState::default()).any());
}

#[test]
fn test_toggle_play_direction() {
    let mut img = FakeImage::new(FileType::Gif, 4);

    toggle_play(&mut img, false);
    assert!(img.playback.playing);
    assert!(!img.playback.play_reverse);

    toggle_play(&mut img, false);
    assert!(!img.playback.playing);

    toggle_play(&mut img, true);
    assert!(img.playback.playing);
    assert!(img.playback.play_reverse);
}

#[test]
fn test_reset_params() {
    let mut img = FakeImage::cubemap(1);
    img.params.dds.gamma = 3.0;
    img.playback.frame_num = 4;

    reset_params(&mut img, 1.8, false);
    assert_eq!(img.params, LoadParams::with_gamma(1.8));
    assert_eq!(img.playback.frame_num, 4);

    reset_params(&mut img, 2.2, true);
    assert_eq!(img.playback.frame_num, 0);
}

#[test]
fn test_panel_without_image() {
    let mut view = ViewState::default();
    assert_eq!(run_panel(None, &mut view), PanelOutcome::NoImages);
}

#[test]
fn test_panel_single_frame_png_has_nothing_to_edit() {
    let mut img = FakeImage::new(FileType::Png, 1);
    let mut view = ViewState::default();
    assert_eq!(run_panel(Some(&mut img), &mut view), PanelOutcome::NoEditableProperties);
}

#[test]
fn test_panel_tga_without_alpha_mode() {
    let mut img = FakeImage::new(FileType::Tga, 1);
    img.info.src_pixel_format = PixelFormat::R8G8B8;
    let mut view = ViewState::default();
    assert_eq!(run_panel(Some(&mut img), &mut view), PanelOutcome::NoEditableProperties);
}

#[test]
fn test_panel_sections_shown() {
    let mut view = ViewState::default();

    let mut gif = FakeImage::new(FileType::Gif, 3);
    assert_eq!(run_panel(Some(&mut gif), &mut view), PanelOutcome::Shown);

    let mut dds = FakeImage::cubemap(1);
    assert_eq!(run_panel(Some(&mut dds), &mut view), PanelOutcome::Shown);

    let mut hdr = FakeImage::new(FileType::Hdr, 1);
    hdr.info.src_pixel_format = PixelFormat::Radiance;
    assert_eq!(run_panel(Some(&mut hdr), &mut view), PanelOutcome::Shown);

    // Drawing alone never reloads.
    assert_eq!(dds.loads, 0);
    assert_eq!(hdr.loads, 0);
}

#[test]
fn test_hidden_window_draws_nothing() {
    let ctx = egui::Context::default();
    let mut view = ViewState::default();
    let mut profile = ProfileData::default();
    let mut outcome = Some(PanelOutcome::Shown);
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        outcome = show_properties_window(ctx, None, &mut view, &mut profile);
    });
    assert_eq!(outcome, None);
}

#[test]
fn test_edited_record_is_written_and_reloaded() {
    let mut img = FakeImage::cubemap(1);
    img.alt_enabled = true;
    let mut edited = img.params.clone();
    edited.dds.gamma = 1.8;

    assert!(commit_edit(&mut img, edited.clone(), false, true).unwrap());
    assert_eq!(img.params, edited);
    assert_eq!((img.unloads, img.loads), (1, 1));
    assert!(img.alt_enabled);
    assert_eq!(img.binds, 1);
}

#[test]
fn test_unchanged_record_does_not_reload() {
    let mut img = FakeImage::new(FileType::Exr, 1);
    let same = img.params.clone();

    assert!(!commit_edit(&mut img, same.clone(), false, false).unwrap());
    assert_eq!((img.unloads, img.loads), (0, 0));

    // Reset asks for a reload even when the record is already at its defaults.
    assert!(commit_edit(&mut img, same, true, false).unwrap());
    assert_eq!((img.unloads, img.loads), (1, 1));
}

#[test]
fn test_failed_edit_keeps_record_and_unloads() {
    let mut img = FakeImage::new(FileType::Hdr, 1);
    img.fail_load = true;
    let mut edited = img.params.clone();
    edited.hdr.exposure = 3;

    assert!(commit_edit(&mut img, edited.clone(), false, false).is_err());
    assert_eq!(img.params, edited);
    assert!(!img.is_loaded());
}

#[test]
fn test_cosmetic_state_never_reloads() {
    let mut view = ViewState::default();

    let mut webp = FakeImage::new(FileType::Webp, 1);
    webp.info.opacity = Opacity::Transparent;
    assert_eq!(run_panel(Some(&mut webp), &mut view), PanelOutcome::Shown);
    webp.set_override_background(true);
    assert_eq!(run_panel(Some(&mut webp), &mut view), PanelOutcome::Shown);
    assert_eq!((webp.unloads, webp.loads), (0, 0));

    let mut dds = FakeImage::mipmapped(3);
    let mut profile = ProfileData::default();
    for scrubber in [false, true, false] {
        profile.show_frame_scrubber = scrubber;
        assert_eq!(run_panel_with(Some(&mut dds), &mut view, &mut profile), PanelOutcome::Shown);
    }
    assert_eq!((dds.unloads, dds.loads), (0, 0));
}
