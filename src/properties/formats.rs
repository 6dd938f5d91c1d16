//! Per-format sections of the properties window.
//!
//! Edits are made on a copy of the image's [`LoadParams`] and written back, then the image is
//! reloaded if any load parameter changed. Cosmetic toggles never reload.

use tracing::{debug, warn};

use crate::config::ProfileData;
use crate::image::{FileType, LoadError, Opacity, PixelFormat, ViewerImage};
use crate::params::{ColourProfile, GammaMode, LoadParams, TextureFlags, TgaFlags};
use crate::state::ViewState;

use super::multi_surface::show_multi_surface;
use super::widgets::{
    exposure_row, flag_checkbox, float_field, help_mark, int_field, scrubber_and_reset, DEFOG_FIELD,
    EXPOSURE_EXR_FIELD, EXPOSURE_HDR_FIELD, GAMMA_CORR_HELP, GAMMA_EXR_FIELD, GAMMA_FIELD,
    GAMMA_HDR_FIELD, KNEE_HIGH_FIELD, KNEE_LOW_FIELD, MAX_RANGE_FIELD,
};

/// How a format section ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    /// The section owns the whole window. No frame section follows.
    Complete { any_displayed: bool },
    /// The general frame section may follow.
    FallThrough { displayed: bool },
}

pub trait FormatEditor: Sync {
    /// Used in "No <name> Properties Available".
    fn name(&self) -> &'static str;

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome;
}

static DDS_EDITOR: TextureEditor = TextureEditor { kind: TextureKind::Dds };
static PVR_EDITOR: TextureEditor = TextureEditor { kind: TextureKind::Pvr };
static KTX_EDITOR: TextureEditor = TextureEditor { kind: TextureKind::Ktx };
static ASTC_EDITOR: AstcEditor = AstcEditor;
static PKM_EDITOR: PkmEditor = PkmEditor;
static HDR_EDITOR: HdrEditor = HdrEditor;
static EXR_EDITOR: ExrEditor = ExrEditor;
static TGA_EDITOR: TgaEditor = TgaEditor;
static WEBP_EDITOR: WebpEditor = WebpEditor;

/// The section for a file type, if it has one.
pub fn editor_for(file_type: FileType) -> Option<&'static dyn FormatEditor> {
    match file_type {
        FileType::Dds => Some(&DDS_EDITOR),
        FileType::Pvr => Some(&PVR_EDITOR),
        FileType::Ktx | FileType::Ktx2 => Some(&KTX_EDITOR),
        FileType::Astc => Some(&ASTC_EDITOR),
        FileType::Pkm => Some(&PKM_EDITOR),
        FileType::Hdr => Some(&HDR_EDITOR),
        FileType::Exr => Some(&EXR_EDITOR),
        FileType::Tga => Some(&TGA_EDITOR),
        FileType::Webp => Some(&WEBP_EDITOR),
        FileType::Gif | FileType::Png | FileType::Jpg | FileType::Bmp | FileType::Unknown => None,
    }
}

/// Unloads and loads the image with its current parameters. When the alt picture was on
/// before, it is turned back on and bound. A failure leaves the image unloaded.
pub fn commit_reload(image: &mut dyn ViewerImage, restore_alt: bool) -> Result<(), LoadError> {
    image.unload();
    image.load()?;
    if restore_alt {
        image.enable_alt_picture(true);
        image.bind();
    }
    debug!("reloaded {:?} image with new load parameters", image.file_type());
    Ok(())
}

/// Defaults with the profile gamma. Texture containers also go back to the first frame.
pub fn reset_params(image: &mut dyn ViewerImage, default_gamma: f32, reset_frame: bool) {
    image.reset_load_params(default_gamma);
    if reset_frame {
        image.set_frame_num(0);
    }
}

/// Writes an edited record back and reloads when it differs from the image's record or when
/// `force_reload` is set. Returns whether a reload happened.
pub fn commit_edit(
    image: &mut dyn ViewerImage,
    edited: LoadParams,
    force_reload: bool,
    restore_alt: bool,
) -> Result<bool, LoadError> {
    let changed = *image.load_params() != edited;
    if changed {
        *image.load_params_mut() = edited;
    }
    if !changed && !force_reload {
        return Ok(false);
    }
    commit_reload(image, restore_alt)?;
    Ok(true)
}

fn finish(image: &mut dyn ViewerImage, params: LoadParams, reload: bool, restore_alt: bool) {
    // The window checks is_loaded after the section, so a failure shows in the same frame.
    if let Err(e) = commit_edit(image, params, reload, restore_alt) {
        warn!("reload after property change failed: {e}");
    }
}

/// Resets the image's parameters and returns the fresh record.
fn reset_record(image: &mut dyn ViewerImage, default_gamma: f32, reset_frame: bool) -> LoadParams {
    reset_params(image, default_gamma, reset_frame);
    image.load_params().clone()
}

fn gamma_mode_combo(ui: &mut egui::Ui, flags: &mut TextureFlags) -> bool {
    let before = GammaMode::from_flags(*flags);
    let mut mode = before;
    ui.horizontal(|ui| {
        egui::ComboBox::from_label("Gamma Corr")
            .selected_text(mode.label())
            .show_ui(ui, |ui| {
                for m in GammaMode::ALL {
                    ui.selectable_value(&mut mode, m, m.label());
                }
            });
        help_mark(ui, GAMMA_CORR_HELP);
    });
    if mode != before {
        mode.apply_to(flags);
        true
    } else {
        false
    }
}

/// Gamma-mode combo followed by the gamma field when the mode is Gamma.
fn gamma_controls(ui: &mut egui::Ui, flags: &mut TextureFlags, gamma: &mut f32) -> bool {
    let mut changed = gamma_mode_combo(ui, flags);
    if GammaMode::from_flags(*flags) == GammaMode::Gamma {
        changed |= float_field(ui, &GAMMA_FIELD, gamma);
    }
    changed
}

fn spread_luminance(ui: &mut egui::Ui, flags: &mut TextureFlags) -> bool {
    flag_checkbox(
        ui,
        flags,
        TextureFlags::SPREAD_LUMINANCE,
        "Spread Luminance",
        "Luminance-only textures are shown with a red channel only.\n\
         When set the channel is spread to RGB to give a grey-scale image.",
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureKind {
    Dds,
    Pvr,
    Ktx,
}

/// Shared section for DDS, PVR and KTX/KTX2.
struct TextureEditor {
    kind: TextureKind,
}

/// Mutable view of the fields the texture containers have in common.
struct TextureFields<'a> {
    flags: &'a mut TextureFlags,
    gamma: &'a mut f32,
    exposure: &'a mut f32,
    max_range: Option<&'a mut f32>,
}

impl TextureEditor {
    fn fields<'a>(&self, params: &'a mut LoadParams) -> TextureFields<'a> {
        match self.kind {
            TextureKind::Dds => TextureFields {
                flags: &mut params.dds.flags,
                gamma: &mut params.dds.gamma,
                exposure: &mut params.dds.exposure,
                max_range: None,
            },
            TextureKind::Ktx => TextureFields {
                flags: &mut params.ktx.flags,
                gamma: &mut params.ktx.gamma,
                exposure: &mut params.ktx.exposure,
                max_range: None,
            },
            TextureKind::Pvr => TextureFields {
                flags: &mut params.pvr.flags,
                gamma: &mut params.pvr.gamma,
                exposure: &mut params.pvr.exposure,
                max_range: Some(&mut params.pvr.max_range),
            },
        }
    }

    fn shows_swizzle(&self, format: PixelFormat) -> bool {
        self.kind != TextureKind::Pvr && format.is_etc()
    }

    fn shows_exposure(&self, format: PixelFormat, profile: Option<ColourProfile>) -> bool {
        match self.kind {
            TextureKind::Dds | TextureKind::Pvr => format.is_hdr() || format.is_astc(),
            TextureKind::Ktx => {
                let linear = profile.is_some_and(ColourProfile::is_linear_rgb);
                !format.is_etc() && !format.is_eac() && (format.is_hdr() || linear)
            }
        }
    }
}

impl FormatEditor for TextureEditor {
    fn name(&self) -> &'static str {
        match self.kind {
            TextureKind::Dds => "DDS",
            TextureKind::Pvr => "PVR",
            TextureKind::Ktx => "KTX/KTX2",
        }
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome {
        let mut any_displayed = show_multi_surface(ui, image, view);

        // Read after the multi-surface toggles so a newly enabled alt picture survives reload.
        let alt_enabled = image.is_alt_picture_enabled();
        let info = image.info();
        let format = info.src_pixel_format;
        let num_frames = image.num_frames();

        let mut params = image.load_params().clone();
        let mut reload = false;
        {
            let fields = self.fields(&mut params);

            if self.shows_swizzle(format) {
                reload |= flag_checkbox(
                    ui,
                    fields.flags,
                    TextureFlags::SWIZZLE_BGR_2_RGB,
                    "SwizzleBGRToRGB",
                    "Some ETC encoders write BGR instead of RGB. Swaps the red and blue channels.",
                );
                any_displayed = true;
            }

            reload |= gamma_controls(ui, fields.flags, fields.gamma);
            any_displayed = true;

            if self.shows_exposure(format, info.src_colour_profile) {
                reload |= exposure_row(ui, fields.flags, fields.exposure);
            }

            if let Some(max_range) = fields.max_range {
                if format.is_rgbm_or_rgbd() {
                    reload |= float_field(ui, &MAX_RANGE_FIELD, max_range);
                }
            }

            if format.is_luminance() {
                reload |= spread_luminance(ui, fields.flags);
            }
        }

        let scrubber = if num_frames >= 2 && !alt_enabled {
            any_displayed = true;
            Some(&mut profile.show_frame_scrubber)
        } else {
            None
        };

        if any_displayed && scrubber_and_reset(ui, scrubber) {
            params = reset_record(image, profile.default_gamma, true);
            reload = true;
        }

        finish(image, params, reload, alt_enabled);
        SectionOutcome::Complete { any_displayed }
    }
}

struct AstcEditor;

impl FormatEditor for AstcEditor {
    fn name(&self) -> &'static str {
        "ASTC"
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        _view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome {
        let mut params = image.load_params().astc;
        let mut reload = false;

        let before = params.profile;
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Colour Profile")
                .selected_text(params.profile.short_name())
                .show_ui(ui, |ui| {
                    for p in ColourProfile::ALL {
                        ui.selectable_value(&mut params.profile, p, p.short_name());
                    }
                });
            help_mark(
                ui,
                "ASTC files carry no colour profile of their own.\n\
                 sRGB : LDR RGB in sRGB space, linear alpha.\n\
                 gRGB : LDR RGB in gamma space, linear alpha.\n\
                 lRGB : LDR RGBA, all linear.\n\
                 HDRa : HDR linear RGB, LDR linear alpha.\n\
                 HDRA : HDR RGBA, all linear.",
            );
        });
        reload |= params.profile != before;

        reload |= gamma_controls(ui, &mut params.flags, &mut params.gamma);
        // HDR blocks aren't detected, so exposure is always offered.
        reload |= exposure_row(ui, &mut params.flags, &mut params.exposure);

        let mut all = image.load_params().clone();
        all.astc = params;

        if scrubber_and_reset(ui, None) {
            all = reset_record(image, profile.default_gamma, true);
            reload = true;
        }

        finish(image, all, reload, false);
        SectionOutcome::Complete { any_displayed: true }
    }
}

struct PkmEditor;

impl FormatEditor for PkmEditor {
    fn name(&self) -> &'static str {
        "PKM"
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        _view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome {
        let format = image.info().src_pixel_format;
        let mut params = image.load_params().clone();

        let mut reload = gamma_controls(ui, &mut params.pkm.flags, &mut params.pkm.gamma);
        if format.is_luminance() {
            reload |= spread_luminance(ui, &mut params.pkm.flags);
        }

        if scrubber_and_reset(ui, None) {
            params = reset_record(image, profile.default_gamma, false);
            reload = true;
        }

        finish(image, params, reload, false);
        SectionOutcome::Complete { any_displayed: true }
    }
}

struct HdrEditor;

impl FormatEditor for HdrEditor {
    fn name(&self) -> &'static str {
        "Radiance HDR"
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        _view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome {
        ui.label(self.name());
        let mut params = image.load_params().clone();

        let mut reload = float_field(ui, &GAMMA_HDR_FIELD, &mut params.hdr.gamma);
        reload |= int_field(ui, &EXPOSURE_HDR_FIELD, &mut params.hdr.exposure);

        if scrubber_and_reset(ui, None) {
            params = reset_record(image, profile.default_gamma, false);
            reload = true;
        }

        finish(image, params, reload, false);
        SectionOutcome::FallThrough { displayed: true }
    }
}

struct ExrEditor;

impl FormatEditor for ExrEditor {
    fn name(&self) -> &'static str {
        "OpenEXR"
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        _view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome {
        ui.label(self.name());
        let mut params = image.load_params().clone();
        let exr = &mut params.exr;

        let mut reload = float_field(ui, &GAMMA_EXR_FIELD, &mut exr.gamma);
        reload |= float_field(ui, &EXPOSURE_EXR_FIELD, &mut exr.exposure);
        reload |= float_field(ui, &DEFOG_FIELD, &mut exr.defog);
        reload |= float_field(ui, &KNEE_LOW_FIELD, &mut exr.knee_low);
        reload |= float_field(ui, &KNEE_HIGH_FIELD, &mut exr.knee_high);

        if scrubber_and_reset(ui, None) {
            params = reset_record(image, profile.default_gamma, false);
            reload = true;
        }

        finish(image, params, reload, false);
        SectionOutcome::FallThrough { displayed: true }
    }
}

struct TgaEditor;

impl FormatEditor for TgaEditor {
    fn name(&self) -> &'static str {
        "Truevision TGA"
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        _view: &mut ViewState,
        profile: &mut ProfileData,
    ) -> SectionOutcome {
        if !image.info().src_pixel_format.has_tga_alpha_mode() {
            return SectionOutcome::FallThrough { displayed: false };
        }

        ui.label(self.name());
        let mut params = image.load_params().clone();
        let mut reload = flag_checkbox(
            ui,
            &mut params.tga.flags,
            TgaFlags::ALPHA_OPACITY,
            "Alpha Is Opacity",
            "When set, alpha 0 is fully transparent and 255 is opaque.\n\
             When clear, the alpha channel is read as transparency and inverted.",
        );

        if scrubber_and_reset(ui, None) {
            params = reset_record(image, profile.default_gamma, false);
            reload = true;
        }

        finish(image, params, reload, false);
        SectionOutcome::FallThrough { displayed: true }
    }
}

struct WebpEditor;

impl FormatEditor for WebpEditor {
    fn name(&self) -> &'static str {
        "WebP"
    }

    fn show(
        &self,
        ui: &mut egui::Ui,
        image: &mut dyn ViewerImage,
        _view: &mut ViewState,
        _profile: &mut ProfileData,
    ) -> SectionOutcome {
        if image.info().opacity == Opacity::Opaque {
            return SectionOutcome::FallThrough { displayed: false };
        }

        let mut override_background = image.override_background();
        ui.horizontal(|ui| {
            if ui.checkbox(&mut override_background, "Override Background").changed() {
                image.set_override_background(override_background);
            }
            help_mark(
                ui,
                "WebP files store a background canvas colour. Animated files carry one and\n\
                 stills default to white. When set, the viewer background is ignored and the\n\
                 WebP colour is drawn behind this image instead.",
            );
        });

        SectionOutcome::FallThrough { displayed: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_dispatch() {
        assert_eq!(editor_for(FileType::Dds).map(|e| e.name()), Some("DDS"));
        assert_eq!(editor_for(FileType::Ktx2).map(|e| e.name()), Some("KTX/KTX2"));
        assert_eq!(editor_for(FileType::Exr).map(|e| e.name()), Some("OpenEXR"));
        assert!(editor_for(FileType::Png).is_none());
        assert!(editor_for(FileType::Gif).is_none());
    }

    #[test]
    fn test_exposure_disclosure_per_container() {
        let dds = TextureEditor { kind: TextureKind::Dds };
        assert!(dds.shows_exposure(PixelFormat::Bc6U, None));
        assert!(dds.shows_exposure(PixelFormat::Astc8x8, None));
        assert!(!dds.shows_exposure(PixelFormat::Bc7, None));

        let ktx = TextureEditor { kind: TextureKind::Ktx };
        assert!(ktx.shows_exposure(PixelFormat::R8G8B8A8, Some(ColourProfile::Lrgb)));
        assert!(!ktx.shows_exposure(PixelFormat::R8G8B8A8, Some(ColourProfile::Srgb)));
        assert!(!ktx.shows_exposure(PixelFormat::EacR11, Some(ColourProfile::HdrA)));
        assert!(ktx.shows_exposure(PixelFormat::R16G16B16A16F, None));
    }

    #[test]
    fn test_swizzle_offered_for_etc_outside_pvr() {
        let pvr = TextureEditor { kind: TextureKind::Pvr };
        let dds = TextureEditor { kind: TextureKind::Dds };
        assert!(!pvr.shows_swizzle(PixelFormat::Etc1));
        assert!(dds.shows_swizzle(PixelFormat::Etc2Rgb));
        assert!(!dds.shows_swizzle(PixelFormat::Bc1));
    }
}
