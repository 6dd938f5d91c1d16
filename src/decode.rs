//! Applies load parameters to decoded linear RGBA float pixels and packs them for upload.
//!
//! Every function takes interleaved RGBA `f32` data, four values per pixel.

use crate::image::PixelFormat;
use crate::params::{
    ExrLoadParams, GammaMode, HdrLoadParams, TextureFlags, TextureLoadParams, TgaFlags, TgaLoadParams,
};

/// Linear to sRGB transfer for one channel value.
pub fn srgb_encode(l: f32) -> f32 {
    if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

fn for_each_rgb(pixels: &mut [f32], mut f: impl FnMut(f32) -> f32) {
    for px in pixels.chunks_exact_mut(4) {
        px[0] = f(px[0]);
        px[1] = f(px[1]);
        px[2] = f(px[2]);
    }
}

/// The texture container pipeline (DDS, PVR, KTX, ASTC, PKM).
pub fn apply_texture_params(pixels: &mut [f32], params: &TextureLoadParams, format: PixelFormat) {
    let flags = params.flags;

    if flags.contains(TextureFlags::SWIZZLE_BGR_2_RGB) && format.is_etc() {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }

    if flags.contains(TextureFlags::SPREAD_LUMINANCE) && format.is_luminance() {
        for px in pixels.chunks_exact_mut(4) {
            px[1] = px[0];
            px[2] = px[0];
        }
    }

    if flags.contains(TextureFlags::TONE_MAP_EXPOSURE) {
        let exposure = params.exposure;
        for_each_rgb(pixels, |v| v * exposure);
    }

    match params.gamma_mode() {
        GammaMode::None => {}
        GammaMode::Gamma => {
            let inv = 1.0 / params.gamma;
            for_each_rgb(pixels, |v| v.max(0.0).powf(inv));
        }
        GammaMode::Srgb => for_each_rgb(pixels, |v| srgb_encode(v.max(0.0))),
        // Only linear HDR data is compressed automatically. LDR formats are already display encoded.
        GammaMode::Auto => {
            if format.is_hdr() {
                for_each_rgb(pixels, |v| srgb_encode(v.max(0.0)));
            }
        }
    }
}

/// Radiance HDR: scale by whole stops then gamma.
pub fn apply_hdr_params(pixels: &mut [f32], params: &HdrLoadParams) {
    let scale = 2.0_f32.powi(params.exposure);
    let inv = 1.0 / params.gamma;
    for_each_rgb(pixels, |v| (v * scale).max(0.0).powf(inv));
}

/// Output of the EXR knee curve at the top of the display range.
const EXR_KNEE_TARGET_STOPS: f32 = 3.5;
/// Maps knee output to 8-bit so that 2^3.5 lands just under full scale.
const EXR_DISPLAY_SCALE: f32 = 84.66;
/// Exposure bias so that exposure 0 puts middle grey mid-screen.
const EXR_EXPOSURE_BIAS: f32 = 2.473_93;

fn knee(x: f32, f: f32) -> f32 {
    (x * f).ln_1p() / f
}

/// Finds `f` such that `knee(x, f) == y`.
fn find_knee_f(x: f32, y: f32) -> f32 {
    let mut f0 = 0.0_f32;
    let mut f1 = 1.0_f32;

    while knee(x, f1) > y {
        f0 = f1;
        f1 *= 2.0;
    }

    for _ in 0..30 {
        let f2 = (f0 + f1) / 2.0;
        if knee(x, f2) < y {
            f1 = f2;
        } else {
            f0 = f2;
        }
    }

    (f0 + f1) / 2.0
}

/// Precomputed EXR display transform for one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct ExrTransform {
    multiplier: f32,
    defog: f32,
    knee_low: f32,
    knee_f: f32,
    inv_gamma: f32,
}

impl ExrTransform {
    pub fn new(params: &ExrLoadParams) -> Self {
        let knee_low = 2.0_f32.powf(params.knee_low);
        let knee_high = 2.0_f32.powf(params.knee_high);
        let target = 2.0_f32.powf(EXR_KNEE_TARGET_STOPS) - knee_low;
        Self {
            multiplier: 2.0_f32.powf(params.exposure + EXR_EXPOSURE_BIAS),
            defog: params.defog,
            knee_low,
            knee_f: find_knee_f(knee_high - knee_low, target),
            inv_gamma: 1.0 / params.gamma,
        }
    }

    /// Maps one linear channel value to a display value in `[0, 1]`.
    pub fn apply(&self, v: f32) -> f32 {
        let mut x = (v - self.defog).max(0.0) * self.multiplier;
        if x > self.knee_low {
            x = self.knee_low + knee(x - self.knee_low, self.knee_f);
        }
        let x = x.powf(self.inv_gamma) * EXR_DISPLAY_SCALE;
        x.clamp(0.0, 255.0) / 255.0
    }
}

pub fn apply_exr_params(pixels: &mut [f32], params: &ExrLoadParams) {
    let transform = ExrTransform::new(params);
    for_each_rgb(pixels, |v| transform.apply(v));
}

/// With alpha-opacity off the stored alpha is treated as transparency and inverted.
pub fn apply_tga_params(pixels: &mut [f32], params: &TgaLoadParams, format: PixelFormat) {
    if params.flags.contains(TgaFlags::ALPHA_OPACITY) || !format.has_tga_alpha_mode() {
        return;
    }
    for px in pixels.chunks_exact_mut(4) {
        px[3] = 1.0 - px[3];
    }
}

/// Packs to 8-bit RGBA, clamping to `[0, 1]`.
pub fn to_rgba8(pixels: &[f32]) -> Vec<u8> {
    pixels
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

pub fn from_rgba8(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&b| b as f32 / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_srgb_encode_matches_standard_curve() {
        assert_eq!(srgb_encode(0.0), 0.0);
        assert!(approx(srgb_encode(0.002), 0.02584));
        assert!(approx(srgb_encode(1.0), 1.0));
        assert!(approx(srgb_encode(0.5), 0.73536));
    }

    #[test]
    fn test_exposure_disabled_leaves_values_untouched() {
        let mut params = TextureLoadParams::default();
        params.set_gamma_mode(GammaMode::None);
        params.exposure = 3.0;

        let original = vec![0.2, 0.4, 0.6, 1.0];
        let mut pixels = original.clone();
        apply_texture_params(&mut pixels, &params, PixelFormat::Bc1);
        assert_eq!(pixels, original);

        params.flags.insert(TextureFlags::TONE_MAP_EXPOSURE);
        apply_texture_params(&mut pixels, &params, PixelFormat::Bc1);
        assert!(approx(pixels[0], 0.6));
        assert_eq!(pixels[3], 1.0);
    }

    #[test]
    fn test_auto_gamma_only_touches_hdr_formats() {
        let params = TextureLoadParams::default();
        let mut ldr = vec![0.5, 0.5, 0.5, 1.0];
        apply_texture_params(&mut ldr, &params, PixelFormat::Bc7);
        assert_eq!(ldr[0], 0.5);

        let mut hdr = vec![0.5, 0.5, 0.5, 1.0];
        apply_texture_params(&mut hdr, &params, PixelFormat::Bc6U);
        assert!(approx(hdr[0], srgb_encode(0.5)));
    }

    #[test]
    fn test_spread_luminance_and_swizzle() {
        let params = TextureLoadParams::default();
        let mut lum = vec![0.3, 0.0, 0.0, 1.0];
        apply_texture_params(&mut lum, &params, PixelFormat::L8);
        assert_eq!(&lum[..3], &[0.3, 0.3, 0.3]);

        let mut params = TextureLoadParams::default();
        params.flags = TextureFlags::SWIZZLE_BGR_2_RGB;
        let mut etc = vec![0.1, 0.2, 0.9, 1.0];
        apply_texture_params(&mut etc, &params, PixelFormat::Etc2Rgb);
        assert_eq!(&etc[..3], &[0.9, 0.2, 0.1]);

        let mut bc = vec![0.1, 0.2, 0.9, 1.0];
        apply_texture_params(&mut bc, &params, PixelFormat::Bc1);
        assert_eq!(&bc[..3], &[0.1, 0.2, 0.9]);
    }

    #[test]
    fn test_hdr_exposure_is_in_stops() {
        let params = HdrLoadParams { gamma: 1.0, exposure: 2 };
        let mut pixels = vec![0.1, 0.2, 0.25, 0.5];
        apply_hdr_params(&mut pixels, &params);
        assert!(approx(pixels[0], 0.4));
        assert!(approx(pixels[2], 1.0));
        assert_eq!(pixels[3], 0.5);
    }

    #[test]
    fn test_exr_knee_is_monotonic() {
        let mut params = ExrLoadParams::with_gamma(2.2);
        params.knee_high = 5.0;
        let transform = ExrTransform::new(&params);
        let mut prev = transform.apply(0.0);
        for i in 1..400 {
            let v = transform.apply(i as f32 * 0.05);
            assert!(v >= prev, "knee decreased at step {i}");
            prev = v;
        }
        assert!(prev <= 1.0);
    }

    #[test]
    fn test_exr_defog_clips_dark_values() {
        let mut params = ExrLoadParams::with_gamma(2.2);
        params.defog = 0.05;
        let transform = ExrTransform::new(&params);
        assert_eq!(transform.apply(0.04), 0.0);
        assert!(transform.apply(0.06) > 0.0);
    }

    #[test]
    fn test_find_knee_f_hits_target() {
        let f = find_knee_f(10.0, 3.0);
        assert!((knee(10.0, f) - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_tga_alpha_inverted_without_opacity_flag() {
        let mut params = TgaLoadParams::default();
        let mut pixels = vec![1.0, 1.0, 1.0, 0.25];
        apply_tga_params(&mut pixels, &params, PixelFormat::R8G8B8A8);
        assert_eq!(pixels[3], 0.25);

        params.flags = TgaFlags::empty();
        apply_tga_params(&mut pixels, &params, PixelFormat::R8G8B8A8);
        assert_eq!(pixels[3], 0.75);
    }

    #[test]
    fn test_to_rgba8_clamps() {
        assert_eq!(to_rgba8(&[-1.0, 0.5, 2.0, 1.0]), vec![0, 128, 255, 255]);
    }
}
