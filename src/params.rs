//! Per-format load parameters and the ranges their editors enforce.

use bitflags::bitflags;

/// Inclusive editing range for a numeric load parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange<T> {
    pub lo: T,
    pub hi: T,
    /// Decimal places shown by the editor. `None` for integer fields.
    pub decimals: Option<usize>,
}

impl<T: PartialOrd + Copy> ParamRange<T> {
    /// Saturating clamp. Values outside the range snap to the nearest bound.
    pub fn clamp(&self, value: T) -> T {
        if value < self.lo {
            self.lo
        } else if value > self.hi {
            self.hi
        } else {
            value
        }
    }
}

impl ParamRange<f32> {
    /// Like [`ParamRange::clamp`] but a NaN snaps to `lo`.
    pub fn clamp_f32(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.lo
        } else {
            self.clamp(value)
        }
    }
}

const fn float_range(lo: f32, hi: f32, decimals: usize) -> ParamRange<f32> {
    ParamRange { lo, hi, decimals: Some(decimals) }
}

pub const GAMMA_TEXTURE: ParamRange<f32> = float_range(0.5, 4.0, 3);
pub const GAMMA_HDR: ParamRange<f32> = float_range(0.6, 3.0, 3);
pub const GAMMA_EXR: ParamRange<f32> = float_range(0.6, 3.0, 3);
pub const EXPOSURE_TEXTURE: ParamRange<f32> = float_range(0.0, 4.0, 4);
pub const EXPOSURE_HDR: ParamRange<i32> = ParamRange { lo: -10, hi: 10, decimals: None };
pub const EXPOSURE_EXR: ParamRange<f32> = float_range(-10.0, 10.0, 3);
pub const MAX_RANGE_PVR: ParamRange<f32> = float_range(0.01, 128.0, 3);
pub const DEFOG_EXR: ParamRange<f32> = float_range(0.0, 0.1, 3);
pub const KNEE_LOW_EXR: ParamRange<f32> = float_range(-3.0, 3.0, 3);
pub const KNEE_HIGH_EXR: ParamRange<f32> = float_range(3.5, 7.5, 3);
pub const FRAME_PERIOD: ParamRange<f32> = float_range(0.0, 60.0, 4);

pub const DEFAULT_GAMMA: f32 = 2.2;

bitflags! {
    /// Decode flags shared by the texture containers (DDS, PVR, KTX/KTX2, ASTC, PKM).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        const GAMMA_COMPRESSION = 1 << 0;
        const SRGB_COMPRESSION  = 1 << 1;
        const AUTO_GAMMA        = 1 << 2;
        const TONE_MAP_EXPOSURE = 1 << 3;
        const SPREAD_LUMINANCE  = 1 << 4;
        const SWIZZLE_BGR_2_RGB = 1 << 5;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TgaFlags: u32 {
        /// Alpha 0 is transparent. When clear, alpha is read as transparency.
        const ALPHA_OPACITY = 1 << 0;
    }
}

impl TextureFlags {
    pub const GAMMA_MODE_MASK: Self = Self::GAMMA_COMPRESSION
        .union(Self::SRGB_COMPRESSION)
        .union(Self::AUTO_GAMMA);

    pub fn defaults() -> Self {
        Self::AUTO_GAMMA | Self::SPREAD_LUMINANCE
    }
}

/// Gamma correction applied at decode time. Exactly one mode at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GammaMode {
    #[default]
    None,
    Gamma,
    Srgb,
    Auto,
}

impl GammaMode {
    pub const ALL: [GammaMode; 4] = [Self::None, Self::Gamma, Self::Srgb, Self::Auto];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Gamma => "Gamma",
            Self::Srgb => "sRGB",
            Self::Auto => "Auto",
        }
    }

    /// Reads the mode from a flag set. Auto wins over sRGB, which wins over Gamma.
    pub fn from_flags(flags: TextureFlags) -> Self {
        if flags.contains(TextureFlags::AUTO_GAMMA) {
            Self::Auto
        } else if flags.contains(TextureFlags::SRGB_COMPRESSION) {
            Self::Srgb
        } else if flags.contains(TextureFlags::GAMMA_COMPRESSION) {
            Self::Gamma
        } else {
            Self::None
        }
    }

    /// Clears every gamma-mode bit then sets the one for this mode.
    pub fn apply_to(self, flags: &mut TextureFlags) {
        flags.remove(TextureFlags::GAMMA_MODE_MASK);
        match self {
            Self::None => {}
            Self::Gamma => flags.insert(TextureFlags::GAMMA_COMPRESSION),
            Self::Srgb => flags.insert(TextureFlags::SRGB_COMPRESSION),
            Self::Auto => flags.insert(TextureFlags::AUTO_GAMMA),
        }
    }
}

/// Colour profile supplied for ASTC data, which carries none of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColourProfile {
    /// LDR RGB in sRGB space, LDR linear alpha.
    #[default]
    Srgb,
    /// LDR RGB in gamma space, LDR linear alpha.
    Grgb,
    /// LDR RGBA, all linear.
    Lrgb,
    /// HDR linear RGB, LDR linear alpha.
    HdrA,
    /// HDR RGBA, all linear.
    HdrRgba,
}

impl ColourProfile {
    pub const ALL: [ColourProfile; 5] = [Self::Srgb, Self::Grgb, Self::Lrgb, Self::HdrA, Self::HdrRgba];

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::Grgb => "gRGB",
            Self::Lrgb => "lRGB",
            Self::HdrA => "HDRa",
            Self::HdrRgba => "HDRA",
        }
    }

    /// RGB components are stored linearly.
    pub fn is_linear_rgb(self) -> bool {
        matches!(self, Self::Lrgb | Self::HdrA | Self::HdrRgba)
    }
}

/// Texture-container record with gamma and exposure. Used by DDS and KTX/KTX2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureLoadParams {
    pub flags: TextureFlags,
    pub gamma: f32,
    pub exposure: f32,
}

impl TextureLoadParams {
    pub fn with_gamma(gamma: f32) -> Self {
        Self {
            flags: TextureFlags::defaults(),
            gamma: GAMMA_TEXTURE.clamp_f32(gamma),
            exposure: 1.0,
        }
    }

    pub fn gamma_mode(&self) -> GammaMode {
        GammaMode::from_flags(self.flags)
    }

    pub fn set_gamma_mode(&mut self, mode: GammaMode) {
        mode.apply_to(&mut self.flags);
    }
}

impl Default for TextureLoadParams {
    fn default() -> Self {
        Self::with_gamma(DEFAULT_GAMMA)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PvrLoadParams {
    pub flags: TextureFlags,
    pub gamma: f32,
    pub exposure: f32,
    /// Scale used when decoding RGBM and RGBD pixels.
    pub max_range: f32,
}

impl PvrLoadParams {
    pub fn with_gamma(gamma: f32) -> Self {
        Self {
            flags: TextureFlags::defaults(),
            gamma: GAMMA_TEXTURE.clamp_f32(gamma),
            exposure: 1.0,
            max_range: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AstcLoadParams {
    pub flags: TextureFlags,
    pub gamma: f32,
    pub exposure: f32,
    pub profile: ColourProfile,
}

impl AstcLoadParams {
    pub fn with_gamma(gamma: f32) -> Self {
        Self {
            flags: TextureFlags::defaults(),
            gamma: GAMMA_TEXTURE.clamp_f32(gamma),
            exposure: 1.0,
            profile: ColourProfile::Srgb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PkmLoadParams {
    pub flags: TextureFlags,
    pub gamma: f32,
}

impl PkmLoadParams {
    pub fn with_gamma(gamma: f32) -> Self {
        Self {
            flags: TextureFlags::defaults(),
            gamma: GAMMA_TEXTURE.clamp_f32(gamma),
        }
    }
}

/// Radiance HDR. Exposure is in whole stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HdrLoadParams {
    pub gamma: f32,
    pub exposure: i32,
}

impl HdrLoadParams {
    pub fn with_gamma(gamma: f32) -> Self {
        Self { gamma: GAMMA_HDR.clamp_f32(gamma), exposure: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExrLoadParams {
    pub gamma: f32,
    pub exposure: f32,
    pub defog: f32,
    pub knee_low: f32,
    pub knee_high: f32,
}

impl ExrLoadParams {
    pub fn with_gamma(gamma: f32) -> Self {
        Self {
            gamma: GAMMA_EXR.clamp_f32(gamma),
            exposure: 1.0,
            defog: 0.0,
            knee_low: 0.0,
            knee_high: 3.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TgaLoadParams {
    pub flags: TgaFlags,
}

impl Default for TgaLoadParams {
    fn default() -> Self {
        Self { flags: TgaFlags::ALPHA_OPACITY }
    }
}

/// Every per-format record an image owns. Only the one matching its file type is used.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadParams {
    pub dds: TextureLoadParams,
    pub ktx: TextureLoadParams,
    pub pvr: PvrLoadParams,
    pub astc: AstcLoadParams,
    pub pkm: PkmLoadParams,
    pub hdr: HdrLoadParams,
    pub exr: ExrLoadParams,
    pub tga: TgaLoadParams,
}

impl LoadParams {
    /// Library defaults with the profile's preferred gamma.
    pub fn with_gamma(gamma: f32) -> Self {
        Self {
            dds: TextureLoadParams::with_gamma(gamma),
            ktx: TextureLoadParams::with_gamma(gamma),
            pvr: PvrLoadParams::with_gamma(gamma),
            astc: AstcLoadParams::with_gamma(gamma),
            pkm: PkmLoadParams::with_gamma(gamma),
            hdr: HdrLoadParams::with_gamma(gamma),
            exr: ExrLoadParams::with_gamma(gamma),
            tga: TgaLoadParams::default(),
        }
    }
}

impl Default for LoadParams {
    fn default() -> Self {
        Self::with_gamma(DEFAULT_GAMMA)
    }
}
