//! The image contract the viewer and the properties window work against.
//!
//! `LoadedImage` in `image_loader` is the real implementation. Anything else that
//! implements [`ViewerImage`] can be driven by the properties window.

use std::path::Path;

use thiserror::Error;

use crate::params::{ColourProfile, LoadParams};
use crate::playback::FramePlayback;

/// Errors returned when loading an image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("{0:?} images are not supported by this build")]
    UnsupportedFormat(FileType),
    #[error("{0} contains no frames")]
    Empty(String),
}

/// Container type, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Dds,
    Pvr,
    Ktx,
    Ktx2,
    Astc,
    Pkm,
    Hdr,
    Exr,
    Tga,
    Webp,
    Gif,
    Png,
    Jpg,
    Bmp,
    Unknown,
}

impl FileType {
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] = &[
        "dds", "pvr", "ktx", "ktx2", "astc", "atc", "pkm", "hdr", "exr", "tga", "webp", "gif", "png",
        "jpg", "jpeg", "bmp",
    ];

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "dds" => Self::Dds,
            "pvr" => Self::Pvr,
            "ktx" => Self::Ktx,
            "ktx2" => Self::Ktx2,
            "astc" | "atc" => Self::Astc,
            "pkm" => Self::Pkm,
            "hdr" => Self::Hdr,
            "exr" => Self::Exr,
            "tga" => Self::Tga,
            "webp" => Self::Webp,
            "gif" => Self::Gif,
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpg,
            "bmp" => Self::Bmp,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

/// Source pixel format of the loaded data. Only the distinctions the viewer acts on are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Invalid,
    R8G8B8A8,
    B8G8R8A8,
    R8G8B8,
    /// 16-bit with one bit of alpha. Common in old TGA files.
    G3B5A1R5G2,
    L8,
    A8L8,
    R16F,
    R32F,
    R16G16B16A16F,
    R32G32B32A32F,
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Bc6U,
    Bc6S,
    Bc7,
    Etc1,
    Etc2Rgb,
    Etc2Rgba,
    EacR11,
    EacRg11,
    Astc4x4,
    Astc8x8,
    Astc12x12,
    Rgbm,
    Rgbd,
    Radiance,
    OpenExr,
}

impl PixelFormat {
    pub fn is_etc(self) -> bool {
        matches!(self, Self::Etc1 | Self::Etc2Rgb | Self::Etc2Rgba)
    }

    pub fn is_eac(self) -> bool {
        matches!(self, Self::EacR11 | Self::EacRg11)
    }

    pub fn is_astc(self) -> bool {
        matches!(self, Self::Astc4x4 | Self::Astc8x8 | Self::Astc12x12)
    }

    pub fn is_hdr(self) -> bool {
        matches!(
            self,
            Self::R16F
                | Self::R32F
                | Self::R16G16B16A16F
                | Self::R32G32B32A32F
                | Self::Bc6U
                | Self::Bc6S
                | Self::Radiance
                | Self::OpenExr
        )
    }

    /// Single-channel formats shown as red only unless luminance is spread.
    pub fn is_luminance(self) -> bool {
        matches!(self, Self::L8 | Self::A8L8 | Self::R16F | Self::R32F | Self::Bc4 | Self::EacR11)
    }

    pub fn is_rgbm_or_rgbd(self) -> bool {
        matches!(self, Self::Rgbm | Self::Rgbd)
    }

    /// Formats whose TGA alpha channel may be read as transparency.
    pub fn has_tga_alpha_mode(self) -> bool {
        matches!(self, Self::R8G8B8A8 | Self::G3B5A1R5G2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opacity {
    #[default]
    Opaque,
    Transparent,
    /// Frames disagree.
    Varies,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageInfo {
    pub src_pixel_format: PixelFormat,
    pub src_colour_profile: Option<ColourProfile>,
    pub opacity: Opacity,
}

/// How the frames of an image relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiFrameType {
    #[default]
    None,
    Animation,
    Mipmaps,
    Cubemap,
    TextureArray,
}

/// Combined picture an image can build from its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltPictureKind {
    #[default]
    None,
    /// All mip levels laid out left to right.
    MipmapSideBySide,
    /// Cube faces unfolded into a T.
    CubemapTLayout,
}

/// Operations the viewer needs from the current image.
pub trait ViewerImage {
    fn file_type(&self) -> FileType;
    fn is_loaded(&self) -> bool;
    fn load(&mut self) -> Result<(), LoadError>;
    fn unload(&mut self);

    fn load_params(&self) -> &LoadParams;
    fn load_params_mut(&mut self) -> &mut LoadParams;
    /// Back to defaults using the given profile gamma.
    fn reset_load_params(&mut self, default_gamma: f32);

    fn info(&self) -> ImageInfo;

    fn num_frames(&self) -> usize;
    /// Mip levels per array layer. 1 for anything that isn't a mipmapped texture array.
    fn num_mip_levels(&self) -> usize;
    fn num_array_layers(&self) -> usize;
    fn multi_frame_type(&self) -> MultiFrameType;

    fn alt_picture_kind(&self) -> AltPictureKind;
    fn is_alt_picture_enabled(&self) -> bool;
    fn enable_alt_picture(&mut self, enabled: bool);
    /// Requests that the currently selected picture is uploaded for display.
    fn bind(&mut self);

    fn playback(&self) -> &FramePlayback;
    fn playback_mut(&mut self) -> &mut FramePlayback;
    /// Own period of a frame in seconds.
    fn frame_duration(&self, frame: usize) -> f32;
    fn set_frame_duration(&mut self, seconds: f32, all_frames: bool);

    fn override_background(&self) -> bool;
    fn set_override_background(&mut self, enabled: bool);

    fn is_alt_mipmaps_picture_avail(&self) -> bool {
        self.alt_picture_kind() == AltPictureKind::MipmapSideBySide
    }

    fn is_alt_cubemap_picture_avail(&self) -> bool {
        self.alt_picture_kind() == AltPictureKind::CubemapTLayout
    }

    fn frame_num(&self) -> usize {
        self.playback().frame_num
    }

    fn set_frame_num(&mut self, frame: usize) {
        self.playback_mut().frame_num = frame;
    }

    fn play(&mut self) {
        let period = self.frame_duration(self.frame_num());
        self.playback_mut().play(period);
    }

    fn stop(&mut self) {
        self.playback_mut().stop();
    }

    /// Advances playback by `dt` seconds. Returns true when the frame changed.
    fn update_playing(&mut self, dt: f32) -> bool {
        let num_frames = self.num_frames();
        let durations: Vec<f32> = (0..num_frames).map(|i| self.frame_duration(i)).collect();
        let changed = self.playback_mut().update(dt, num_frames, |i| durations.get(i).copied().unwrap_or(0.0));
        if changed {
            self.bind();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(FileType::from_path(Path::new("a/b/sky.DDS")), FileType::Dds);
        assert_eq!(FileType::from_path(Path::new("x.jpeg")), FileType::Jpg);
        assert_eq!(FileType::from_path(Path::new("x.HDR")), FileType::Hdr);
        assert_eq!(FileType::from_path(Path::new("noext")), FileType::Unknown);
    }

    #[test]
    fn test_pixel_format_predicates() {
        assert!(PixelFormat::Etc2Rgba.is_etc());
        assert!(!PixelFormat::EacR11.is_etc());
        assert!(PixelFormat::EacR11.is_eac());
        assert!(PixelFormat::Bc6U.is_hdr());
        assert!(!PixelFormat::Bc7.is_hdr());
        assert!(PixelFormat::L8.is_luminance());
        assert!(PixelFormat::Rgbd.is_rgbm_or_rgbd());
        assert!(PixelFormat::G3B5A1R5G2.has_tga_alpha_mode());
        assert!(!PixelFormat::R8G8B8.has_tga_alpha_mode());
    }

    #[test]
    fn test_load_error_messages() {
        let err = LoadError::UnsupportedFormat(FileType::Pvr);
        assert_eq!(err.to_string(), "Pvr images are not supported by this build");
        let err = LoadError::Empty("anim.gif".into());
        assert_eq!(err.to_string(), "anim.gif contains no frames");
    }
}
