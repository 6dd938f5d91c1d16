//! Image loading and management module.
//! Decodes DDS (mipmaps, cubemaps, arrays), GIF, WEBP, HDR, EXR, TGA, PNG, JPG and BMP files
//! and applies the per-format load parameters.

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ddsfile::Dds;
use image::AnimationDecoder;
use image_dds::{dds_image_format, ImageFormat, Surface};
use tracing::{debug, info};

use crate::decode;
use crate::frame_index::CUBE_FACES;
use crate::image::{
    AltPictureKind, FileType, ImageInfo, LoadError, MultiFrameType, Opacity, PixelFormat, ViewerImage,
};
use crate::params::{LoadParams, FRAME_PERIOD};
use crate::playback::FramePlayback;
use crate::state::ViewState;

/// Canvas colour assumed for WebP files that don't store one.
const WEBP_DEFAULT_BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Period used for animation frames that don't carry one.
const DEFAULT_FRAME_PERIOD: f32 = 0.1;

/// DDS stores faces as +X -X +Y -Y +Z -Z. Frames are shown as +Z -Z +X -X +Y -Y.
const CUBE_DISPLAY_ORDER: [usize; CUBE_FACES] = [4, 5, 0, 1, 2, 3];

/// Check if a file is a supported image
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FileType::SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Get all images in the same directory as the given path, in natural order.
pub fn get_images_in_directory(path: &Path) -> Vec<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => return vec![path.to_path_buf()],
    };

    let mut images: Vec<PathBuf> = std::fs::read_dir(parent)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_supported_image(p))
        .collect();

    images.sort_by(|a, b| {
        natord::compare(
            a.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            b.file_name().and_then(|n| n.to_str()).unwrap_or(""),
        )
    });

    images
}

/// One displayable surface: an animation frame, a mip level or a cube face.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Seconds this picture stays up while playing.
    pub duration: f32,
}

impl Picture {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            width,
            height,
            duration: 0.0,
        }
    }

    fn from_f32(width: u32, height: u32, pixels: &[f32]) -> Self {
        Self {
            pixels: decode::to_rgba8(pixels),
            width,
            height,
            duration: 0.0,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 255)
    }

    /// Copies `src` with its top-left corner at (x, y). Parts outside the canvas are dropped.
    fn blit(&mut self, src: &Picture, x: u32, y: u32) {
        let dst_w = self.width as usize;
        for row in 0..src.height as usize {
            let dst_y = y as usize + row;
            if dst_y >= self.height as usize {
                break;
            }
            let copy_w = (src.width as usize).min(dst_w.saturating_sub(x as usize));
            let src_start = row * src.width as usize * 4;
            let dst_start = (dst_y * dst_w + x as usize) * 4;
            self.pixels[dst_start..dst_start + copy_w * 4]
                .copy_from_slice(&src.pixels[src_start..src_start + copy_w * 4]);
        }
    }
}

/// Lays rows of pictures out top to bottom, each row left to right.
fn compose_grid(rows: &[Vec<&Picture>]) -> Picture {
    let width = rows
        .iter()
        .map(|row| row.iter().map(|p| p.width).sum::<u32>())
        .max()
        .unwrap_or(0);
    let height = rows
        .iter()
        .map(|row| row.iter().map(|p| p.height).max().unwrap_or(0))
        .sum::<u32>();

    let mut canvas = Picture::blank(width, height);
    let mut y = 0;
    for row in rows {
        let mut x = 0;
        for pic in row {
            canvas.blit(pic, x, y);
            x += pic.width;
        }
        y += row.iter().map(|p| p.height).max().unwrap_or(0);
    }
    canvas
}

/// Every mip level left to right, top aligned.
pub fn build_mipmap_side_by_side(mips: &[Picture]) -> Picture {
    compose_grid(&[mips.iter().collect()])
}

/// Unfolds six equally sized faces, given in display order (+Z -Z +X -X +Y -Y), into a T.
///
/// ```text
///       +Y
///   -X  +Z  +X  -Z
///       -Y
/// ```
pub fn build_cubemap_t_layout(faces: &[&Picture; CUBE_FACES]) -> Picture {
    let w = faces[0].width;
    let h = faces[0].height;
    let mut canvas = Picture::blank(w * 4, h * 3);
    let origins = [(w, h), (3 * w, h), (2 * w, h), (0, h), (w, 0), (w, 2 * h)];
    for (face, (x, y)) in faces.iter().zip(origins) {
        canvas.blit(face, x, y);
    }
    canvas
}

/// One decoded DDS layer/mip chain before it becomes frames.
struct DdsSurface {
    format: PixelFormat,
    layers: usize,
    mips: usize,
    is_cubemap: bool,
    /// Layer-major, mip-minor.
    pictures: Vec<Picture>,
}

fn dds_pixel_format(format: ImageFormat) -> PixelFormat {
    match format {
        ImageFormat::R8Unorm => PixelFormat::L8,
        ImageFormat::Rgba8Unorm | ImageFormat::Rgba8UnormSrgb => PixelFormat::R8G8B8A8,
        ImageFormat::Bgra8Unorm | ImageFormat::Bgra8UnormSrgb => PixelFormat::B8G8R8A8,
        ImageFormat::Rgba16Float => PixelFormat::R16G16B16A16F,
        ImageFormat::Rgba32Float => PixelFormat::R32G32B32A32F,
        ImageFormat::BC1RgbaUnorm | ImageFormat::BC1RgbaUnormSrgb => PixelFormat::Bc1,
        ImageFormat::BC2RgbaUnorm | ImageFormat::BC2RgbaUnormSrgb => PixelFormat::Bc2,
        ImageFormat::BC3RgbaUnorm | ImageFormat::BC3RgbaUnormSrgb => PixelFormat::Bc3,
        ImageFormat::BC4RUnorm | ImageFormat::BC4RSnorm => PixelFormat::Bc4,
        ImageFormat::BC5RgUnorm | ImageFormat::BC5RgSnorm => PixelFormat::Bc5,
        ImageFormat::BC6hRgbUfloat => PixelFormat::Bc6U,
        ImageFormat::BC6hRgbSfloat => PixelFormat::Bc6S,
        ImageFormat::BC7RgbaUnorm | ImageFormat::BC7RgbaUnormSrgb => PixelFormat::Bc7,
        _ => PixelFormat::R8G8B8A8,
    }
}

/// Interleaved RGBA values in a `w` x `h` surface. Widened before multiplying.
fn rgba_float_count(w: u32, h: u32) -> usize {
    w as usize * h as usize * 4
}

/// Loaded image data
pub struct LoadedImage {
    pub path: PathBuf,
    file_type: FileType,
    params: LoadParams,
    info: ImageInfo,
    pictures: Vec<Picture>,
    multi_frame_type: MultiFrameType,
    mip_levels: usize,
    array_layers: usize,
    alt_kind: AltPictureKind,
    alt_picture: Option<Picture>,
    alt_enabled: bool,
    playback: FramePlayback,
    override_background: bool,
    /// Canvas colour stored in the file. Only WebP has one.
    file_background: Option<[u8; 4]>,
    needs_upload: bool,
}

impl LoadedImage {
    /// Creates an unloaded image. Nothing is read until [`ViewerImage::load`].
    pub fn new(path: &Path, default_gamma: f32) -> Self {
        Self {
            path: path.to_path_buf(),
            file_type: FileType::from_path(path),
            params: LoadParams::with_gamma(default_gamma),
            info: ImageInfo::default(),
            pictures: Vec::new(),
            multi_frame_type: MultiFrameType::None,
            mip_levels: 1,
            array_layers: 1,
            alt_kind: AltPictureKind::None,
            alt_picture: None,
            alt_enabled: false,
            playback: FramePlayback::default(),
            override_background: false,
            file_background: None,
            needs_upload: false,
        }
    }

    /// Opens and loads in one step.
    pub fn open(path: &Path, default_gamma: f32) -> Result<Self, LoadError> {
        let mut img = Self::new(path, default_gamma);
        img.load()?;
        Ok(img)
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, source: std::io::Error) -> LoadError {
        LoadError::Io { path: self.path_string(), source }
    }

    fn decode_error(&self, reason: impl ToString) -> LoadError {
        LoadError::Decode { path: self.path_string(), reason: reason.to_string() }
    }

    /// The file's own canvas colour while "Override Background" is set. `None` means the
    /// viewer background is used.
    pub fn background_override(&self) -> Option<[u8; 4]> {
        if self.override_background {
            self.file_background
        } else {
            None
        }
    }

    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }

    /// True once after every [`ViewerImage::bind`] or load.
    pub fn take_needs_upload(&mut self) -> bool {
        std::mem::take(&mut self.needs_upload)
    }

    /// Picture for the image view: the alt picture when enabled, the array overview the
    /// view state asks for, otherwise the current frame.
    pub fn display_picture(&self, view: &ViewState) -> Option<Cow<'_, Picture>> {
        if self.alt_enabled {
            if let Some(alt) = &self.alt_picture {
                return Some(Cow::Borrowed(alt));
            }
        }

        if self.multi_frame_type == MultiFrameType::TextureArray && view.wants_array_overview() {
            return self.array_overview(view).map(Cow::Owned);
        }

        self.pictures.get(self.playback.frame_num).map(Cow::Borrowed)
    }

    fn array_overview(&self, view: &ViewState) -> Option<Picture> {
        let mips = self.mip_levels.max(1);
        let current_layer = self.playback.frame_num / mips;
        let layer = |l: usize| self.pictures.get(l * mips..(l + 1) * mips);

        let rows: Vec<Vec<&Picture>> = if view.show_layer_mip_matrix {
            (0..self.array_layers)
                .filter_map(|l| layer(l).map(|chain| chain.iter().collect()))
                .collect()
        } else if view.show_all_array_layers {
            vec![(0..self.array_layers).filter_map(|l| layer(l).and_then(|c| c.first())).collect()]
        } else {
            vec![layer(current_layer)?.iter().collect()]
        };

        if rows.iter().all(|row| row.is_empty()) {
            return None;
        }
        Some(compose_grid(&rows))
    }

    fn load_dds(&self) -> Result<DdsSurface, LoadError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = BufReader::new(file);
        let dds = Dds::read(&mut reader).map_err(|e| self.decode_error(format!("DDS read error: {e}")))?;

        let format = dds_image_format(&dds)
            .map(dds_pixel_format)
            .map_err(|e| self.decode_error(format!("DDS format error: {e:?}")))?;
        if dds.header.depth.unwrap_or(1) > 1 {
            return Err(self.decode_error("volume textures are not supported"));
        }

        let is_cubemap = dds.header.caps2.contains(ddsfile::Caps2::CUBEMAP)
            || dds
                .header10
                .as_ref()
                .is_some_and(|h10| h10.misc_flag.contains(ddsfile::MiscFlag::TEXTURECUBE));
        let mips = dds.header.mip_map_count.unwrap_or(1).max(1) as usize;

        let surface = Surface::from_dds(&dds).map_err(|e| self.decode_error(format!("DDS surface error: {e:?}")))?;
        let rgba = surface
            .decode_rgbaf32()
            .map_err(|e| self.decode_error(format!("DDS decode error: {e:?}")))?;

        let mut dims = Vec::with_capacity(mips);
        let (mut w, mut h) = (dds.header.width.max(1), dds.header.height.max(1));
        for _ in 0..mips {
            dims.push((w, h));
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        let floats_per_layer: usize = dims.iter().map(|&(w, h)| rgba_float_count(w, h)).sum();
        let layers = rgba.data.len() / floats_per_layer.max(1);
        if layers == 0 {
            return Err(LoadError::Empty(self.path_string()));
        }

        let mut pictures = Vec::with_capacity(layers * mips);
        let mut offset = 0;
        for _ in 0..layers {
            for &(w, h) in &dims {
                let count = rgba_float_count(w, h);
                let mut pixels = rgba.data[offset..offset + count].to_vec();
                decode::apply_texture_params(&mut pixels, &self.params.dds, format);
                pictures.push(Picture::from_f32(w, h, &pixels));
                offset += count;
            }
        }

        debug!("DDS {}: {:?}, {} layers, {} mips, cubemap {}", self.path.display(), format, layers, mips, is_cubemap);
        Ok(DdsSurface { format, layers, mips, is_cubemap: is_cubemap && layers % CUBE_FACES == 0, pictures })
    }

    fn apply_dds(&mut self, surface: DdsSurface) {
        let DdsSurface { format, layers, mips, is_cubemap, pictures } = surface;
        self.info.src_pixel_format = format;
        self.mip_levels = mips;

        if is_cubemap {
            // Only the first cube of a cube array is shown.
            let mut faces: Vec<Vec<Picture>> = pictures.chunks(mips).take(CUBE_FACES).map(|c| c.to_vec()).collect();
            let mut ordered = Vec::with_capacity(CUBE_FACES * mips);
            let mut tops = Vec::with_capacity(CUBE_FACES);
            for &src in &CUBE_DISPLAY_ORDER {
                let chain = std::mem::take(&mut faces[src]);
                tops.push(chain[0].clone());
                ordered.extend(chain);
            }

            self.multi_frame_type = MultiFrameType::Cubemap;
            self.array_layers = 1;
            let square = tops.iter().all(|p| p.width == tops[0].width && p.height == tops[0].height);
            if square {
                let faces: [&Picture; CUBE_FACES] = [&tops[0], &tops[1], &tops[2], &tops[3], &tops[4], &tops[5]];
                self.alt_picture = Some(build_cubemap_t_layout(&faces));
                self.alt_kind = AltPictureKind::CubemapTLayout;
            }
            self.pictures = ordered;
        } else if layers > 1 {
            self.multi_frame_type = MultiFrameType::TextureArray;
            self.array_layers = layers;
            self.pictures = pictures;
        } else {
            if mips > 1 {
                self.multi_frame_type = MultiFrameType::Mipmaps;
                self.alt_picture = Some(build_mipmap_side_by_side(&pictures));
                self.alt_kind = AltPictureKind::MipmapSideBySide;
            }
            self.array_layers = 1;
            self.pictures = pictures;
        }
    }

    /// Load an animated GIF
    fn load_gif(&self) -> Result<Vec<Picture>, LoadError> {
        use gif::DecodeOptions;

        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut decoder = DecodeOptions::new();
        decoder.set_color_output(gif::ColorOutput::RGBA);

        let mut decoder = decoder
            .read_info(file)
            .map_err(|e| self.decode_error(format!("Failed to read GIF: {e}")))?;

        let width = decoder.width() as u32;
        let height = decoder.height() as u32;

        // Canvas the frames are composited onto
        let mut canvas = Picture::blank(width, height);
        let mut frames = Vec::new();

        while let Some(frame) = decoder
            .read_next_frame()
            .map_err(|e| self.decode_error(format!("GIF frame error: {e}")))?
        {
            // GIF delay is in centiseconds
            let duration = if frame.delay == 0 { DEFAULT_FRAME_PERIOD } else { frame.delay as f32 / 100.0 };

            let frame_x = frame.left as usize;
            let frame_y = frame.top as usize;
            let frame_width = frame.width as usize;
            let frame_height = frame.height as usize;

            for y in 0..frame_height {
                for x in 0..frame_width {
                    let src_idx = (y * frame_width + x) * 4;
                    let dst_x = frame_x + x;
                    let dst_y = frame_y + y;
                    if dst_x < width as usize && dst_y < height as usize {
                        let dst_idx = (dst_y * width as usize + dst_x) * 4;
                        // Transparent pixels leave the previous frame showing
                        if frame.buffer.len() > src_idx + 3 && frame.buffer[src_idx + 3] > 0 {
                            canvas.pixels[dst_idx..dst_idx + 4].copy_from_slice(&frame.buffer[src_idx..src_idx + 4]);
                        }
                    }
                }
            }

            frames.push(Picture { duration, ..canvas.clone() });
        }

        Ok(frames)
    }

    /// Animated WebP files store a canvas colour in their ANIM chunk; stills default to white.
    fn read_webp_background(&self) -> [u8; 4] {
        File::open(&self.path)
            .ok()
            .and_then(|file| image_webp::WebPDecoder::new(BufReader::new(file)).ok())
            .and_then(|decoder| decoder.background_color_hint())
            .unwrap_or(WEBP_DEFAULT_BACKGROUND)
    }

    fn load_webp(&self) -> Result<Vec<Picture>, LoadError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let decoder = image::codecs::webp::WebPDecoder::new(BufReader::new(file)).map_err(|e| self.decode_error(e))?;

        if !decoder.has_animation() {
            let img = image::DynamicImage::from_decoder(decoder).map_err(|e| self.decode_error(e))?;
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            return Ok(vec![Picture { pixels: rgba.into_raw(), width, height, duration: 0.0 }]);
        }

        let frames = decoder.into_frames().collect_frames().map_err(|e| self.decode_error(e))?;
        Ok(frames
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let ms = if denom == 0 { 0.0 } else { numer as f32 / denom as f32 };
                let duration = if ms <= 0.0 { DEFAULT_FRAME_PERIOD } else { ms / 1000.0 };
                let buffer = frame.into_buffer();
                let (width, height) = buffer.dimensions();
                Picture { pixels: buffer.into_raw(), width, height, duration }
            })
            .collect())
    }

    /// HDR and EXR: decode to linear float then run the display transform.
    fn load_float(&self) -> Result<Vec<Picture>, LoadError> {
        let img = image::open(&self.path).map_err(|e| self.decode_error(e))?;
        let rgba = img.into_rgba32f();
        let (width, height) = rgba.dimensions();
        let mut pixels = rgba.into_raw();
        match self.file_type {
            FileType::Hdr => decode::apply_hdr_params(&mut pixels, &self.params.hdr),
            _ => decode::apply_exr_params(&mut pixels, &self.params.exr),
        }
        Ok(vec![Picture::from_f32(width, height, &pixels)])
    }

    /// Load a static image (TGA, PNG, JPG, BMP)
    fn load_static(&mut self) -> Result<Vec<Picture>, LoadError> {
        let img = image::open(&self.path).map_err(|e| self.decode_error(e))?;
        self.info.src_pixel_format = match img.color() {
            image::ColorType::Rgba8 => PixelFormat::R8G8B8A8,
            image::ColorType::Rgb8 => PixelFormat::R8G8B8,
            image::ColorType::L8 => PixelFormat::L8,
            image::ColorType::La8 => PixelFormat::A8L8,
            _ => PixelFormat::R8G8B8A8,
        };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if self.file_type != FileType::Tga {
            return Ok(vec![Picture { pixels: rgba.into_raw(), width, height, duration: 0.0 }]);
        }

        let mut pixels = decode::from_rgba8(rgba.as_raw());
        decode::apply_tga_params(&mut pixels, &self.params.tga, self.info.src_pixel_format);
        Ok(vec![Picture::from_f32(width, height, &pixels)])
    }

    fn update_opacity(&mut self) {
        let opaque = self.pictures.iter().filter(|p| p.is_opaque()).count();
        self.info.opacity = if opaque == self.pictures.len() {
            Opacity::Opaque
        } else if opaque == 0 {
            Opacity::Transparent
        } else {
            Opacity::Varies
        };
    }
}

impl ViewerImage for LoadedImage {
    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn is_loaded(&self) -> bool {
        !self.pictures.is_empty()
    }

    fn load(&mut self) -> Result<(), LoadError> {
        self.unload();
        self.info = ImageInfo::default();
        self.multi_frame_type = MultiFrameType::None;
        self.mip_levels = 1;
        self.array_layers = 1;
        self.file_background = None;

        let pictures = match self.file_type {
            FileType::Dds => {
                let surface = self.load_dds()?;
                self.apply_dds(surface);
                std::mem::take(&mut self.pictures)
            }
            FileType::Gif => {
                self.info.src_pixel_format = PixelFormat::R8G8B8A8;
                self.load_gif()?
            }
            FileType::Webp => {
                self.info.src_pixel_format = PixelFormat::R8G8B8A8;
                let pictures = self.load_webp()?;
                self.file_background = Some(self.read_webp_background());
                pictures
            }
            FileType::Hdr => {
                self.info.src_pixel_format = PixelFormat::Radiance;
                self.load_float()?
            }
            FileType::Exr => {
                self.info.src_pixel_format = PixelFormat::OpenExr;
                self.load_float()?
            }
            FileType::Tga | FileType::Png | FileType::Jpg | FileType::Bmp => self.load_static()?,
            other => return Err(LoadError::UnsupportedFormat(other)),
        };

        if pictures.is_empty() {
            self.alt_picture = None;
            self.alt_kind = AltPictureKind::None;
            return Err(LoadError::Empty(self.path_string()));
        }

        if pictures.len() > 1 && self.multi_frame_type == MultiFrameType::None {
            self.multi_frame_type = MultiFrameType::Animation;
        }
        self.pictures = pictures;
        self.playback.frame_num = self.playback.frame_num.min(self.pictures.len() - 1);
        self.update_opacity();
        self.needs_upload = true;

        info!(
            "Loaded {} ({} frames, {:?})",
            self.path.display(),
            self.pictures.len(),
            self.multi_frame_type
        );
        Ok(())
    }

    fn unload(&mut self) {
        self.pictures.clear();
        self.alt_picture = None;
        self.alt_kind = AltPictureKind::None;
        self.alt_enabled = false;
        self.playback.stop();
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
        self.pictures.len()
    }

    fn num_mip_levels(&self) -> usize {
        self.mip_levels
    }

    fn num_array_layers(&self) -> usize {
        self.array_layers
    }

    fn multi_frame_type(&self) -> MultiFrameType {
        self.multi_frame_type
    }

    fn alt_picture_kind(&self) -> AltPictureKind {
        self.alt_kind
    }

    fn is_alt_picture_enabled(&self) -> bool {
        self.alt_enabled
    }

    fn enable_alt_picture(&mut self, enabled: bool) {
        self.alt_enabled = enabled && self.alt_picture.is_some();
    }

    fn bind(&mut self) {
        self.needs_upload = true;
    }

    fn playback(&self) -> &FramePlayback {
        &self.playback
    }

    fn playback_mut(&mut self) -> &mut FramePlayback {
        &mut self.playback
    }

    fn frame_duration(&self, frame: usize) -> f32 {
        self.pictures.get(frame).map(|p| p.duration).unwrap_or(0.0)
    }

    fn set_frame_duration(&mut self, seconds: f32, all_frames: bool) {
        let seconds = FRAME_PERIOD.clamp_f32(seconds);
        if all_frames {
            for pic in &mut self.pictures {
                pic.duration = seconds;
            }
        } else if let Some(pic) = self.pictures.get_mut(self.playback.frame_num) {
            pic.duration = seconds;
        }
    }

    fn override_background(&self) -> bool {
        self.override_background
    }

    fn set_override_background(&mut self, enabled: bool) {
        self.override_background = enabled;
    }
}

/// Natural sort comparison for filenames
pub mod natord {
    use std::cmp::Ordering;

    pub fn compare(a: &str, b: &str) -> Ordering {
        let mut a_chars = a.chars().peekable();
        let mut b_chars = b.chars().peekable();

        loop {
            match (a_chars.peek(), b_chars.peek()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(&ac), Some(&bc)) => {
                    if ac.is_ascii_digit() && bc.is_ascii_digit() {
                        let a_val = take_number(&mut a_chars);
                        let b_val = take_number(&mut b_chars);
                        match a_val.cmp(&b_val) {
                            Ordering::Equal => continue,
                            other => return other,
                        }
                    }

                    let ac_lower = ac.to_lowercase().next().unwrap_or(ac);
                    let bc_lower = bc.to_lowercase().next().unwrap_or(bc);
                    match ac_lower.cmp(&bc_lower) {
                        Ordering::Equal => {
                            a_chars.next();
                            b_chars.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }

    /// Consumes a run of digits without eating the character after it.
    fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
        let mut value: u64 = 0;
        while let Some(&c) = chars.peek() {
            let Some(digit) = c.to_digit(10) else { break };
            value = value.saturating_mul(10).saturating_add(digit as u64);
            chars.next();
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn solid(width: u32, height: u32, value: u8) -> Picture {
        Picture { pixels: vec![value; (width * height * 4) as usize], width, height, duration: 0.0 }
    }

    fn pixel(pic: &Picture, x: u32, y: u32) -> u8 {
        pic.pixels[((y * pic.width + x) * 4) as usize]
    }

    #[test]
    fn test_natural_order() {
        assert_eq!(natord::compare("img2.png", "img10.png"), Ordering::Less);
        assert_eq!(natord::compare("Img2a", "img2b"), Ordering::Less);
        assert_eq!(natord::compare("a10b", "a10b"), Ordering::Equal);
        assert_eq!(natord::compare("frame9", "frame09x"), Ordering::Less);
    }

    #[test]
    fn test_mipmap_side_by_side_dimensions() {
        let mips = [solid(8, 8, 1), solid(4, 4, 2), solid(2, 2, 3), solid(1, 1, 4)];
        let alt = build_mipmap_side_by_side(&mips);
        assert_eq!((alt.width, alt.height), (15, 8));
        assert_eq!(pixel(&alt, 0, 0), 1);
        assert_eq!(pixel(&alt, 8, 0), 2);
        assert_eq!(pixel(&alt, 12, 1), 3);
        assert_eq!(pixel(&alt, 14, 0), 4);
        // Below the 4x4 mip is empty.
        assert_eq!(pixel(&alt, 9, 6), 0);
    }

    #[test]
    fn test_cubemap_t_layout_face_positions() {
        let faces: Vec<Picture> = (1..=6).map(|v| solid(2, 2, v)).collect();
        let refs = [&faces[0], &faces[1], &faces[2], &faces[3], &faces[4], &faces[5]];
        let alt = build_cubemap_t_layout(&refs);
        assert_eq!((alt.width, alt.height), (8, 6));

        assert_eq!(pixel(&alt, 2, 2), 1); // +Z
        assert_eq!(pixel(&alt, 6, 2), 2); // -Z
        assert_eq!(pixel(&alt, 4, 2), 3); // +X
        assert_eq!(pixel(&alt, 0, 2), 4); // -X
        assert_eq!(pixel(&alt, 2, 0), 5); // +Y
        assert_eq!(pixel(&alt, 2, 4), 6); // -Y
        assert_eq!(pixel(&alt, 0, 0), 0);
    }

    #[test]
    fn test_unsupported_formats_fail_to_load() {
        let mut img = LoadedImage::new(Path::new("does-not-matter.pvr"), 2.2);
        assert!(matches!(img.load(), Err(LoadError::UnsupportedFormat(FileType::Pvr))));
        assert!(!img.is_loaded());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut img = LoadedImage::new(Path::new("/nonexistent/texture.dds"), 2.2);
        assert!(matches!(img.load(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_png_load_and_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b10.png", "b2.png", "a.png"] {
            let buf = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 128]));
            buf.save(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let listed = get_images_in_directory(&dir.path().join("a.png"));
        let names: Vec<_> = listed.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_owned()).collect();
        assert_eq!(names, ["a.png", "b2.png", "b10.png"]);

        let mut img = LoadedImage::open(&dir.path().join("a.png"), 2.2).unwrap();
        assert_eq!(img.num_frames(), 1);
        assert_eq!(img.info().opacity, Opacity::Transparent);
        assert_eq!(img.multi_frame_type(), MultiFrameType::None);
        assert!(img.take_needs_upload());
        assert!(!img.take_needs_upload());

        let view = ViewState::default();
        let shown = img.display_picture(&view).unwrap();
        assert_eq!((shown.width, shown.height), (3, 2));
    }

    #[test]
    fn test_webp_background_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.webp");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 200, 0, 64])).save(&path).unwrap();

        let mut img = LoadedImage::open(&path, 2.2).unwrap();
        assert_eq!(img.info().opacity, Opacity::Transparent);
        assert_eq!(img.background_override(), None);

        img.set_override_background(true);
        assert_eq!(img.background_override(), Some(WEBP_DEFAULT_BACKGROUND));
    }

    #[test]
    fn test_override_needs_a_file_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 0])).save(&path).unwrap();

        let mut img = LoadedImage::open(&path, 2.2).unwrap();
        img.set_override_background(true);
        assert_eq!(img.background_override(), None);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_float_count_does_not_wrap() {
        assert_eq!(rgba_float_count(40_000, 40_000), 6_400_000_000);
        assert_eq!(rgba_float_count(0, 7), 0);
    }

    #[test]
    fn test_set_frame_duration_clamps() {
        let mut img = LoadedImage::new(Path::new("anim.gif"), 2.2);
        img.pictures = vec![solid(1, 1, 0), solid(1, 1, 0), solid(1, 1, 0)];
        img.playback.frame_num = 1;

        img.set_frame_duration(90.0, false);
        assert_eq!(img.frame_duration(1), 60.0);
        assert_eq!(img.frame_duration(0), 0.0);

        img.set_frame_duration(-1.0, true);
        assert!(img.pictures.iter().all(|p| p.duration == 0.0));
    }

    #[test]
    fn test_array_overview_rows() {
        let mut img = LoadedImage::new(Path::new("array.dds"), 2.2);
        img.multi_frame_type = MultiFrameType::TextureArray;
        img.mip_levels = 2;
        img.array_layers = 3;
        img.pictures = (0..3).flat_map(|l| [solid(4, 4, l * 2 + 1), solid(2, 2, l * 2 + 2)]).collect();
        img.playback.frame_num = 2;

        let mips = ViewState { show_all_mips_unified: true, ..Default::default() };
        let pic = img.display_picture(&mips).unwrap();
        assert_eq!((pic.width, pic.height), (6, 4));
        assert_eq!(pixel(&pic, 0, 0), 3);

        let layers = ViewState { show_all_array_layers: true, ..Default::default() };
        let pic = img.display_picture(&layers).unwrap();
        assert_eq!((pic.width, pic.height), (12, 4));

        let matrix = ViewState { show_layer_mip_matrix: true, ..Default::default() };
        let pic = img.display_picture(&matrix).unwrap();
        assert_eq!((pic.width, pic.height), (6, 12));
        assert_eq!(pixel(&pic, 4, 8), 6);
    }
}
