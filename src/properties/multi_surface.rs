//! Mipmap, cubemap and texture-array controls for the texture container sections.

use crate::frame_index::{to_flat_from_one_based, FrameContainerShape, FrameCoordinate, CUBE_FACES};
use crate::image::{MultiFrameType, ViewerImage};
use crate::state::ViewState;

use super::widgets::index_field;

/// Which frame editor the section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEditor {
    /// Face and (if more than one) mip editors.
    Cube { mips_per_face: usize },
    Mipmap { count: usize },
    Texture { count: usize },
}

/// Controls visible for the current image and view state. Recomputed every redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceDisclosure {
    /// "Display All Mipmaps" bound to the unified array view.
    pub all_mips_unified: bool,
    /// "Display All Layers" and "Layer/Mip Matrix".
    pub array_layer_toggles: bool,
    /// "Display All Mipmaps" bound to the side-by-side alt picture.
    pub alt_mipmaps: bool,
    pub alt_cubemap: bool,
    pub frame_editor: Option<FrameEditor>,
}

impl SurfaceDisclosure {
    pub fn evaluate(image: &dyn ViewerImage, view: &ViewState) -> Self {
        let is_texture_array = image.multi_frame_type() == MultiFrameType::TextureArray;
        let alt_mipmaps_avail = image.is_alt_mipmaps_picture_avail() && !view.crop_mode;
        let alt_cubemap_avail = image.is_alt_cubemap_picture_avail() && !view.crop_mode;

        let all_mips_unified = is_texture_array && image.num_mip_levels() > 1;
        let array_layer_toggles = all_mips_unified && image.num_array_layers() > 1;

        let num_frames = image.num_frames();
        let frame_editor = if num_frames >= 2 && !image.is_alt_picture_enabled() {
            let mips_per_face = num_frames / CUBE_FACES;
            if alt_cubemap_avail && mips_per_face >= 1 {
                Some(FrameEditor::Cube { mips_per_face })
            } else if alt_mipmaps_avail {
                Some(FrameEditor::Mipmap { count: num_frames })
            } else {
                Some(FrameEditor::Texture { count: num_frames })
            }
        } else {
            None
        };

        Self {
            all_mips_unified,
            array_layer_toggles,
            alt_mipmaps: !all_mips_unified && alt_mipmaps_avail,
            alt_cubemap: alt_cubemap_avail,
            frame_editor,
        }
    }

    pub fn any(&self) -> bool {
        self.all_mips_unified || self.alt_mipmaps || self.alt_cubemap || self.frame_editor.is_some()
    }
}

/// Turning the unified mip view off also drops an enabled alt picture.
pub fn set_show_all_mips_unified(image: &mut dyn ViewerImage, view: &mut ViewState, enabled: bool) {
    view.show_all_mips_unified = enabled;
    if !enabled && image.is_alt_picture_enabled() {
        image.enable_alt_picture(false);
        image.bind();
    }
}

pub fn set_alt_picture(image: &mut dyn ViewerImage, enabled: bool) {
    image.enable_alt_picture(enabled);
    image.bind();
}

/// Draws the multi-surface controls. Returns true if anything was drawn.
pub fn show_multi_surface(ui: &mut egui::Ui, image: &mut dyn ViewerImage, view: &mut ViewState) -> bool {
    let disclosure = SurfaceDisclosure::evaluate(image, view);

    if disclosure.all_mips_unified {
        let mut unified = view.show_all_mips_unified;
        if ui
            .checkbox(&mut unified, "Display All Mipmaps")
            .on_hover_text("Show every mip level of the current array layer side by side.")
            .changed()
        {
            set_show_all_mips_unified(image, view, unified);
        }
        if disclosure.array_layer_toggles {
            ui.checkbox(&mut view.show_all_array_layers, "Display All Layers")
                .on_hover_text("Show the top mip of every array layer side by side.");
            ui.checkbox(&mut view.show_layer_mip_matrix, "Layer/Mip Matrix")
                .on_hover_text("Show every layer as a row of all its mip levels.");
        }
    } else if disclosure.alt_mipmaps {
        let mut enabled = image.is_alt_picture_enabled();
        if ui
            .checkbox(&mut enabled, "Display All Mipmaps")
            .on_hover_text("Display all mipmaps in a single side-by-side image.")
            .changed()
        {
            set_alt_picture(image, enabled);
        }
    }

    if disclosure.alt_cubemap {
        let mut enabled = image.is_alt_picture_enabled();
        if ui
            .checkbox(&mut enabled, "Display As Cubemap")
            .on_hover_text("Display all cubemap sides in a T-layout.")
            .changed()
        {
            set_alt_picture(image, enabled);
        }
    }

    if let Some(editor) = disclosure.frame_editor {
        frame_editor_ui(ui, image, editor);
    }

    disclosure.any()
}

fn frame_editor_ui(ui: &mut egui::Ui, image: &mut dyn ViewerImage, editor: FrameEditor) {
    match editor {
        FrameEditor::Cube { mips_per_face } => {
            let shape = FrameContainerShape::new(mips_per_face * CUBE_FACES, true);
            let coord = shape.cube_coordinate(image.frame_num().min(shape.last_index()));

            let mut face = coord.face as i64;
            if index_field(
                ui,
                &format!("Cube Side ({CUBE_FACES})"),
                &mut face,
                1..=CUBE_FACES as i64,
                "Cubemap side to display. Cubemaps use a left-handed ordering with +Z\n\
                 facing forward and +Y up. Sides are shown in the order +Z, -Z, +X, -X, +Y, -Y.",
            ) {
                image.set_frame_num(shape.flat_from_cube(face, coord.mip as i64));
            }

            if mips_per_face > 1 {
                let mut mip = coord.mip as i64;
                if index_field(
                    ui,
                    &format!("Cube Mip ({mips_per_face})"),
                    &mut mip,
                    1..=mips_per_face as i64,
                    "Which cubemap mipmap to display.",
                ) {
                    image.set_frame_num(shape.flat_from_cube(coord.face as i64, mip));
                }
            }
        }
        FrameEditor::Mipmap { count } | FrameEditor::Texture { count } => {
            let name = if matches!(editor, FrameEditor::Mipmap { .. }) { "Mipmap" } else { "Texture" };
            let shape = FrameContainerShape::new(count, false);
            let mut coord = FrameCoordinate::new(image.frame_num());
            let mut one_based = coord.one_based() as i64;
            if index_field(
                ui,
                &format!("{name} ({count})"),
                &mut one_based,
                1..=count as i64,
                "Which mipmap or texture to display.",
            ) {
                coord.set_clamped(to_flat_from_one_based(one_based), &shape);
                image.set_frame_num(coord.flat_index);
            }
        }
    }
}
