/// View toggles shared between the properties window and the image view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Texture arrays: show every mip of the current layer side by side.
    pub show_all_mips_unified: bool,
    /// Texture arrays: show the top mip of every layer side by side.
    pub show_all_array_layers: bool,
    /// Texture arrays: every layer as a row of all its mips.
    pub show_layer_mip_matrix: bool,
    pub crop_mode: bool,
    pub show_properties: bool,
}

impl ViewState {
    /// True when texture arrays are drawn as a composite instead of the current frame.
    pub fn wants_array_overview(&self) -> bool {
        self.show_all_mips_unified || self.show_all_array_layers || self.show_layer_mip_matrix
    }
}
