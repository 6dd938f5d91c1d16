//! The properties window: per-format load parameters, multi-surface controls and frame playback.

pub mod formats;
pub mod multi_surface;
pub mod widgets;

use crate::config::ProfileData;
use crate::frame_index::{to_flat_from_one_based, FrameContainerShape, FrameCoordinate};
use crate::image::{FileType, ViewerImage};
use crate::playback::PERIOD_PRESETS;
use crate::state::ViewState;

use formats::{editor_for, SectionOutcome};
use widgets::{float_entry, float_field, help_mark, icon_button, index_field, FieldSpec, PERIOD_FIELD};

/// What the window ended up showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    NoImages,
    LoadFailed,
    NoFormatProperties(FileType),
    NoEditableProperties,
    Shown,
}

const PREVIEW_PERIOD_FIELD: FieldSpec<f32> = FieldSpec {
    help: "Period used for every frame while playing with preview enabled.",
    ..PERIOD_FIELD
};

/// Shows the window while `view.show_properties` is set. Returns `None` when closed or collapsed.
pub fn show_properties_window(
    ctx: &egui::Context,
    image: Option<&mut dyn ViewerImage>,
    view: &mut ViewState,
    profile: &mut ProfileData,
) -> Option<PanelOutcome> {
    if !view.show_properties {
        return None;
    }

    let mut open = true;
    let outcome = egui::Window::new("Properties")
        .open(&mut open)
        .resizable(false)
        .default_width(260.0)
        .show(ctx, |ui| properties_ui(ui, image, view, profile))
        .and_then(|response| response.inner);
    if !open {
        view.show_properties = false;
    }
    outcome
}

/// Window contents. Split out so it can be hosted by any `Ui`.
pub fn properties_ui(
    ui: &mut egui::Ui,
    image: Option<&mut dyn ViewerImage>,
    view: &mut ViewState,
    profile: &mut ProfileData,
) -> PanelOutcome {
    let Some(image) = image else {
        ui.label("No Images in Folder");
        return PanelOutcome::NoImages;
    };
    if !image.is_loaded() {
        ui.label("Image Failed to Load");
        return PanelOutcome::LoadFailed;
    }

    let file_type = image.file_type();
    let mut section_displayed = false;
    if let Some(editor) = editor_for(file_type) {
        let outcome = editor.show(ui, image, view, profile);
        if !image.is_loaded() {
            ui.label("Image Failed to Load");
            return PanelOutcome::LoadFailed;
        }
        match outcome {
            SectionOutcome::Complete { any_displayed: true } => return PanelOutcome::Shown,
            SectionOutcome::Complete { any_displayed: false } => {
                ui.label(format!("No {} Properties Available", editor.name()));
                return PanelOutcome::NoFormatProperties(file_type);
            }
            SectionOutcome::FallThrough { displayed } => section_displayed = displayed,
        }
    }

    let num_frames = image.num_frames();
    if num_frames <= 1 {
        if !section_displayed {
            ui.label("No Editable Image Properties Available");
            return PanelOutcome::NoEditableProperties;
        }
        return PanelOutcome::Shown;
    }

    if section_displayed {
        ui.separator();
    }
    frame_section(ui, image, profile);
    PanelOutcome::Shown
}

/// Starts or stops playback in the given direction.
pub fn toggle_play(image: &mut dyn ViewerImage, reverse: bool) {
    image.playback_mut().play_reverse = reverse;
    if image.playback().playing {
        image.stop();
    } else {
        image.play();
    }
}

fn frame_section(ui: &mut egui::Ui, image: &mut dyn ViewerImage, profile: &mut ProfileData) {
    let num_frames = image.num_frames();
    let shape = FrameContainerShape::new(num_frames, false);

    let mut coord = FrameCoordinate::new(image.frame_num());
    let mut one_based = coord.one_based() as i64;
    if index_field(
        ui,
        &format!("Frame ({num_frames})"),
        &mut one_based,
        1..=num_frames as i64,
        "Which image in a multiframe file to display.",
    ) {
        coord.set_clamped(to_flat_from_one_based(one_based), &shape);
        image.set_frame_num(coord.flat_index);
    }

    if image.playback().duration_preview_enabled {
        ui.horizontal(|ui| {
            let mut period = image.playback().duration_preview;
            if float_field(ui, &PREVIEW_PERIOD_FIELD, &mut period) {
                image.playback_mut().set_preview_period(period);
            }
            if ui
                .button("Set All")
                .on_hover_text("Sets every frame period to the preview period in seconds.")
                .clicked()
            {
                let period = image.playback().duration_preview;
                image.set_frame_duration(period, true);
                image.playback_mut().duration_preview_enabled = false;
            }
        });
        if let Some(seconds) = period_presets(ui) {
            image.playback_mut().set_preview_period(seconds);
        }
    } else {
        let period = image.frame_duration(image.frame_num());
        let entry_id = ui.id().with(("frame_period", image.frame_num()));
        if let Some(period) = float_entry(ui, &PERIOD_FIELD, entry_id, period) {
            image.set_frame_duration(period, false);
        }
        if let Some(seconds) = period_presets(ui) {
            image.set_frame_duration(seconds, false);
        }
    }

    ui.horizontal(|ui| {
        let mut preview = image.playback().duration_preview_enabled;
        if ui.checkbox(&mut preview, "Preview Period").changed() {
            image.playback_mut().duration_preview_enabled = preview;
        }
        help_mark(ui, "If enabled this number of seconds is used for all frame periods while playing.");
    });
    ui.checkbox(&mut profile.show_frame_scrubber, "Scrubber");

    ui.separator();
    transport(ui, image);
}

fn period_presets(ui: &mut egui::Ui) -> Option<f32> {
    ui.horizontal(|ui| {
        let mut picked = None;
        for (label, seconds) in PERIOD_PRESETS {
            if ui.small_button(label).clicked() {
                picked = Some(seconds);
            }
        }
        help_mark(ui, "Predefined frame period buttons.");
        picked
    })
    .inner
}

fn transport(ui: &mut egui::Ui, image: &mut dyn ViewerImage) {
    let num_frames = image.num_frames();

    ui.horizontal(|ui| {
        let mut looping = image.playback().looping;
        if ui
            .toggle_value(&mut looping, "🔁")
            .on_hover_text("Loop playback")
            .changed()
        {
            image.playback_mut().looping = looping;
        }

        let pb = image.playback().clone();
        let back = pb.can_step_back();
        let forward = pb.can_step_forward(num_frames);
        let stop_icon = "⏹";

        if icon_button(ui, back, "⏮", "Skip to first frame") {
            image.playback_mut().skip_to_begin();
        }
        if icon_button(ui, back, "⏪", "Previous frame") {
            image.playback_mut().step_back();
        }

        let rev_icon = if pb.playing { stop_icon } else { "◀" };
        if icon_button(ui, pb.can_toggle_reverse(), rev_icon, "Play in reverse") {
            toggle_play(image, true);
        }
        let fwd_icon = if pb.playing { stop_icon } else { "▶" };
        if icon_button(ui, pb.can_toggle_forward(), fwd_icon, "Play") {
            toggle_play(image, false);
        }

        if icon_button(ui, forward, "⏩", "Next frame") {
            image.playback_mut().step_forward(num_frames);
        }
        if icon_button(ui, forward, "⏭", "Skip to last frame") {
            image.playback_mut().skip_to_end(num_frames);
        }
    });
}
