//! Small editors shared by the property sections. Every numeric editor clamps its value to
//! the declared range after the widget runs, whatever the widget itself allowed.

use std::ops::RangeInclusive;

use crate::params::{
    ParamRange, TextureFlags, DEFOG_EXR, EXPOSURE_EXR, EXPOSURE_HDR, EXPOSURE_TEXTURE, FRAME_PERIOD,
    GAMMA_EXR, GAMMA_HDR, GAMMA_TEXTURE, KNEE_HIGH_EXR, KNEE_LOW_EXR, MAX_RANGE_PVR,
};

/// Label, range, drag speed and tooltip of a numeric field.
pub struct FieldSpec<T> {
    pub label: &'static str,
    pub range: ParamRange<T>,
    pub speed: f64,
    pub help: &'static str,
}

pub const GAMMA_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Gamma",
    range: GAMMA_TEXTURE,
    speed: 0.01,
    help: "Gamma to use [0.5, 4.0]. The profile's default gamma is used on reset.",
};

pub const GAMMA_HDR_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Gamma",
    range: GAMMA_HDR,
    speed: 0.01,
    help: "Gamma to use [0.6, 3.0]. The profile's default gamma is used on reset.",
};

pub const GAMMA_EXR_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Gamma",
    range: GAMMA_EXR,
    speed: 0.01,
    help: "Gamma to use [0.6, 3.0]. The profile's default gamma is used on reset.",
};

pub const EXPOSURE_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Exposure",
    range: EXPOSURE_TEXTURE,
    speed: 0.001,
    help: "Exposure adjustment [0.0, 4.0]. Tick the box to enable it.",
};

pub const EXPOSURE_HDR_FIELD: FieldSpec<i32> = FieldSpec {
    label: "Exposure",
    range: EXPOSURE_HDR,
    speed: 0.1,
    help: "Exposure adjustment in stops [-10, 10].",
};

pub const EXPOSURE_EXR_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Exposure",
    range: EXPOSURE_EXR,
    speed: 0.01,
    help: "Exposure adjustment [-10.0, 10.0].",
};

pub const MAX_RANGE_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Max Range",
    range: MAX_RANGE_PVR,
    speed: 0.01,
    help: "Scale applied when decoding RGBM and RGBD pixels [0.01, 128.0].",
};

pub const DEFOG_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Defog",
    range: DEFOG_EXR,
    speed: 0.001,
    help: "Remove fog strength [0.0, 0.1]. Try to keep it under 0.01.",
};

pub const KNEE_LOW_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Knee Low",
    range: KNEE_LOW_EXR,
    speed: 0.01,
    help: "Lower bound knee taper [-3.0, 3.0].",
};

pub const KNEE_HIGH_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Knee High",
    range: KNEE_HIGH_EXR,
    speed: 0.01,
    help: "Upper bound knee taper [3.5, 7.5].",
};

pub const PERIOD_FIELD: FieldSpec<f32> = FieldSpec {
    label: "Period",
    range: FRAME_PERIOD,
    speed: 0.01,
    help: "This frame's period in seconds.",
};

pub const GAMMA_CORR_HELP: &str = "Gamma Correction\n\
Pixel values may be in linear space. Before being shown on a display with a non-linear\n\
response they should be corrected to gamma or sRGB space.\n\n\
None : the data is already in gamma or sRGB space.\n\
Gamma : correct with the gamma exponent below. 2.2 is standard.\n\
sRGB : convert to sRGB space, close to gamma 2.2 with a linear toe.\n\
Auto : sRGB for HDR pixel formats, None otherwise.";

/// The `(?)` marker with a tooltip.
pub fn help_mark(ui: &mut egui::Ui, text: &str) {
    ui.weak("(?)").on_hover_text(text);
}

fn drag_value<'a>(spec: &FieldSpec<f32>, value: &'a mut f32) -> egui::DragValue<'a> {
    egui::DragValue::new(value)
        .speed(spec.speed)
        .range(spec.range.lo..=spec.range.hi)
        .fixed_decimals(spec.range.decimals.unwrap_or(3))
}

/// Returns true when the value changed.
pub fn float_field(ui: &mut egui::Ui, spec: &FieldSpec<f32>, value: &mut f32) -> bool {
    let before = *value;
    ui.horizontal(|ui| {
        ui.add(drag_value(spec, value));
        ui.label(spec.label);
        help_mark(ui, spec.help);
    });
    *value = spec.range.clamp_f32(*value);
    *value != before
}

/// Text entry that hands back a value only when Enter is pressed. The draft text
/// lives in egui memory under `id` while the field has focus.
pub fn float_entry(ui: &mut egui::Ui, spec: &FieldSpec<f32>, id: egui::Id, current: f32) -> Option<f32> {
    let draft_id = id.with("draft");
    ui.horizontal(|ui| {
        let mut text = ui
            .data_mut(|d| d.get_temp::<String>(draft_id))
            .unwrap_or_else(|| format!("{:.*}", spec.range.decimals.unwrap_or(3), current));
        let response = ui.add(egui::TextEdit::singleline(&mut text).id(id).desired_width(64.0));
        ui.label(spec.label);
        help_mark(ui, spec.help);

        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if response.has_focus() {
            ui.data_mut(|d| d.insert_temp(draft_id, text.clone()));
        } else {
            ui.data_mut(|d| d.remove::<String>(draft_id));
        }
        commit_entry(spec, &text, enter)
    })
    .inner
}

/// Parses and clamps a committed entry. Nothing is committed without Enter.
pub fn commit_entry(spec: &FieldSpec<f32>, text: &str, enter: bool) -> Option<f32> {
    if !enter {
        return None;
    }
    let value: f32 = text.trim().parse().ok()?;
    value.is_finite().then(|| spec.range.clamp_f32(value))
}

pub fn int_field(ui: &mut egui::Ui, spec: &FieldSpec<i32>, value: &mut i32) -> bool {
    let before = *value;
    ui.horizontal(|ui| {
        ui.add(
            egui::DragValue::new(value)
                .speed(spec.speed)
                .range(spec.range.lo..=spec.range.hi),
        );
        ui.label(spec.label);
        help_mark(ui, spec.help);
    });
    *value = spec.range.clamp(*value);
    *value != before
}

/// One-based index editor. `range` is in one-based units.
pub fn index_field(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut i64,
    range: RangeInclusive<i64>,
    help: &str,
) -> bool {
    let before = *value;
    let (lo, hi) = (*range.start(), *range.end());
    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(value).speed(0.1).range(range));
        ui.label(label);
        help_mark(ui, help);
    });
    *value = (*value).clamp(lo, hi.max(lo));
    *value != before
}

/// Exposure value with its unlabeled enable box. The value is read-only while disabled.
pub fn exposure_row(ui: &mut egui::Ui, flags: &mut TextureFlags, exposure: &mut f32) -> bool {
    let before = (*flags, *exposure);
    ui.horizontal(|ui| {
        let mut enabled = flags.contains(TextureFlags::TONE_MAP_EXPOSURE);
        ui.add_enabled(enabled, drag_value(&EXPOSURE_FIELD, exposure));
        if ui
            .checkbox(&mut enabled, "")
            .on_hover_text("Enable exposure adjustment")
            .changed()
        {
            flags.set(TextureFlags::TONE_MAP_EXPOSURE, enabled);
        }
        ui.label(EXPOSURE_FIELD.label);
        help_mark(ui, EXPOSURE_FIELD.help);
    });
    *exposure = EXPOSURE_FIELD.range.clamp_f32(*exposure);
    before != (*flags, *exposure)
}

/// Checkbox bound to a single flag bit.
pub fn flag_checkbox<F: bitflags::Flags + Copy>(
    ui: &mut egui::Ui,
    flags: &mut F,
    flag: F,
    label: &str,
    help: &str,
) -> bool {
    let mut on = flags.contains(flag);
    let changed = ui
        .horizontal(|ui| {
            let changed = ui.checkbox(&mut on, label).changed();
            help_mark(ui, help);
            changed
        })
        .inner;
    if changed {
        flags.set(flag, on);
    }
    changed
}

/// Right-aligned "Reset" button, sharing the row with the scrubber toggle when given one.
/// Returns true when reset was clicked.
pub fn scrubber_and_reset(ui: &mut egui::Ui, scrubber: Option<&mut bool>) -> bool {
    ui.horizontal(|ui| {
        if let Some(show) = scrubber {
            ui.checkbox(show, "Scrubber");
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.button("Reset")
                .on_hover_text("Restore default load parameters and reload")
                .clicked()
        })
        .inner
    })
    .inner
}

/// Frameless icon button in the style of the image view's overlay controls.
pub fn icon_button(ui: &mut egui::Ui, enabled: bool, icon: &str, hover: &str) -> bool {
    ui.add_enabled(
        enabled,
        egui::Button::new(egui::RichText::new(icon).size(16.0)).frame(false),
    )
    .on_hover_text(hover)
    .clicked()
}
