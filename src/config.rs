//! Configuration module for viewer profiles and shortcuts.
//! Supports keyboard keys with modifiers and the extra mouse buttons.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::params::{DEFAULT_GAMMA, GAMMA_TEXTURE};

const DEFAULT_CONFIG_INI: &str = include_str!("../config.ini");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Texture filtering mode for GPU rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest neighbor - sharp texels, the usual choice when inspecting textures
    Nearest,
    /// Linear (bilinear) - smooth interpolation between pixels
    Linear,
}

impl TextureFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "point" | "nn" | "sharp" => Some(Self::Nearest),
            "linear" | "bilinear" | "smooth" => Some(Self::Linear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
        }
    }

    pub fn to_egui_options(&self) -> egui::TextureOptions {
        match self {
            Self::Nearest => egui::TextureOptions::NEAREST,
            Self::Linear => egui::TextureOptions::LINEAR,
        }
    }
}

/// Named set of display preferences. One is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    #[default]
    Main,
    Basic,
    Kiosk,
    Alt,
}

impl Profile {
    pub const ALL: [Profile; 4] = [Self::Main, Self::Basic, Self::Kiosk, Self::Alt];

    pub fn name(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Basic => "Basic",
            Self::Kiosk => "Kiosk",
            Self::Alt => "Alt",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Self::Main => "Main Profile",
            Self::Basic => "Basic Profile",
            Self::Kiosk => "Kiosk Profile",
            Self::Alt => "Alt Profile",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Main => Self::Basic,
            Self::Basic => Self::Kiosk,
            Self::Kiosk => Self::Alt,
            Self::Alt => Self::Main,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-profile preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileData {
    pub show_frame_scrubber: bool,
    pub show_properties: bool,
    /// Gamma used when load parameters are reset.
    pub default_gamma: f32,
    pub background_rgb: [u8; 3],
    pub texture_filter: TextureFilter,
    /// Zoom multiplier per scroll notch.
    pub zoom_step: f32,
}

impl ProfileData {
    pub fn for_profile(profile: Profile) -> Self {
        let main = Self {
            show_frame_scrubber: false,
            show_properties: false,
            default_gamma: DEFAULT_GAMMA,
            background_rgb: [24, 24, 24],
            texture_filter: TextureFilter::Nearest,
            zoom_step: 1.1,
        };
        match profile {
            Profile::Main => main,
            Profile::Basic => Self {
                texture_filter: TextureFilter::Linear,
                ..main
            },
            Profile::Kiosk => Self {
                background_rgb: [0, 0, 0],
                texture_filter: TextureFilter::Linear,
                ..main
            },
            Profile::Alt => Self {
                show_frame_scrubber: true,
                show_properties: true,
                ..main
            },
        }
    }
}

impl Default for ProfileData {
    fn default() -> Self {
        Self::for_profile(Profile::Main)
    }
}

/// Represents all possible input types for shortcuts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputBinding {
    Key(egui::Key),
    MouseMiddle,
    Mouse4,
    Mouse5,
    KeyWithCtrl(egui::Key),
    KeyWithShift(egui::Key),
    KeyWithAlt(egui::Key),
}

/// All configurable actions in the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    NextImage,
    PreviousImage,
    NextFrame,
    PreviousFrame,
    FirstFrame,
    LastFrame,
    PlayPause,
    ToggleProperties,
    CycleProfile,
    ToggleFullscreen,
    Exit,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::NextImage,
        Action::PreviousImage,
        Action::NextFrame,
        Action::PreviousFrame,
        Action::FirstFrame,
        Action::LastFrame,
        Action::PlayPause,
        Action::ToggleProperties,
        Action::CycleProfile,
        Action::ToggleFullscreen,
        Action::Exit,
    ];

    pub fn from_str(s: &str) -> Option<Action> {
        match s.to_lowercase().as_str() {
            "next_image" | "next" => Some(Action::NextImage),
            "previous_image" | "previous" | "prev" => Some(Action::PreviousImage),
            "next_frame" => Some(Action::NextFrame),
            "previous_frame" | "prev_frame" => Some(Action::PreviousFrame),
            "first_frame" => Some(Action::FirstFrame),
            "last_frame" => Some(Action::LastFrame),
            "play_pause" | "playpause" => Some(Action::PlayPause),
            "toggle_properties" | "properties" => Some(Action::ToggleProperties),
            "cycle_profile" | "next_profile" => Some(Action::CycleProfile),
            "toggle_fullscreen" | "fullscreen" => Some(Action::ToggleFullscreen),
            "exit" | "quit" => Some(Action::Exit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NextImage => "next_image",
            Action::PreviousImage => "previous_image",
            Action::NextFrame => "next_frame",
            Action::PreviousFrame => "previous_frame",
            Action::FirstFrame => "first_frame",
            Action::LastFrame => "last_frame",
            Action::PlayPause => "play_pause",
            Action::ToggleProperties => "toggle_properties",
            Action::CycleProfile => "cycle_profile",
            Action::ToggleFullscreen => "toggle_fullscreen",
            Action::Exit => "exit",
        }
    }
}

/// Parse an input binding from string
pub fn parse_input_binding(s: &str) -> Option<InputBinding> {
    let s = s.trim().to_lowercase();

    if let Some(key_str) = s.strip_prefix("ctrl+") {
        return parse_key(key_str).map(InputBinding::KeyWithCtrl);
    }
    if let Some(key_str) = s.strip_prefix("shift+") {
        return parse_key(key_str).map(InputBinding::KeyWithShift);
    }
    if let Some(key_str) = s.strip_prefix("alt+") {
        return parse_key(key_str).map(InputBinding::KeyWithAlt);
    }

    match s.as_str() {
        "mouse_middle" | "middle_click" | "mmb" => return Some(InputBinding::MouseMiddle),
        "mouse4" | "mouse_4" | "xbutton1" => return Some(InputBinding::Mouse4),
        "mouse5" | "mouse_5" | "xbutton2" => return Some(InputBinding::Mouse5),
        _ => {}
    }

    parse_key(&s).map(InputBinding::Key)
}

fn parse_key(s: &str) -> Option<egui::Key> {
    use egui::Key;

    let key = match s.to_lowercase().as_str() {
        "a" => Key::A,
        "b" => Key::B,
        "c" => Key::C,
        "d" => Key::D,
        "e" => Key::E,
        "f" => Key::F,
        "g" => Key::G,
        "h" => Key::H,
        "i" => Key::I,
        "j" => Key::J,
        "k" => Key::K,
        "l" => Key::L,
        "m" => Key::M,
        "n" => Key::N,
        "o" => Key::O,
        "p" => Key::P,
        "q" => Key::Q,
        "r" => Key::R,
        "s" => Key::S,
        "t" => Key::T,
        "u" => Key::U,
        "v" => Key::V,
        "w" => Key::W,
        "x" => Key::X,
        "y" => Key::Y,
        "z" => Key::Z,
        "0" | "num0" => Key::Num0,
        "1" | "num1" => Key::Num1,
        "2" | "num2" => Key::Num2,
        "3" | "num3" => Key::Num3,
        "4" | "num4" => Key::Num4,
        "5" | "num5" => Key::Num5,
        "6" | "num6" => Key::Num6,
        "7" | "num7" => Key::Num7,
        "8" | "num8" => Key::Num8,
        "9" | "num9" => Key::Num9,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        "left" | "arrow_left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrow_right" | "arrowright" => Key::ArrowRight,
        "up" | "arrow_up" | "arrowup" => Key::ArrowUp,
        "down" | "arrow_down" | "arrowdown" => Key::ArrowDown,
        "escape" | "esc" => Key::Escape,
        "enter" | "return" => Key::Enter,
        "space" | "spacebar" => Key::Space,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "page_up" => Key::PageUp,
        "pagedown" | "page_down" => Key::PageDown,
        "minus" | "-" => Key::Minus,
        "plus" | "=" | "equals" => Key::Equals,
        // "," separates bindings so only the names are accepted.
        "comma" => Key::Comma,
        "period" | "." => Key::Period,
        _ => return None,
    };
    Some(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Settings,
    Profile(Profile),
    Shortcuts,
    Unknown,
}

impl Section {
    fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("settings") {
            return Self::Settings;
        }
        if name.eq_ignore_ascii_case("shortcuts") {
            return Self::Shortcuts;
        }
        if let Some((prefix, profile)) = name.split_once('.') {
            if prefix.eq_ignore_ascii_case("profile") {
                if let Some(profile) = Profile::from_str(profile) {
                    return Self::Profile(profile);
                }
            }
        }
        Self::Unknown
    }
}

/// Application configuration loaded from INI file
#[derive(Debug, Clone)]
pub struct Config {
    /// Map from input binding to action
    pub bindings: HashMap<InputBinding, Action>,
    /// Reverse map for looking up bindings for an action
    pub action_bindings: HashMap<Action, Vec<InputBinding>>,
    /// Active profile
    pub profile: Profile,
    pub start_fullscreen: bool,
    /// Start playing multi-frame images as soon as they load.
    pub autoplay: bool,
    profiles: [ProfileData; 4],
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self::without_bindings();
        config.set_defaults();
        config
    }
}

impl Config {
    fn without_bindings() -> Self {
        Config {
            bindings: HashMap::new(),
            action_bindings: HashMap::new(),
            profile: Profile::Main,
            start_fullscreen: false,
            autoplay: true,
            profiles: Profile::ALL.map(ProfileData::for_profile),
        }
    }

    fn set_defaults(&mut self) {
        use egui::Key;

        self.add_binding(InputBinding::Key(Key::ArrowRight), Action::NextImage);
        self.add_binding(InputBinding::Mouse5, Action::NextImage);
        self.add_binding(InputBinding::Key(Key::ArrowLeft), Action::PreviousImage);
        self.add_binding(InputBinding::Mouse4, Action::PreviousImage);

        self.add_binding(InputBinding::KeyWithCtrl(Key::ArrowRight), Action::NextFrame);
        self.add_binding(InputBinding::Key(Key::Period), Action::NextFrame);
        self.add_binding(InputBinding::KeyWithCtrl(Key::ArrowLeft), Action::PreviousFrame);
        self.add_binding(InputBinding::Key(Key::Comma), Action::PreviousFrame);
        self.add_binding(InputBinding::Key(Key::Home), Action::FirstFrame);
        self.add_binding(InputBinding::Key(Key::End), Action::LastFrame);
        self.add_binding(InputBinding::Key(Key::Space), Action::PlayPause);

        self.add_binding(InputBinding::Key(Key::P), Action::ToggleProperties);
        self.add_binding(InputBinding::KeyWithShift(Key::P), Action::CycleProfile);

        self.add_binding(InputBinding::Key(Key::F), Action::ToggleFullscreen);
        self.add_binding(InputBinding::Key(Key::F11), Action::ToggleFullscreen);
        self.add_binding(InputBinding::MouseMiddle, Action::ToggleFullscreen);

        self.add_binding(InputBinding::Key(Key::Escape), Action::Exit);
        self.add_binding(InputBinding::KeyWithCtrl(Key::W), Action::Exit);
    }

    fn add_binding(&mut self, input: InputBinding, action: Action) {
        if let Some(previous) = self.bindings.insert(input.clone(), action) {
            if let Some(list) = self.action_bindings.get_mut(&previous) {
                list.retain(|b| b != &input);
            }
        }
        self.action_bindings.entry(action).or_default().push(input);
    }

    pub fn profile_data(&self, profile: Profile) -> &ProfileData {
        &self.profiles[profile.index()]
    }

    pub fn profile_data_mut(&mut self, profile: Profile) -> &mut ProfileData {
        &mut self.profiles[profile.index()]
    }

    /// Preferences of the active profile.
    pub fn current(&self) -> &ProfileData {
        self.profile_data(self.profile)
    }

    pub fn current_mut(&mut self) -> &mut ProfileData {
        self.profile_data_mut(self.profile)
    }

    pub fn cycle_profile(&mut self) -> Profile {
        self.profile = self.profile.next();
        self.profile
    }

    pub fn action_for(&self, input: &InputBinding) -> Option<Action> {
        self.bindings.get(input).copied()
    }

    pub fn get_bindings(&self, action: Action) -> Vec<InputBinding> {
        self.action_bindings.get(&action).cloned().unwrap_or_default()
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "texview").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.ini"))
    }

    /// Loads from the user config dir, creating it from the template on first run.
    /// Any failure falls back to defaults.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}, using default settings");
                return Self::default();
            }
        };

        if !path.exists() {
            match write_file(&path, DEFAULT_CONFIG_INI) {
                Ok(()) => info!("created {}", path.display()),
                Err(e) => warn!("{e}"),
            }
            return Self::parse_ini(DEFAULT_CONFIG_INI);
        }

        match Self::load_from(&path) {
            Ok(config) => {
                debug!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{e}, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_ini(&content))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        write_file(path, &self.to_ini())
    }

    pub fn parse_ini(content: &str) -> Self {
        let mut config = Self::without_bindings();
        let mut section = Section::Unknown;

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = Section::parse(&line[1..line.len() - 1]);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match section {
                Section::Settings => config.parse_setting(&key, value),
                Section::Profile(profile) => {
                    parse_profile_setting(config.profile_data_mut(profile), &key, value)
                }
                Section::Shortcuts => {
                    if let Some(action) = Action::from_str(&key) {
                        // Value can be comma-separated for multiple bindings
                        for binding_str in value.split(',') {
                            match parse_input_binding(binding_str) {
                                Some(binding) => config.add_binding(binding, action),
                                None => debug!("ignoring unknown binding '{}'", binding_str.trim()),
                            }
                        }
                    }
                }
                Section::Unknown => {}
            }
        }

        // Fill in defaults for any missing actions, without stealing inputs the file assigns.
        let default_config = Config::default();
        for action in Action::ALL {
            if config.action_bindings.get(&action).is_some_and(|b| !b.is_empty()) {
                continue;
            }
            for binding in default_config.get_bindings(action) {
                if !config.bindings.contains_key(&binding) {
                    config.add_binding(binding, action);
                }
            }
        }

        config
    }

    fn parse_setting(&mut self, key: &str, value: &str) {
        match key {
            "profile" => {
                if let Some(profile) = Profile::from_str(value) {
                    self.profile = profile;
                }
            }
            "start_fullscreen" | "fullscreen" => {
                if let Some(v) = parse_bool(value) {
                    self.start_fullscreen = v;
                }
            }
            "autoplay" => {
                if let Some(v) = parse_bool(value) {
                    self.autoplay = v;
                }
            }
            _ => {}
        }
    }

    pub fn to_ini(&self) -> String {
        let mut content = String::new();

        content.push_str("; texview configuration\n");
        content.push_str("; Lines starting with ; are comments. Unknown keys are ignored.\n\n");

        content.push_str("[Settings]\n");
        content.push_str("; Active profile: Main, Basic, Kiosk or Alt\n");
        content.push_str(&format!("profile = {}\n", self.profile.name()));
        content.push_str(&format!("start_fullscreen = {}\n", self.start_fullscreen));
        content.push_str("; Start playing animations and multi-frame images on load\n");
        content.push_str(&format!("autoplay = {}\n\n", self.autoplay));

        for profile in Profile::ALL {
            let data = self.profile_data(profile);
            content.push_str(&format!("[Profile.{}]\n", profile.name()));
            content.push_str(&format!("show_frame_scrubber = {}\n", data.show_frame_scrubber));
            content.push_str(&format!("show_properties = {}\n", data.show_properties));
            content.push_str(&format!("default_gamma = {}\n", data.default_gamma));
            content.push_str(&format!(
                "background_rgb = {}, {}, {}\n",
                data.background_rgb[0], data.background_rgb[1], data.background_rgb[2]
            ));
            content.push_str(&format!("texture_filter = {}\n", data.texture_filter.as_str()));
            content.push_str(&format!("zoom_step = {}\n\n", data.zoom_step));
        }

        content.push_str("[Shortcuts]\n");
        for action in Action::ALL {
            let bindings: Vec<String> = self.get_bindings(action).iter().map(binding_to_string).collect();
            if !bindings.is_empty() {
                content.push_str(&format!("{} = {}\n", action.as_str(), bindings.join(", ")));
            }
        }

        content
    }
}

fn parse_profile_setting(data: &mut ProfileData, key: &str, value: &str) {
    match key {
        "show_frame_scrubber" | "scrubber" => {
            if let Some(v) = parse_bool(value) {
                data.show_frame_scrubber = v;
            }
        }
        "show_properties" => {
            if let Some(v) = parse_bool(value) {
                data.show_properties = v;
            }
        }
        "default_gamma" | "gamma" => {
            if let Ok(v) = value.parse::<f32>() {
                data.default_gamma = GAMMA_TEXTURE.clamp_f32(v);
            }
        }
        "background_rgb" => {
            if let Some(rgb) = parse_rgb_triplet(value) {
                data.background_rgb = rgb;
            }
        }
        "texture_filter" => {
            if let Some(f) = TextureFilter::from_str(value) {
                data.texture_filter = f;
            }
        }
        "zoom_step" => {
            if let Ok(v) = value.parse::<f32>() {
                data.zoom_step = if v.is_nan() { 1.01 } else { v.clamp(1.01, 2.0) };
            }
        }
        _ => {}
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)
}

/// Convert InputBinding back to string representation
fn binding_to_string(binding: &InputBinding) -> String {
    match binding {
        InputBinding::Key(key) => key_to_string(key),
        InputBinding::MouseMiddle => "mouse_middle".to_string(),
        InputBinding::Mouse4 => "mouse4".to_string(),
        InputBinding::Mouse5 => "mouse5".to_string(),
        InputBinding::KeyWithCtrl(key) => format!("ctrl+{}", key_to_string(key)),
        InputBinding::KeyWithShift(key) => format!("shift+{}", key_to_string(key)),
        InputBinding::KeyWithAlt(key) => format!("alt+{}", key_to_string(key)),
    }
}

fn key_to_string(key: &egui::Key) -> String {
    format!("{:?}", key).to_lowercase()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_rgb_triplet(value: &str) -> Option<[u8; 3]> {
    let parts: Vec<&str> = value
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_defaults() {
        let parsed = Config::parse_ini(DEFAULT_CONFIG_INI);
        let defaults = Config::default();
        for profile in Profile::ALL {
            assert_eq!(parsed.profile_data(profile), defaults.profile_data(profile), "{profile:?}");
        }
        assert_eq!(parsed.bindings, defaults.bindings);
        assert_eq!(parsed.profile, Profile::Main);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = Config::default();
        config.profile = Profile::Kiosk;
        config.autoplay = false;
        config.current_mut().show_frame_scrubber = true;
        config.current_mut().default_gamma = 1.8;
        config.profile_data_mut(Profile::Alt).background_rgb = [10, 20, 30];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.profile, Profile::Kiosk);
        assert!(!loaded.autoplay);
        assert!(loaded.current().show_frame_scrubber);
        assert_eq!(loaded.current().default_gamma, 1.8);
        assert_eq!(loaded.profile_data(Profile::Alt).background_rgb, [10, 20, 30]);
        assert_eq!(loaded.bindings, config.bindings);
    }

    #[test]
    fn test_unknown_keys_and_sections_ignored() {
        let config = Config::parse_ini(
            "[Settings]\nwibble = 3\nprofile = alt\n[Nonsense]\nzoom_step = 1.9\n[Profile.Main]\ncolour = red\n",
        );
        assert_eq!(config.profile, Profile::Alt);
        assert_eq!(config.profile_data(Profile::Main), &ProfileData::for_profile(Profile::Main));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = Config::parse_ini(
            "[Profile.Basic]\ndefault_gamma = 9.5\nzoom_step = 0.2\n[Profile.Alt]\ndefault_gamma = 0.1\nzoom_step = 7\n",
        );
        assert_eq!(config.profile_data(Profile::Basic).default_gamma, 4.0);
        assert_eq!(config.profile_data(Profile::Basic).zoom_step, 1.01);
        assert_eq!(config.profile_data(Profile::Alt).default_gamma, 0.5);
        assert_eq!(config.profile_data(Profile::Alt).zoom_step, 2.0);
    }

    #[test]
    fn test_shortcut_parsing_and_default_fill() {
        let config = Config::parse_ini("[Shortcuts]\nplay_pause = ctrl+p, mouse4\n");
        assert_eq!(
            config.action_for(&InputBinding::KeyWithCtrl(egui::Key::P)),
            Some(Action::PlayPause)
        );
        // mouse4 now belongs to play_pause, so previous_image keeps only its key.
        assert_eq!(config.action_for(&InputBinding::Mouse4), Some(Action::PlayPause));
        assert_eq!(
            config.get_bindings(Action::PreviousImage),
            vec![InputBinding::Key(egui::Key::ArrowLeft)]
        );
        // Space is no longer bound since play_pause was given explicitly.
        assert_eq!(config.action_for(&InputBinding::Key(egui::Key::Space)), None);
        assert_eq!(
            config.action_for(&InputBinding::Key(egui::Key::Home)),
            Some(Action::FirstFrame)
        );
    }

    #[test]
    fn test_binding_grammar() {
        assert_eq!(parse_input_binding("Shift+P"), Some(InputBinding::KeyWithShift(egui::Key::P)));
        assert_eq!(parse_input_binding("alt+f4"), Some(InputBinding::KeyWithAlt(egui::Key::F4)));
        assert_eq!(parse_input_binding("xbutton2"), Some(InputBinding::Mouse5));
        assert_eq!(parse_input_binding("period"), Some(InputBinding::Key(egui::Key::Period)));
        assert_eq!(parse_input_binding("hyper+x"), None);
        for binding in Config::default().bindings.keys() {
            assert_eq!(parse_input_binding(&binding_to_string(binding)).as_ref(), Some(binding));
        }
    }

    #[test]
    fn test_profile_cycle_and_names() {
        let mut config = Config::default();
        assert_eq!(config.cycle_profile(), Profile::Basic);
        assert_eq!(config.cycle_profile(), Profile::Kiosk);
        assert_eq!(config.cycle_profile(), Profile::Alt);
        assert_eq!(config.cycle_profile(), Profile::Main);
        assert_eq!(Profile::Kiosk.long_name(), "Kiosk Profile");
        assert_eq!(Profile::from_str(" basic "), Some(Profile::Basic));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
