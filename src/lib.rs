//! texview: a texture and image viewer with an editable properties window.
//!
//! The binary in `main.rs` is a thin eframe shell over these modules.

pub mod config;
pub mod decode;
pub mod frame_index;
pub mod image;
pub mod image_loader;
pub mod params;
pub mod playback;
pub mod properties;
pub mod state;
