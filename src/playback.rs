//! Frame playback for multi-frame images.
//!
//! Drives the current frame forward or backward from per-frame periods, and owns
//! the navigation bounds used by the transport buttons.

use crate::params::FRAME_PERIOD;

/// Preset frame periods offered next to the period editor, in seconds.
pub const PERIOD_PRESETS: [(&str, f32); 5] = [
    ("1.0s", 1.0),
    ("0.5s", 0.5),
    ("0.1s", 0.1),
    ("30Hz", 1.0 / 30.0),
    ("60Hz", 1.0 / 60.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlayback {
    /// Zero-based current frame.
    pub frame_num: usize,
    pub playing: bool,
    pub play_reverse: bool,
    pub looping: bool,
    /// When set, `duration_preview` replaces every frame's own period while playing.
    pub duration_preview_enabled: bool,
    pub duration_preview: f32,
    countdown: f32,
}

impl Default for FramePlayback {
    fn default() -> Self {
        Self {
            frame_num: 0,
            playing: false,
            play_reverse: false,
            looping: true,
            duration_preview_enabled: false,
            duration_preview: 1.0 / 30.0,
            countdown: 0.0,
        }
    }
}

impl FramePlayback {
    /// Period in effect for a frame whose own duration is `frame_period`.
    pub fn effective_period(&self, frame_period: f32) -> f32 {
        if self.duration_preview_enabled {
            self.duration_preview
        } else {
            frame_period
        }
    }

    pub fn play(&mut self, current_frame_period: f32) {
        self.countdown = self.effective_period(current_frame_period);
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Seconds until the next frame change.
    pub fn countdown(&self) -> f32 {
        self.countdown
    }

    /// Advances the countdown by `dt` seconds. `period_of` returns a frame's own period.
    /// Returns true when the current frame changed.
    pub fn update(&mut self, dt: f32, num_frames: usize, period_of: impl Fn(usize) -> f32) -> bool {
        if !self.playing || num_frames <= 1 {
            return false;
        }

        self.countdown -= dt;
        if self.countdown > 0.0 {
            return false;
        }

        let last = num_frames - 1;
        if !self.play_reverse {
            if self.frame_num >= last {
                if self.looping {
                    self.frame_num = 0;
                } else {
                    self.frame_num = last;
                    self.playing = false;
                }
            } else {
                self.frame_num += 1;
            }
        } else if self.frame_num == 0 {
            if self.looping {
                self.frame_num = last;
            } else {
                self.playing = false;
            }
        } else {
            self.frame_num -= 1;
        }

        // Carry the overshoot into the next period so short periods don't play slow.
        let remainder = -self.countdown;
        let period = self.effective_period(period_of(self.frame_num)).max(remainder);
        self.countdown = period - remainder;
        true
    }

    pub fn can_step_back(&self) -> bool {
        !self.playing && self.frame_num > 0
    }

    pub fn can_step_forward(&self, num_frames: usize) -> bool {
        !self.playing && self.frame_num + 1 < num_frames
    }

    /// Play-reverse is unavailable only while playing forward.
    pub fn can_toggle_reverse(&self) -> bool {
        !(self.playing && !self.play_reverse)
    }

    /// Play-forward is unavailable only while playing in reverse.
    pub fn can_toggle_forward(&self) -> bool {
        !(self.playing && self.play_reverse)
    }

    pub fn skip_to_begin(&mut self) {
        if self.can_step_back() {
            self.frame_num = 0;
        }
    }

    /// No-op at frame 0.
    pub fn step_back(&mut self) {
        if self.can_step_back() {
            self.frame_num -= 1;
        }
    }

    /// No-op at the last frame.
    pub fn step_forward(&mut self, num_frames: usize) {
        if self.can_step_forward(num_frames) {
            self.frame_num += 1;
        }
    }

    pub fn skip_to_end(&mut self, num_frames: usize) {
        if self.can_step_forward(num_frames) {
            self.frame_num = num_frames - 1;
        }
    }

    pub fn set_preview_period(&mut self, seconds: f32) {
        self.duration_preview = FRAME_PERIOD.clamp_f32(seconds);
    }
}
