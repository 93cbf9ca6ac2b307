use std::path::PathBuf;
use std::time::Duration;

use glam::Vec2;

use crate::error::ConfigError;
use crate::motion::MotionParams;
use crate::perimeter::{Edge, PerimeterBounds};

/// Window footprint in pixels. The mascot sprite is drawn inside it.
const WINDOW_WIDTH: u32 = 240;
const WINDOW_HEIGHT: u32 = 280;
/// Cold-start walking speed (sub-units per tick, 4 px/tick).
const WALK_STEP: i64 = 64;
/// Downward acceleration while airborne (sub-units per tick squared).
const GRAVITY: i64 = 8;
/// Upward launch velocity of a jump.
const JUMP_IMPULSE: i64 = 240;
/// A random jump/turn fires on average once per this many ticks.
const EVENT_ONE_IN: u32 = 60;
/// Ticks each gait pose is held.
const FRAMES_PER_STEP: u64 = 3;
/// Simulation rate.
const TICKS_PER_SECOND: u32 = 60;
/// Speech bubble is drawn at this fraction of its image size.
const BUBBLE_SCALE: f32 = 0.8;
/// Text origin inside the bubble image, in bubble pixels.
const TEXT_INSET: Vec2 = Vec2::new(40.0, 60.0);
const FONT_SIZE: f32 = 24.0;
/// How often the log target is re-read.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Longest message shown in the bubble.
const MAX_MESSAGE_CHARS: usize = 280;

/// Everything tunable about the mascot, fixed at startup.
#[derive(Debug, Clone)]
pub struct MascotConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub walk_step: i64,
    pub gravity: i64,
    pub jump_impulse: i64,
    pub event_one_in: u32,
    /// Jump physics on or off.
    pub vertical_motion: bool,
    pub frames_per_step: u64,
    pub ticks_per_second: u32,
    pub bubble_scale: f32,
    pub text_inset: Vec2,
    pub font_size: f32,
    pub poll_interval: Duration,
    pub max_message_chars: usize,
    /// Directory whose sprites replace the built-in ones. A `font.ttf`
    /// there sets the bubble font.
    pub asset_dir: Option<PathBuf>,
}

impl Default for MascotConfig {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            walk_step: WALK_STEP,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            event_one_in: EVENT_ONE_IN,
            vertical_motion: true,
            frames_per_step: FRAMES_PER_STEP,
            ticks_per_second: TICKS_PER_SECOND,
            bubble_scale: BUBBLE_SCALE,
            text_inset: TEXT_INSET,
            font_size: FONT_SIZE,
            poll_interval: POLL_INTERVAL,
            max_message_chars: MAX_MESSAGE_CHARS,
            asset_dir: None,
        }
    }
}

impl MascotConfig {
    pub fn motion_params(&self) -> MotionParams {
        MotionParams {
            walk_step: self.walk_step,
            gravity: self.gravity,
            jump_impulse: self.jump_impulse,
            event_one_in: self.event_one_in,
            vertical_motion: self.vertical_motion,
        }
    }

    /// Seconds per simulation tick.
    pub fn tick_rate(&self) -> f64 {
        1.0 / self.ticks_per_second as f64
    }

    /// Check every precondition against the current screen and return the
    /// perimeter the mascot will walk.
    pub fn validate(&self, screen_w: u32, screen_h: u32) -> Result<PerimeterBounds, ConfigError> {
        if self.walk_step <= 0 {
            return Err(invalid("walk_step", "must be positive"));
        }
        if self.gravity <= 0 {
            return Err(invalid("gravity", "must be positive"));
        }
        if self.jump_impulse < 0 {
            return Err(invalid("jump_impulse", "must not be negative"));
        }
        if self.event_one_in == 0 {
            return Err(invalid("event_one_in", "must be at least 1"));
        }
        if self.frames_per_step == 0 {
            return Err(invalid("frames_per_step", "must be at least 1"));
        }
        if self.ticks_per_second == 0 {
            return Err(invalid("ticks_per_second", "must be at least 1"));
        }
        if !(self.bubble_scale.is_finite() && self.bubble_scale > 0.0) {
            return Err(invalid("bubble_scale", "must be a positive number"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(invalid("font_size", "must be a positive number"));
        }

        let bounds =
            PerimeterBounds::new(screen_w, screen_h, self.window_width, self.window_height)?;

        // One tick may cross at most one corner.
        let limit = bounds.shortest_span();
        if self.walk_step >= limit {
            return Err(ConfigError::StepTooLarge {
                step: self.walk_step,
                limit,
            });
        }

        log::debug!(
            "perimeter: {} x {} sub-units per edge",
            bounds.span(Edge::Bottom),
            bounds.span(Edge::Right)
        );
        Ok(bounds)
    }
}

fn invalid(name: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidSetting { name, reason }
}
