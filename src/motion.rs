//! One-dimensional walking motion plus an optional hop above the rest line.

/// Random actions rolled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// Launch upward, only honored while standing on the rest line.
    Jump,
    /// Walk the other way.
    Turn,
}

/// Raw motion, all in fixed-point sub-units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionState {
    /// Total distance walked. Unbounded.
    pub virtual_x: i64,
    /// Height above the rest line, never negative.
    pub virtual_y: i64,
    pub velocity_x: i64,
    pub velocity_y: i64,
}

impl MotionState {
    pub fn on_ground(&self) -> bool {
        self.virtual_y == 0
    }
}

/// Tuning for [`MotionSimulator`].
#[derive(Debug, Clone, Copy)]
pub struct MotionParams {
    /// Forward step set on cold start, sub-units per tick.
    pub walk_step: i64,
    /// Downward acceleration per tick while airborne.
    pub gravity: i64,
    /// Upward velocity given by a jump.
    pub jump_impulse: i64,
    /// A random event fires on average once every `event_one_in` ticks.
    pub event_one_in: u32,
    /// When off, jumps are ignored and `virtual_y` stays zero.
    pub vertical_motion: bool,
}

/// Owns the [`MotionState`] and advances it once per tick.
pub struct MotionSimulator {
    state: MotionState,
    params: MotionParams,
    rng: fastrand::Rng,
}

impl MotionSimulator {
    pub fn new(params: MotionParams, rng: fastrand::Rng) -> Self {
        Self {
            state: MotionState::default(),
            params,
            rng,
        }
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Advance one tick, rolling the random event from the internal rng.
    pub fn advance(&mut self) -> MotionState {
        let event = self.roll_event();
        self.step(event)
    }

    /// Roughly once per `event_one_in` ticks, pick jump or turn with equal odds.
    pub fn roll_event(&mut self) -> Option<MotionEvent> {
        if self.rng.u32(0..self.params.event_one_in) != 0 {
            return None;
        }
        Some(if self.rng.bool() {
            MotionEvent::Jump
        } else {
            MotionEvent::Turn
        })
    }

    /// Advance one tick with an explicit event.
    pub fn step(&mut self, event: Option<MotionEvent>) -> MotionState {
        let p = &self.params;
        let s = &mut self.state;

        // Cold start.
        if s.velocity_x == 0 && s.virtual_x == 0 {
            s.velocity_x = p.walk_step;
        }
        s.virtual_x += s.velocity_x;

        if p.vertical_motion {
            s.virtual_y += s.velocity_y;
            if s.virtual_y <= 0 {
                // Landing: clamp to the rest line and stop falling.
                s.virtual_y = 0;
                s.velocity_y = 0;
            } else {
                s.velocity_y -= p.gravity;
            }
        }

        match event {
            Some(MotionEvent::Jump) if p.vertical_motion && s.on_ground() => {
                s.velocity_y = p.jump_impulse;
                log::trace!("jump at x={}", s.virtual_x);
            }
            Some(MotionEvent::Jump) => {}
            Some(MotionEvent::Turn) => {
                s.velocity_x = -s.velocity_x;
                log::trace!("turn at x={}, vx={}", s.virtual_x, s.velocity_x);
            }
            None => {}
        }

        self.state
    }
}
