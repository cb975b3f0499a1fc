//! Horizontal smooth scroll with exponential ease-out.
//!
//! When the selected card changes, a column displacement is injected
//! proportional to the number of cards skipped × the card pitch.  Each tick
//! the displacement decays toward zero, so the strip glides to its target
//! and visibly decelerates.  Cards passing through the middle rotate and
//! zoom continuously because the transformer sees their in-between positions.

/// Column-offset smooth scroll animator.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    /// Current column displacement.  Positive = cards shifted right of
    /// their target (moving to a later card); negative = shifted left.
    offset: f64,
    /// Previous target index (to detect changes).
    prev_target: usize,
    /// Damping: `offset *= (1 - speed)` each tick.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            offset: 0.0,
            prev_target: 0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(0.05, 0.95);
    }

    /// Feed the current target and the card pitch (width + spacing).
    /// Detects when the target changed and injects displacement.
    pub fn set_target(&mut self, target: usize, pitch: f64) {
        if target != self.prev_target {
            let delta = target as f64 - self.prev_target as f64;
            // Moving right → cards must slide in from the right.
            self.offset += delta * pitch;
            self.prev_target = target;
        }
    }

    /// Decay the offset toward zero.  Call once per frame.
    pub fn tick(&mut self) {
        self.offset *= 1.0 - self.speed;
        if self.offset.abs() < 0.4 {
            self.offset = 0.0;
        }
    }

    /// Current displacement in whole columns.
    pub fn offset(&self) -> i32 {
        self.offset.round() as i32
    }
}
