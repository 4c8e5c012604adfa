//! Output bus limiter — a hard ceiling so stacked voices cannot clip the
//! device. The ceiling is an engine tunable, applied after volume scaling.

/// Clamps the rendered bus to `[-ceiling, ceiling]`.
#[derive(Debug, Clone)]
pub struct Limiter {
    ceiling: f32,
}

impl Limiter {
    /// Build a limiter. `ceiling` is forced into `(0.0, 1.0]`, so a
    /// nonsense config value can never mute or clip the bus.
    pub fn new(ceiling: f32) -> Self {
        Self {
            ceiling: ceiling.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Clamp a rendered block in place.
    pub fn apply(&self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = sample.clamp(-self.ceiling, self.ceiling);
        }
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }
}
