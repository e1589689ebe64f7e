//! Pan physics and frame timing.

use std::time::Instant;

/// Measures wall-clock time between frames.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    /// Time of the last lap.
    last: Option<Instant>,
}

impl Stopwatch {
    /// Construct a stopwatch that has not started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous lap. The first lap returns zero.
    pub fn lap(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|l| now.duration_since(l).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }

    /// Forget the previous lap.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Velocity state of a panning scroll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanState {
    /// Current velocity in pixels per second.
    pub velocity: f32,
    /// Acceleration to apply on the next step, in pixels per second squared.
    pub requested_acceleration: f32,
    /// True while the pan is being driven by `Scene::update`.
    pub active: bool,
}

impl PanState {
    /// Advance one frame and return the scroll delta. The requested
    /// acceleration is consumed; speed decays linearly by `friction` pixels
    /// per second, stopping at zero.
    pub fn step(&mut self, dt: f32, friction: f32) -> f32 {
        self.velocity += self.requested_acceleration * dt;
        self.requested_acceleration = 0.0;
        let speed = (self.velocity.abs() - friction * dt).max(0.0);
        self.velocity = if speed == 0.0 {
            0.0
        } else {
            speed.copysign(self.velocity)
        };
        self.velocity * dt
    }

    /// True when there is nothing left to apply.
    pub fn at_rest(&self) -> bool {
        self.velocity == 0.0 && self.requested_acceleration == 0.0
    }

    /// Stop immediately.
    pub fn stop(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friction_decays_to_rest() {
        let mut pan = PanState {
            velocity: 300.0,
            ..PanState::default()
        };
        let d = pan.step(0.1, 1000.0);
        assert_eq!(pan.velocity, 200.0);
        assert_eq!(d, 20.0);
        pan.step(0.1, 1000.0);
        pan.step(0.1, 1000.0);
        assert_eq!(pan.velocity, 0.0);
        assert!(pan.at_rest());
    }

    #[test]
    fn acceleration_is_consumed() {
        let mut pan = PanState {
            requested_acceleration: -1000.0,
            ..PanState::default()
        };
        pan.step(0.5, 0.0);
        assert_eq!(pan.velocity, -500.0);
        assert_eq!(pan.requested_acceleration, 0.0);
        pan.step(0.5, 0.0);
        assert_eq!(pan.velocity, -500.0);
    }

    #[test]
    fn first_lap_is_zero() {
        let mut sw = Stopwatch::new();
        assert_eq!(sw.lap(), 0.0);
        assert!(sw.lap() >= 0.0);
        sw.reset();
        assert_eq!(sw.lap(), 0.0);
    }
}
