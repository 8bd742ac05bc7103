//! time.rs
//!
//! Animation clock shared by every orbiting body. Accumulates real frame
//! time in milliseconds, so it only ever moves forward.

use bevy::prelude::*;

use crate::config::TIME_SCALE;

const MIN_SPEED: f64 = 1.0 / 64.0;
const MAX_SPEED: f64 = 64.0;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnimationClock>()
            .add_systems(PreUpdate, update);
    }
}

/// Central clock state for the whole diagram
#[derive(Resource, Debug, Clone)]
pub struct AnimationClock {
    pub is_paused: bool,
    pub speed_mult: f64,
    pub elapsed_ms: f64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self {
            is_paused: false,
            speed_mult: 1.0,
            elapsed_ms: 0.0,
        }
    }
}

impl AnimationClock {
    /// Clock value in angular units: milliseconds scaled by `TIME_SCALE`
    pub fn value(&self) -> f64 {
        self.elapsed_ms * TIME_SCALE
    }

    pub fn advance(&mut self, real_delta_ms: f64) {
        if self.is_paused || !real_delta_ms.is_finite() || real_delta_ms <= 0.0 {
            return;
        }
        self.elapsed_ms += real_delta_ms * self.speed_mult;
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
    }

    // halve the rate
    pub fn slow_down(&mut self) {
        self.is_paused = false;
        self.speed_mult = (self.speed_mult / 2.0).clamp(MIN_SPEED, MAX_SPEED);
    }

    // double the rate
    pub fn speed_up(&mut self) {
        self.is_paused = false;
        self.speed_mult = (self.speed_mult * 2.0).clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn reset_to_normal(&mut self) {
        self.speed_mult = 1.0;
        self.is_paused = false;
    }
}

pub fn update(mut clock: ResMut<AnimationClock>, time: Res<Time>) {
    clock.advance(time.delta_secs_f64() * 1000.0);
}

/// Samples the clock once per frame; piped into the orbital step
pub fn sample(clock: Res<AnimationClock>) -> f64 {
    clock.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_scales_to_angular_units() {
        let mut clock = AnimationClock::default();
        clock.advance(100_000.0);

        assert_eq!(clock.elapsed_ms, 100_000.0);
        assert!((clock.value() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_paused_clock_holds() {
        let mut clock = AnimationClock::default();
        clock.advance(16.0);
        clock.toggle_pause();
        clock.advance(16.0);

        assert_eq!(clock.elapsed_ms, 16.0);
    }

    #[test]
    fn test_never_runs_backwards() {
        let mut clock = AnimationClock::default();
        clock.advance(50.0);
        clock.advance(-20.0);
        clock.advance(f64::NAN);

        assert_eq!(clock.elapsed_ms, 50.0);
    }

    #[test]
    fn test_speed_steps_are_clamped() {
        let mut clock = AnimationClock::default();
        for _ in 0..10 {
            clock.speed_up();
        }
        assert_eq!(clock.speed_mult, MAX_SPEED);

        for _ in 0..20 {
            clock.slow_down();
        }
        assert_eq!(clock.speed_mult, MIN_SPEED);

        clock.toggle_pause();
        clock.reset_to_normal();
        assert_eq!(clock.speed_mult, 1.0);
        assert!(!clock.is_paused);
    }

    #[test]
    fn test_speed_multiplier_applies() {
        let mut clock = AnimationClock::default();
        clock.speed_up();
        clock.advance(10.0);

        assert_eq!(clock.elapsed_ms, 20.0);
    }
}
