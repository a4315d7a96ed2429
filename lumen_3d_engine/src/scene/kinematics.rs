//! Constant-acceleration integrators for animated values.
//!
//! Each integrator owns a value, a speed bounded to `[speed_min, speed_max]`
//! and the current acceleration. `compute` advances by one frame:
//!
//! ```text
//! displacement = speed * dt                      speed on a bound
//!              = (speed + accel * dt / 2) * dt   otherwise
//! speed        = clamp(speed + accel * dt)
//! ```
//!
//! `VecKinematics` bounds the speed magnitude and keeps its direction.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::timer::FrameTime;

/// Frame delta an integrator runs on
fn frame_delta(time: &FrameTime, pause_ignore: bool) -> f32 {
    if pause_ignore {
        time.global_delta as f32
    } else {
        time.delta as f32
    }
}

// ============================================================================
// Scalar
// ============================================================================

/// Scalar integrator
#[derive(Debug, Clone, PartialEq)]
pub struct Kinematics {
    pub start_value: f32,
    pub value: f32,
    /// Displacement of the last `compute`
    pub delta_value: f32,
    pub speed: f32,
    pub accel: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Run on the wall clock instead of the pausable one
    pub pause_ignore: bool,
    accels: Vec<f32>,
}

impl Kinematics {
    /// Value at rest at `start_value`
    pub fn new(start_value: f32, speed_min: f32, speed_max: f32) -> Self {
        Self {
            start_value,
            value: start_value,
            delta_value: 0.0,
            speed: 0.0,
            accel: 0.0,
            speed_min: speed_min.min(speed_max),
            speed_max: speed_max.max(speed_min),
            pause_ignore: false,
            accels: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.clamp(self.speed_min, self.speed_max);
        self
    }

    pub fn with_accel(mut self, accel: f32) -> Self {
        self.accel = accel;
        self
    }

    pub fn with_pause_ignore(mut self, pause_ignore: bool) -> Self {
        self.pause_ignore = pause_ignore;
        self
    }

    /// Remember an acceleration for `select_accel`
    pub fn add_accel(&mut self, accel: f32) {
        self.accels.push(accel);
    }

    /// Switch to a remembered acceleration
    pub fn select_accel(&mut self, index: usize) -> Result<()> {
        self.accel = *self.accels.get(index).ok_or_else(|| {
            Error::InvalidState(format!("acceleration {} of {} not defined", index, self.accels.len()))
        })?;
        Ok(())
    }

    pub fn accels(&self) -> &[f32] {
        &self.accels
    }

    /// Advance one frame
    pub fn compute(&mut self, time: &FrameTime) {
        self.step(frame_delta(time, self.pause_ignore));
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.delta_value = if self.speed == self.speed_min || self.speed == self.speed_max {
            self.speed * dt
        } else {
            (self.speed + self.accel * 0.5 * dt) * dt
        };
        self.value += self.delta_value;
        self.speed = (self.speed + self.accel * dt).clamp(self.speed_min, self.speed_max);
    }
}

// ============================================================================
// Vector
// ============================================================================

/// Vector integrator with a bounded speed magnitude
#[derive(Debug, Clone, PartialEq)]
pub struct VecKinematics {
    pub start_value: Vec3,
    pub value: Vec3,
    pub delta_value: Vec3,
    pub speed: Vec3,
    pub accel: Vec3,
    pub speed_min: f32,
    pub speed_max: f32,
    pub pause_ignore: bool,
    accels: Vec<Vec3>,
}

impl VecKinematics {
    pub fn new(start_value: Vec3, speed_min: f32, speed_max: f32) -> Self {
        Self {
            start_value,
            value: start_value,
            delta_value: Vec3::ZERO,
            speed: Vec3::ZERO,
            accel: Vec3::ZERO,
            speed_min: speed_min.max(0.0).min(speed_max),
            speed_max: speed_max.max(speed_min),
            pause_ignore: false,
            accels: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: Vec3) -> Self {
        self.speed = self.clamp_speed(speed);
        self
    }

    pub fn with_accel(mut self, accel: Vec3) -> Self {
        self.accel = accel;
        self
    }

    pub fn with_pause_ignore(mut self, pause_ignore: bool) -> Self {
        self.pause_ignore = pause_ignore;
        self
    }

    pub fn add_accel(&mut self, accel: Vec3) {
        self.accels.push(accel);
    }

    pub fn select_accel(&mut self, index: usize) -> Result<()> {
        self.accel = *self.accels.get(index).ok_or_else(|| {
            Error::InvalidState(format!("acceleration {} of {} not defined", index, self.accels.len()))
        })?;
        Ok(())
    }

    pub fn accels(&self) -> &[Vec3] {
        &self.accels
    }

    pub fn compute(&mut self, time: &FrameTime) {
        self.step(frame_delta(time, self.pause_ignore));
    }

    pub fn step(&mut self, dt: f32) {
        let magnitude = self.speed.length();
        self.delta_value = if magnitude == self.speed_min || magnitude == self.speed_max {
            self.speed * dt
        } else {
            (self.speed + self.accel * 0.5 * dt) * dt
        };
        self.value += self.delta_value;
        self.speed = self.clamp_speed(self.speed + self.accel * dt);
    }

    fn clamp_speed(&self, speed: Vec3) -> Vec3 {
        let magnitude = speed.length();
        if magnitude > self.speed_max {
            speed.normalize_or_zero() * self.speed_max
        } else if magnitude < self.speed_min {
            speed.normalize_or_zero() * self.speed_min
        } else {
            speed
        }
    }
}

#[cfg(test)]
#[path = "kinematics_tests.rs"]
mod tests;
