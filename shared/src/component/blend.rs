use std::time::Duration;

use glam::{Quat, Vec3};

/// Values a component can smooth between
pub trait Interpolate: Clone {
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Vec3 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self.lerp(*to, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self.slerp(*to, t)
    }
}

/// An in-flight move from one value to another over a fixed duration
#[derive(Clone, Debug)]
pub struct Blend<T: Interpolate> {
    from: T,
    to: T,
    elapsed: Duration,
    duration: Duration,
}

impl<T: Interpolate> Blend<T> {
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn target(&self) -> &T {
        &self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Moves the blend forward and returns the value at the new position
    pub fn advance(&mut self, delta: Duration) -> T {
        self.elapsed = (self.elapsed + delta).min(self.duration);
        self.sample()
    }

    pub fn sample(&self) -> T {
        if self.is_finished() {
            return self.to.clone();
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from.interpolate(&self.to, t)
    }
}
