//! Release-velocity estimation for fling classification.
//!
//! The default estimator uses the impulse strategy: velocity is derived from
//! the kinetic energy the recent samples would impart, one axis at a time.

use crate::sample::Point;

const HISTORY_SIZE: usize = 20;

/// Only samples within this window before the newest one count.
const HORIZON_MS: u64 = 100;

/// A gap this long between samples means the pointer had stopped.
const ASSUME_STOPPED_MS: u64 = 40;

pub trait VelocityEstimator {
    fn clear(&mut self);
    fn add_sample(&mut self, time_ms: u64, position: Point);
    /// Current velocity in px/s, each axis clamped to `[-max, max]`.
    fn velocity(&self, max: f32) -> (f32, f32);
}

#[derive(Clone, Copy, Default)]
struct Sample {
    time_ms: u64,
    value: f32,
}

#[derive(Clone)]
struct Axis {
    samples: [Option<Sample>; HISTORY_SIZE],
    index: usize,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            index: 0,
        }
    }
}

impl Axis {
    fn add(&mut self, time_ms: u64, value: f32) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(Sample { time_ms, value });
    }

    fn velocity(&self) -> f32 {
        let mut values = [0.0f32; HISTORY_SIZE];
        let mut times = [0.0f32; HISTORY_SIZE];
        let mut count = 0;

        let Some(newest) = self.samples[self.index] else {
            return 0.0;
        };

        let mut i = self.index;
        let mut previous = newest;
        while let Some(s) = self.samples[i] {
            let age = newest.time_ms.saturating_sub(s.time_ms);
            let gap = previous.time_ms.abs_diff(s.time_ms);
            previous = s;
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS {
                break;
            }
            values[count] = s.value;
            times[count] = -(age as f32);
            count += 1;
            if count >= HISTORY_SIZE {
                break;
            }
            i = if i == 0 { HISTORY_SIZE - 1 } else { i - 1 };
        }

        if count < 2 {
            return 0.0;
        }
        impulse_velocity(&values, &times, count) * 1000.0
    }
}

fn impulse_velocity(values: &[f32], times: &[f32], count: usize) -> f32 {
    let mut work = 0.0f32;
    let start = count - 1;
    let mut next_time = times[start];
    for i in (1..=start).rev() {
        let current_time = next_time;
        next_time = times[i - 1];
        if current_time == next_time {
            continue;
        }
        let v_curr = (values[i - 1] - values[i]) / (next_time - current_time);
        let v_prev = energy_to_velocity(work);
        work += (v_curr - v_prev) * v_curr.abs();
        if i == start {
            work *= 0.5;
        }
    }
    energy_to_velocity(work)
}

#[inline]
fn energy_to_velocity(e: f32) -> f32 {
    e.signum() * (2.0 * e.abs()).sqrt()
}

fn clamp_axis(v: f32, max: f32) -> f32 {
    if !v.is_finite() || !max.is_finite() || max <= 0.0 {
        return 0.0;
    }
    v.clamp(-max, max)
}

/// Default two-axis estimator.
#[derive(Clone, Default)]
pub struct ImpulseVelocityTracker {
    x: Axis,
    y: Axis,
}

impl ImpulseVelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VelocityEstimator for ImpulseVelocityTracker {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn add_sample(&mut self, time_ms: u64, position: Point) {
        self.x.add(time_ms, position.x);
        self.y.add(time_ms, position.y);
    }

    fn velocity(&self, max: f32) -> (f32, f32) {
        (
            clamp_axis(self.x.velocity(), max),
            clamp_axis(self.y.velocity(), max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(t: &mut ImpulseVelocityTracker, samples: &[(u64, f32, f32)]) {
        for &(time, x, y) in samples {
            t.add_sample(time, Point::new(x, y));
        }
    }

    #[test]
    fn empty_and_single_sample_are_still() {
        let mut t = ImpulseVelocityTracker::new();
        assert_eq!(t.velocity(8000.0), (0.0, 0.0));
        feed(&mut t, &[(0, 10.0, 10.0)]);
        assert_eq!(t.velocity(8000.0), (0.0, 0.0));
    }

    #[test]
    fn constant_motion() {
        let mut t = ImpulseVelocityTracker::new();
        // 100 px per 10 ms along x, still along y
        feed(
            &mut t,
            &[(0, 0.0, 50.0), (10, 100.0, 50.0), (20, 200.0, 50.0), (30, 300.0, 50.0)],
        );
        let (vx, vy) = t.velocity(100_000.0);
        assert!((vx - 10_000.0).abs() < 1000.0, "vx = {vx}");
        assert_eq!(vy, 0.0);
    }

    #[test]
    fn backwards_motion_is_negative() {
        let mut t = ImpulseVelocityTracker::new();
        feed(&mut t, &[(0, 0.0, 300.0), (10, 0.0, 200.0), (20, 0.0, 100.0)]);
        let (_, vy) = t.velocity(100_000.0);
        assert!(vy < 0.0, "vy = {vy}");
    }

    #[test]
    fn clamped_to_max() {
        let mut t = ImpulseVelocityTracker::new();
        feed(&mut t, &[(0, 0.0, 10_000.0), (1, 10_000.0, 0.0)]);
        assert_eq!(t.velocity(8000.0), (8000.0, -8000.0));
    }

    #[test]
    fn pause_before_release_reads_as_still() {
        let mut t = ImpulseVelocityTracker::new();
        feed(&mut t, &[(0, 0.0, 0.0), (ASSUME_STOPPED_MS + 1, 100.0, 0.0)]);
        assert_eq!(t.velocity(8000.0), (0.0, 0.0));
    }

    #[test]
    fn clear_forgets_history() {
        let mut t = ImpulseVelocityTracker::new();
        feed(&mut t, &[(0, 0.0, 0.0), (10, 100.0, 0.0)]);
        t.clear();
        assert_eq!(t.velocity(8000.0), (0.0, 0.0));
    }
}
