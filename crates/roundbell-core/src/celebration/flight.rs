//! Time-driven overlay sprite that arcs across the screen during the finale.
//!
//! Independent of the particle field: it reads wall-clock time, not frames,
//! and ends on its own when progress reaches 1.0.

use std::time::{Duration, Instant};

use super::palette::Rgb;
use super::surface::{Surface, Viewport};

/// Horizontal margin the sprite starts and ends beyond the screen edges.
const OFFSCREEN: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPose {
    pub x: f64,
    pub y: f64,
    pub progress: f64,
    pub tilt_deg: f64,
}

#[derive(Debug, Clone)]
pub struct Flight {
    begins_at: Instant,
    duration: Duration,
}

impl Flight {
    pub fn new(now: Instant, delay: Duration, duration: Duration) -> Self {
        Self {
            begins_at: now + delay,
            duration,
        }
    }

    /// 0.0 before the flight begins, clamped to 1.0 at the end.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.begins_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn has_begun(&self, now: Instant) -> bool {
        now >= self.begins_at
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Sprite position, or `None` while waiting or after landing.
    pub fn pose(&self, now: Instant, viewport: &Viewport) -> Option<FlightPose> {
        if !self.has_begun(now) || self.is_finished(now) {
            return None;
        }
        Some(pose_at(self.progress(now), viewport))
    }
}

/// Linear across, sine arc up: lowest at both ends, 45% of the height above
/// the start line at the midpoint.
pub fn pose_at(progress: f64, viewport: &Viewport) -> FlightPose {
    let p = progress.clamp(0.0, 1.0);
    FlightPose {
        x: -OFFSCREEN + (viewport.width + 2.0 * OFFSCREEN) * p,
        y: viewport.height * 0.55 - (p * std::f64::consts::PI).sin() * viewport.height * 0.45,
        progress: p,
        tilt_deg: -30.0,
    }
}

const SKIN: Rgb = Rgb::from_u32(0xfbbf24);
const CAPE: Rgb = Rgb::from_u32(0xef4444);
const SUIT: Rgb = Rgb::from_u32(0x3b82f6);

/// Paint the flying hero, about 80 logical pixels square, at `pose`.
pub fn draw_flyer(surface: &mut dyn Surface, pose: &FlightPose) {
    surface.save();
    surface.translate(pose.x, pose.y);
    surface.rotate(pose.tilt_deg.to_radians());
    surface.set_alpha(1.0);

    surface.set_fill(SKIN);
    surface.begin_path();
    surface.arc(0.0, -22.0, 10.0, 0.0, std::f64::consts::TAU);
    surface.fill();

    surface.set_fill(CAPE);
    surface.fill_rect(-10.0, -12.0, 20.0, 24.0);
    surface.begin_path();
    surface.move_to(10.0, -8.0);
    surface.line_to(30.0, 0.0);
    surface.line_to(10.0, 8.0);
    surface.close_path();
    surface.fill();

    surface.set_fill(SUIT);
    surface.fill_rect(-15.0, 12.0, 8.0, 18.0);
    surface.fill_rect(7.0, 12.0, 8.0, 18.0);

    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celebration::surface::testing::Recorder;

    fn vp() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    #[test]
    fn arc_endpoints_and_apex() {
        let start = pose_at(0.0, &vp());
        assert_eq!(start.x, -100.0);
        assert!((start.y - 440.0).abs() < 1e-9);

        let mid = pose_at(0.5, &vp());
        assert!((mid.x - 500.0).abs() < 1e-9);
        assert!((mid.y - 80.0).abs() < 1e-9);

        let end = pose_at(1.0, &vp());
        assert!((end.x - 1100.0).abs() < 1e-9);
        assert!((end.y - 440.0).abs() < 1e-6);
    }

    #[test]
    fn waits_for_delay_then_self_terminates() {
        let t0 = Instant::now();
        let f = Flight::new(t0, Duration::from_millis(500), Duration::from_secs(3));
        assert!(f.pose(t0, &vp()).is_none());
        assert_eq!(f.progress(t0 + Duration::from_millis(400)), 0.0);

        let pose = f.pose(t0 + Duration::from_millis(2000), &vp()).unwrap();
        assert!((pose.progress - 0.5).abs() < 1e-9);

        assert!(f.is_finished(t0 + Duration::from_millis(3500)));
        assert!(f.pose(t0 + Duration::from_secs(10), &vp()).is_none());
    }

    #[test]
    fn zero_duration_is_immediately_done() {
        let t0 = Instant::now();
        let f = Flight::new(t0, Duration::ZERO, Duration::ZERO);
        assert!(f.is_finished(t0));
    }

    #[test]
    fn flyer_is_balanced_save_restore() {
        let mut s = Recorder::default();
        draw_flyer(&mut s, &pose_at(0.3, &vp()));
        assert_eq!(s.count("save"), s.count("restore"));
        assert_eq!(s.count("fill_rect"), 3);
    }
}
