//! Particle celebrations shown when an interval or the session completes.
//!
//! ## Key Components
//!
//! - [`ParticleField`]: frame-driven physics with a wall-clock backstop
//! - [`Pattern`]: one generator per emission shape
//! - [`Flight`]: time-driven overlay sprite for the finale
//! - [`Surface`]: the drawing contract the shell implements

mod field;
mod flight;
mod palette;
mod particle;
mod surface;

pub use field::{
    Batch, Emission, EndReason, FieldConfig, FrameStatus, ParticleField, SpawnRule,
};
pub use flight::{draw_flyer, pose_at, Flight, FlightPose};
pub use palette::{round_message, Palette, Rgb};
pub use particle::{Particle, Pattern, Shape};
pub use surface::{draw_particle, Surface, Viewport};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationKind {
    Interval,
    Finale,
}

pub const FINALE_MESSAGE: &str = "Workout Complete!";

/// Short burst after each completed round.
pub fn interval_config(round: u32) -> FieldConfig {
    let mut config = FieldConfig::new(Pattern::for_round(round), Palette::for_round(round), 80, 120);
    config.spawn.push(SpawnRule::Stream {
        per_frame: 3,
        before_frame: 30,
        cap: 150,
        emission: Emission::Primary,
    });
    config
}

/// Long mixed show at session end. Runs to its frame cap even if the
/// screen briefly empties.
pub fn finale_config() -> FieldConfig {
    FieldConfig {
        pattern: Pattern::Rain,
        palette: Palette::everything(),
        initial: vec![
            Batch {
                emission: Emission::Fixed(Pattern::Rain),
                count: 100,
            },
            Batch {
                emission: Emission::Fixed(Pattern::Burst),
                count: 60,
            },
        ],
        spawn: vec![
            SpawnRule::Pulse {
                every: 8,
                before_frame: 300,
                count: 8,
                emission: Emission::Shuffle,
            },
            SpawnRule::Pulse {
                every: 40,
                before_frame: 250,
                count: 40,
                emission: Emission::Fixed(Pattern::Firework),
            },
        ],
        max_frames: 400,
        end_when_empty: false,
        decay_scale: 0.6,
        safety_timeout: Duration::from_secs(8),
    }
}

const FLIGHT_DELAY: Duration = Duration::from_millis(500);
const FLIGHT_DURATION: Duration = Duration::from_secs(3);

/// One running celebration: the particle field, its headline and, for the
/// finale, the flight overlay.
#[derive(Debug)]
pub struct Celebration {
    kind: CelebrationKind,
    message: String,
    accent: Rgb,
    viewport: Option<Viewport>,
    field: ParticleField,
    flight: Option<Flight>,
}

impl Celebration {
    pub fn interval(round: u32, viewport: Option<Viewport>, seed: u64, now: Instant) -> Self {
        let config = interval_config(round);
        let accent = config.palette.accent();
        Self {
            kind: CelebrationKind::Interval,
            message: round_message(round).to_string(),
            accent,
            viewport,
            field: ParticleField::launch(config, viewport, seed, now),
            flight: None,
        }
    }

    pub fn finale(viewport: Option<Viewport>, seed: u64, now: Instant) -> Self {
        let config = finale_config();
        let accent = config.palette.accent();
        Self {
            kind: CelebrationKind::Finale,
            message: FINALE_MESSAGE.to_string(),
            accent,
            viewport,
            field: ParticleField::launch(config, viewport, seed, now),
            flight: Some(Flight::new(now, FLIGHT_DELAY, FLIGHT_DURATION)),
        }
    }

    pub fn kind(&self) -> CelebrationKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn accent(&self) -> Rgb {
        self.accent
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn deadline(&self) -> Instant {
        self.field.deadline()
    }

    pub fn is_finished(&self) -> bool {
        self.field.is_finished()
    }

    pub fn flight_pose(&self, now: Instant) -> Option<FlightPose> {
        let flight = self.flight.as_ref()?;
        flight.pose(now, self.viewport.as_ref()?)
    }

    /// Advance particles, then paint the flight overlay on top.
    pub fn advance_frame(&mut self, now: Instant, surface: Option<&mut dyn Surface>) -> FrameStatus {
        let Some(surface) = surface else {
            return self.field.advance_frame(None);
        };
        let status = self.field.advance_frame(Some(&mut *surface));
        if status == FrameStatus::Running {
            if let Some(pose) = self.flight_pose(now) {
                draw_flyer(surface, &pose);
            }
        }
        status
    }

    pub fn poll_deadline(&mut self, now: Instant) -> FrameStatus {
        self.field.poll_deadline(now)
    }

    pub fn dismiss(&mut self) {
        self.field.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celebration::surface::testing::Recorder;

    fn vp() -> Option<Viewport> {
        Some(Viewport::new(1024.0, 768.0))
    }

    #[test]
    fn interval_follows_round_tables() {
        let c = Celebration::interval(2, vp(), 1, Instant::now());
        assert_eq!(c.kind(), CelebrationKind::Interval);
        assert_eq!(c.message(), "Keep It Up!");
        assert_eq!(c.accent(), Rgb::from_u32(0x3b82f6));
        assert_eq!(c.field().population(), 80);
        assert!(c.flight_pose(Instant::now()).is_none());
    }

    #[test]
    fn interval_finishes_within_cap() {
        let t0 = Instant::now();
        let mut c = Celebration::interval(1, vp(), 8, t0);
        let mut frames = 0;
        while c.advance_frame(t0, None) == FrameStatus::Running {
            frames += 1;
            assert!(frames < 200, "interval celebration never ended");
        }
        assert!(c.field().frame() <= 120);
        assert!(c.is_finished());
    }

    #[test]
    fn finale_launch_population_and_runs_to_cap() {
        let t0 = Instant::now();
        let mut c = Celebration::finale(vp(), 3, t0);
        assert_eq!(c.field().population(), 160);
        let mut last = FrameStatus::Running;
        for _ in 0..400 {
            last = c.advance_frame(t0, None);
        }
        assert_eq!(last, FrameStatus::Finished(EndReason::FrameLimit));
    }

    #[test]
    fn finale_draws_flyer_mid_flight() {
        let t0 = Instant::now();
        let mut c = Celebration::finale(vp(), 3, t0);
        let mut surface = Recorder::default();
        c.advance_frame(t0 + Duration::from_millis(1500), Some(&mut surface));
        let pose = c.flight_pose(t0 + Duration::from_millis(1500)).unwrap();
        assert!(pose.progress > 0.0 && pose.progress < 1.0);
        assert!(surface.count("rotate") > 160);
    }

    #[test]
    fn finale_safety_timeout_is_eight_seconds() {
        let t0 = Instant::now();
        let mut c = Celebration::finale(None, 3, t0);
        assert_eq!(c.poll_deadline(t0 + Duration::from_secs(7)), FrameStatus::Running);
        assert_eq!(
            c.poll_deadline(t0 + Duration::from_secs(8)),
            FrameStatus::Finished(EndReason::TimedOut)
        );
    }
}
