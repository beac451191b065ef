//! Workout controller: the engine plus its side effects.
//!
//! The engine only keeps time. `Workout` turns each engine event into the
//! cue it owes and the celebration it earns, and owns the single
//! celebration that may be on screen at a time.

use std::time::Instant;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use crate::celebration::{Celebration, EndReason, FrameStatus, Surface, Viewport};
use crate::config::Config;
use crate::cue::CueDispatcher;
use crate::error::Result;
use crate::events::Event;
use crate::timer::{Preset, Readout, TimerEngine, UrgencyThresholds};

pub struct Workout {
    engine: TimerEngine,
    cues: CueDispatcher,
    rng: Mcg128Xsl64,
    celebration: Option<Celebration>,
    viewport: Option<Viewport>,
    celebrations_enabled: bool,
}

impl Workout {
    pub fn new(preset: Preset, cues: CueDispatcher) -> Self {
        Self {
            engine: TimerEngine::new(preset),
            cues,
            rng: Mcg128Xsl64::seed_from_u64(rand::random()),
            celebration: None,
            viewport: None,
            celebrations_enabled: true,
        }
    }

    /// Build from configuration. Speech and tone toggles are applied to
    /// `cues`; celebrations use the configured seed when one is set.
    pub fn from_config(config: &Config, cues: CueDispatcher) -> Result<Self> {
        let cues = cues
            .with_voice(config.voice())
            .with_enabled(config.speech.enabled, config.audio.enabled);
        let mut workout =
            Self::new(config.resolve_preset()?, cues).with_celebrations(config.celebration.enabled);
        if let Some(seed) = config.celebration.seed {
            workout = workout.with_seed(seed);
        }
        Ok(workout)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mcg128Xsl64::seed_from_u64(seed);
        self
    }

    pub fn with_viewport(mut self, viewport: Option<Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_celebrations(mut self, enabled: bool) -> Self {
        self.celebrations_enabled = enabled;
        self
    }

    /// Takes effect for the next celebration launched.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn celebration(&self) -> Option<&Celebration> {
        self.celebration.as_ref()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_some()
    }

    /// When the running celebration's safety timeout fires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.celebration.as_ref().map(Celebration::deadline)
    }

    pub fn readout(&self, thresholds: &UrgencyThresholds) -> Readout {
        Readout::from_engine(&self.engine, thresholds)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// User-initiated start: unlocks tone output before the engine runs.
    pub fn start(&mut self) -> Option<Event> {
        self.cues.unlock();
        self.engine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    /// Reset the engine, silence speech and clear any celebration.
    pub fn stop(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(mut celebration) = self.celebration.take() {
            celebration.dismiss();
            events.push(ended(&celebration, EndReason::Dismissed));
        }
        self.cues.cancel_speech();
        events.push(self.engine.stop());
        events
    }

    // ── Clock inputs ─────────────────────────────────────────────────

    /// One second of wall time. Cue failures never stop the tick.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Event> {
        let Some(event) = self.engine.tick() else {
            return Vec::new();
        };
        self.cues.dispatch(&event.cue());

        let mut events = Vec::with_capacity(3);
        let celebration = match &event {
            Event::IntervalCompleted { round, .. } => Some((true, *round)),
            Event::SessionCompleted { round, .. } => Some((false, *round)),
            _ => None,
        };
        events.push(event);

        if let Some((interval, round)) = celebration {
            if self.celebrations_enabled {
                events.extend(self.celebrate(interval, round, now));
            }
        }
        events
    }

    /// One animation frame.
    pub fn on_frame(&mut self, now: Instant, surface: Option<&mut dyn Surface>) -> Vec<Event> {
        let Some(celebration) = self.celebration.as_mut() else {
            return Vec::new();
        };
        let status = celebration.advance_frame(now, surface);
        self.settle(status)
    }

    /// Check the running celebration's safety timeout.
    pub fn on_deadline(&mut self, now: Instant) -> Vec<Event> {
        let Some(celebration) = self.celebration.as_mut() else {
            return Vec::new();
        };
        let status = celebration.poll_deadline(now);
        self.settle(status)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn celebrate(&mut self, interval: bool, round: u32, now: Instant) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        if let Some(mut previous) = self.celebration.take() {
            previous.dismiss();
            events.push(ended(&previous, EndReason::Dismissed));
        }

        let seed = self.rng.gen::<u64>();
        let celebration = if interval {
            Celebration::interval(round, self.viewport, seed, now)
        } else {
            Celebration::finale(self.viewport, seed, now)
        };
        tracing::debug!(kind = ?celebration.kind(), round, "celebration started");
        events.push(Event::CelebrationStarted {
            kind: celebration.kind(),
            message: celebration.message().to_string(),
            at: Utc::now(),
        });
        self.celebration = Some(celebration);
        events
    }

    fn settle(&mut self, status: FrameStatus) -> Vec<Event> {
        let FrameStatus::Finished(reason) = status else {
            return Vec::new();
        };
        match self.celebration.take() {
            Some(celebration) => vec![ended(&celebration, reason)],
            None => Vec::new(),
        }
    }
}

fn ended(celebration: &Celebration, reason: EndReason) -> Event {
    Event::CelebrationEnded {
        kind: celebration.kind(),
        reason,
        frames: celebration.field().frame(),
        at: Utc::now(),
    }
}

impl std::fmt::Debug for Workout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workout")
            .field("engine", &self.engine)
            .field("celebration", &self.celebration)
            .field("viewport", &self.viewport)
            .field("celebrations_enabled", &self.celebrations_enabled)
            .finish_non_exhaustive()
    }
}
