//! Interval engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no clock: the caller
//! invokes `tick()` once per elapsed second while the session is running and
//! each tick counts as exactly one second, whatever the real delay was.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running
//!   any -> Idle          (stop)
//!   Running -> Idle      (session exhausted)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Preset::single_phase());
//! engine.start();
//! // Once per second:
//! if let Some(event) = engine.tick() { /* cue, celebrate */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::marks::AnnouncedMarks;
use super::preset::{Phase, Preset};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Core interval engine.
///
/// Holds the single authoritative session record; nothing else writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    preset: Preset,
    state: TimerState,
    phase: Phase,
    remaining_session_secs: u32,
    remaining_phase_secs: u32,
    round: u32,
    #[serde(default)]
    announced: AnnouncedMarks,
    #[serde(default)]
    complete: bool,
}

impl TimerEngine {
    /// Create an engine at Idle with full durations.
    pub fn new(preset: Preset) -> Self {
        Self {
            state: TimerState::Idle,
            phase: Phase::Work,
            remaining_session_secs: preset.session_secs,
            remaining_phase_secs: preset.work.duration_secs,
            round: 1,
            announced: AnnouncedMarks::new(),
            complete: false,
            preset,
        }
    }

    /// Place the engine mid-session, e.g. to replay a known position.
    ///
    /// Both counters are clamped to their configured maximum.
    pub fn with_position(
        mut self,
        phase: Phase,
        remaining_phase_secs: u32,
        remaining_session_secs: u32,
        round: u32,
    ) -> Self {
        let phase = if self.preset.is_two_phase() {
            phase
        } else {
            Phase::Work
        };
        self.phase = phase;
        self.remaining_phase_secs = remaining_phase_secs.min(self.preset.phase_duration(phase));
        self.remaining_session_secs = remaining_session_secs.min(self.preset.session_secs);
        self.round = round.max(1);
        self.announced.clear();
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn remaining_phase_secs(&self) -> u32 {
        self.remaining_phase_secs
    }

    pub fn remaining_session_secs(&self) -> u32 {
        self.remaining_session_secs
    }

    pub fn elapsed_session_secs(&self) -> u32 {
        self.preset.session_secs - self.remaining_session_secs
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn announced(&self) -> &AnnouncedMarks {
        &self.announced
    }

    pub fn phase_duration(&self) -> u32 {
        self.preset.phase_duration(self.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.phase_duration();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_phase_secs as f64 / total as f64)
    }

    /// 0.0 .. 1.0 progress across the session.
    pub fn session_progress(&self) -> f64 {
        let total = self.preset.session_secs;
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_session_secs as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            phase: self.phase,
            round: self.round,
            remaining_phase_secs: self.remaining_phase_secs,
            remaining_session_secs: self.remaining_session_secs,
            complete: self.complete,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle/Paused -> Running. A finished session stays finished until
    /// `stop()` resets it.
    pub fn start(&mut self) -> Option<Event> {
        if self.complete {
            return None;
        }
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                let resumed = self.state == TimerState::Paused;
                self.state = TimerState::Running;
                Some(Event::TimerStarted {
                    resumed,
                    phase: self.phase,
                    remaining_phase_secs: self.remaining_phase_secs,
                    remaining_session_secs: self.remaining_session_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_phase_secs: self.remaining_phase_secs,
                    remaining_session_secs: self.remaining_session_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Always legal; restores every counter to its configured value.
    pub fn stop(&mut self) -> Event {
        self.state = TimerState::Idle;
        self.phase = Phase::Work;
        self.remaining_session_secs = self.preset.session_secs;
        self.remaining_phase_secs = self.preset.work.duration_secs;
        self.round = 1;
        self.announced.clear();
        self.complete = false;
        Event::TimerStopped { at: Utc::now() }
    }

    /// Advance one logical second. Ignored unless Running.
    ///
    /// At most one event comes out of a tick, and the session boundary is
    /// checked before the phase boundary so a session that ends on an
    /// interval edge reports only the session end.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }

        if self.remaining_session_secs == 0 {
            return Some(self.finish_session());
        }

        self.remaining_session_secs -= 1;
        self.remaining_phase_secs = self.remaining_phase_secs.saturating_sub(1);

        if self.remaining_session_secs == 0 {
            return Some(self.finish_session());
        }

        if self.remaining_phase_secs == 0 {
            return Some(self.cross_phase_boundary());
        }

        self.announce()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_session(&mut self) -> Event {
        self.state = TimerState::Idle;
        self.remaining_session_secs = 0;
        self.remaining_phase_secs = 0;
        self.complete = true;
        tracing::debug!(round = self.round, "session complete");
        Event::SessionCompleted {
            round: self.round,
            at: Utc::now(),
        }
    }

    fn cross_phase_boundary(&mut self) -> Event {
        self.announced.clear();
        match (self.phase, &self.preset.rest) {
            (Phase::Work, Some(rest)) => {
                self.phase = Phase::Rest;
                self.remaining_phase_secs = rest.duration_secs;
                tracing::debug!(round = self.round, "rest phase");
                Event::RestStarted {
                    round: self.round,
                    rest_secs: rest.duration_secs,
                    at: Utc::now(),
                }
            }
            (closing_phase, _) => {
                let completed = self.round;
                self.phase = Phase::Work;
                self.remaining_phase_secs = self.preset.work.duration_secs;
                self.round += 1;
                tracing::debug!(round = completed, "interval complete");
                Event::IntervalCompleted {
                    round: completed,
                    closing_phase,
                    at: Utc::now(),
                }
            }
        }
    }

    fn announce(&mut self) -> Option<Event> {
        let index = self
            .preset
            .phase(self.phase)
            .mark_index(self.remaining_phase_secs)?;
        if !self.announced.insert(index) {
            return None;
        }
        Some(Event::Announcement {
            phase: self.phase,
            remaining_secs: self.remaining_phase_secs,
            at: Utc::now(),
        })
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}
