//! Display-ready view of the engine for the shell.

use serde::{Deserialize, Serialize};

use super::engine::{TimerEngine, TimerState};
use super::preset::Phase;

/// How close the current phase is to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Calm,
    Warning,
    Critical,
}

/// Remaining-seconds thresholds for [`Urgency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    pub warning_secs: u32,
    pub critical_secs: u32,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            warning_secs: 10,
            critical_secs: 5,
        }
    }
}

impl UrgencyThresholds {
    /// Zero remaining is not urgent: the phase has already rolled over.
    pub fn classify(&self, remaining_secs: u32) -> Urgency {
        match remaining_secs {
            0 => Urgency::Calm,
            s if s <= self.critical_secs => Urgency::Critical,
            s if s <= self.warning_secs => Urgency::Warning,
            _ => Urgency::Calm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub state: TimerState,
    pub phase: Phase,
    pub round: u32,
    pub remaining_phase_secs: u32,
    pub remaining_session_secs: u32,
    pub phase_clock: String,
    pub session_clock: String,
    pub phase_progress_pct: f64,
    pub session_progress_pct: f64,
    pub urgency: Urgency,
    pub complete: bool,
}

impl Readout {
    pub fn from_engine(engine: &TimerEngine, thresholds: &UrgencyThresholds) -> Self {
        Self {
            state: engine.state(),
            phase: engine.phase(),
            round: engine.round(),
            remaining_phase_secs: engine.remaining_phase_secs(),
            remaining_session_secs: engine.remaining_session_secs(),
            phase_clock: format_clock(engine.remaining_phase_secs()),
            session_clock: format_clock(engine.remaining_session_secs()),
            phase_progress_pct: engine.phase_progress() * 100.0,
            session_progress_pct: engine.session_progress() * 100.0,
            urgency: thresholds.classify(engine.remaining_phase_secs()),
            complete: engine.is_complete(),
        }
    }

    /// Short status word as shown next to the indicator dot.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            TimerState::Running => "Running",
            TimerState::Paused => "Paused",
            TimerState::Idle if self.complete => "Complete",
            TimerState::Idle => "Ready",
        }
    }
}

/// `mm:ss`, minutes not wrapped at 60.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
