use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::celebration::{CelebrationKind, EndReason};
use crate::cue::{Cue, Tone};
use crate::timer::{announcement_phrase, rest_phrase, Phase, TimerState};

/// Every state change in the system produces an Event.
/// The shell renders from them; the controller derives cues and
/// celebrations from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        /// `true` when leaving Paused rather than Idle.
        resumed: bool,
        phase: Phase,
        remaining_phase_secs: u32,
        remaining_session_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_phase_secs: u32,
        remaining_session_secs: u32,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A countdown trigger fired.
    Announcement {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Work phase finished and the rest phase began.
    RestStarted {
        round: u32,
        rest_secs: u32,
        at: DateTime<Utc>,
    },
    /// The interval cycle closed. `round` is the round just completed.
    IntervalCompleted {
        round: u32,
        closing_phase: Phase,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        round: u32,
        at: DateTime<Utc>,
    },
    CelebrationStarted {
        kind: CelebrationKind,
        message: String,
        at: DateTime<Utc>,
    },
    CelebrationEnded {
        kind: CelebrationKind,
        reason: EndReason,
        frames: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        phase: Phase,
        round: u32,
        remaining_phase_secs: u32,
        remaining_session_secs: u32,
        complete: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Audio and speech side effects owed for this event.
    pub fn cue(&self) -> Cue {
        match self {
            Event::Announcement { remaining_secs, .. } => {
                Cue::speech(announcement_phrase(*remaining_secs))
            }
            Event::RestStarted { rest_secs, .. } => {
                Cue::tone(Tone::ShortBeep).with_speech(rest_phrase(*rest_secs))
            }
            Event::IntervalCompleted { closing_phase, .. } => match closing_phase {
                Phase::Work => Cue::tone(Tone::IntervalBuzzer),
                Phase::Rest => Cue::tone(Tone::PhaseHorn),
            },
            Event::SessionCompleted { .. } => {
                Cue::tone(Tone::SessionEnd).with_speech("Workout complete. Great work.")
            }
            _ => Cue::none(),
        }
    }

    /// Snake-case tag, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerStopped { .. } => "timer_stopped",
            Event::Announcement { .. } => "announcement",
            Event::RestStarted { .. } => "rest_started",
            Event::IntervalCompleted { .. } => "interval_completed",
            Event::SessionCompleted { .. } => "session_completed",
            Event::CelebrationStarted { .. } => "celebration_started",
            Event::CelebrationEnded { .. } => "celebration_ended",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
