mod engine;
mod marks;
mod preset;
mod readout;

pub use engine::{TimerEngine, TimerState};
pub use marks::{AnnouncedMarks, MAX_MARKS};
pub use preset::{announcement_phrase, number_words, rest_phrase, Phase, PhaseSpec, Preset};
pub use readout::{format_clock, Readout, Urgency, UrgencyThresholds};
