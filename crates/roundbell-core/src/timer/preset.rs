use serde::{Deserialize, Serialize};

use super::marks::MAX_MARKS;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Rest => "rest",
        }
    }
}

/// One phase of the interval cycle: its length and the countdown values at
/// which a spoken cue fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub duration_secs: u32,
    /// Strictly descending, each in `1..duration_secs`.
    #[serde(default)]
    pub marks: Vec<u32>,
}

impl PhaseSpec {
    pub fn new(duration_secs: u32, marks: impl Into<Vec<u32>>) -> Self {
        Self {
            duration_secs,
            marks: marks.into(),
        }
    }

    /// Position of `remaining` in the mark list, if it is a trigger value.
    pub fn mark_index(&self, remaining: u32) -> Option<usize> {
        self.marks.iter().position(|&m| m == remaining)
    }

    fn validate(&self, phase: Phase) -> Result<(), ValidationError> {
        if self.duration_secs == 0 {
            return Err(ValidationError::ZeroDuration {
                field: format!("{}.duration_secs", phase.as_str()),
            });
        }
        if self.marks.len() > MAX_MARKS {
            return Err(ValidationError::TooManyMarks {
                phase: phase.as_str().into(),
                count: self.marks.len(),
                max: MAX_MARKS,
            });
        }
        if let Some(&mark) = self
            .marks
            .iter()
            .find(|&&m| m == 0 || m >= self.duration_secs)
        {
            return Err(ValidationError::MarkOutOfRange {
                phase: phase.as_str().into(),
                mark,
                duration_secs: self.duration_secs,
            });
        }
        if self.marks.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ValidationError::MarksNotDescending {
                phase: phase.as_str().into(),
            });
        }
        Ok(())
    }
}

/// A complete workout configuration.
///
/// `rest == None` is the single-phase variant: every interval is a work
/// interval and completing it closes the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub work: PhaseSpec,
    #[serde(default)]
    pub rest: Option<PhaseSpec>,
    pub session_secs: u32,
}

impl Preset {
    /// Three-minute intervals over a 45 minute session.
    pub fn single_phase() -> Self {
        Self {
            name: "single".into(),
            work: PhaseSpec::new(180, [120, 60, 5, 4, 3, 2, 1]),
            rest: None,
            session_secs: 2700,
        }
    }

    /// 150s work / 30s rest over a 45 minute session.
    pub fn two_phase() -> Self {
        Self {
            name: "two-phase".into(),
            work: PhaseSpec::new(150, [90, 60, 5, 4, 3, 2, 1]),
            rest: Some(PhaseSpec::new(30, [5, 4, 3, 2, 1])),
            session_secs: 2700,
        }
    }

    /// Shipped presets, in display order.
    pub fn builtin() -> Vec<Self> {
        vec![Self::single_phase(), Self::two_phase()]
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::builtin().into_iter().find(|p| p.name == name)
    }

    /// Build and validate a preset in one step.
    pub fn new(
        name: impl Into<String>,
        work: PhaseSpec,
        rest: Option<PhaseSpec>,
        session_secs: u32,
    ) -> Result<Self, ValidationError> {
        let preset = Self {
            name: name.into(),
            work,
            rest,
            session_secs,
        };
        preset.validate()?;
        Ok(preset)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_secs == 0 {
            return Err(ValidationError::ZeroDuration {
                field: "session_secs".into(),
            });
        }
        self.work.validate(Phase::Work)?;
        if let Some(rest) = &self.rest {
            rest.validate(Phase::Rest)?;
        }
        Ok(())
    }

    pub fn is_two_phase(&self) -> bool {
        self.rest.is_some()
    }

    /// Spec for `phase`. A single-phase preset has no rest spec, so asking
    /// for it falls back to work.
    pub fn phase(&self, phase: Phase) -> &PhaseSpec {
        match (phase, &self.rest) {
            (Phase::Rest, Some(rest)) => rest,
            _ => &self.work,
        }
    }

    pub fn phase_duration(&self, phase: Phase) -> u32 {
        self.phase(phase).duration_secs
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::single_phase()
    }
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// English words for `n`; digits past 99.
pub fn number_words(n: u32) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let (tens, ones) = (n / 10, n % 10);
            if ones == 0 {
                TENS[tens as usize].to_string()
            } else {
                format!("{}-{}", TENS[tens as usize], ONES[ones as usize])
            }
        }
        _ => n.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Spoken phrase for a countdown trigger.
pub fn announcement_phrase(remaining_secs: u32) -> String {
    match remaining_secs {
        1..=10 => capitalize(&number_words(remaining_secs)),
        60 => "One minute to go.".into(),
        s if s % 60 == 0 => format!("{} minutes to go.", capitalize(&number_words(s / 60))),
        s => format!("{} seconds to go.", capitalize(&number_words(s))),
    }
}

/// Phrase spoken when a rest phase begins.
pub fn rest_phrase(rest_secs: u32) -> String {
    format!("Break time, {} seconds.", number_words(rest_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets_validate() {
        for preset in Preset::builtin() {
            assert!(preset.validate().is_ok(), "{} should be valid", preset.name);
        }
    }

    #[test]
    fn two_phase_durations() {
        let p = Preset::two_phase();
        assert_eq!(p.phase_duration(Phase::Work), 150);
        assert_eq!(p.phase_duration(Phase::Rest), 30);
        assert!(p.is_two_phase());
    }

    #[test]
    fn single_phase_rest_falls_back_to_work() {
        let p = Preset::single_phase();
        assert_eq!(p.phase_duration(Phase::Rest), 180);
    }

    #[test]
    fn by_name_finds_shipped_presets() {
        assert_eq!(Preset::by_name("two-phase"), Some(Preset::two_phase()));
        assert!(Preset::by_name("tabata").is_none());
    }

    #[test]
    fn rejects_zero_session() {
        let err = Preset::new("x", PhaseSpec::new(60, []), None, 0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ZeroDuration {
                field: "session_secs".into()
            }
        );
    }

    #[test]
    fn rejects_mark_at_or_past_duration() {
        let err = Preset::new("x", PhaseSpec::new(60, [60, 5]), None, 600).unwrap_err();
        assert!(matches!(err, ValidationError::MarkOutOfRange { mark: 60, .. }));
    }

    #[test]
    fn rejects_unsorted_marks() {
        let rest = PhaseSpec::new(30, [1, 2]);
        let err = Preset::new("x", PhaseSpec::new(60, []), Some(rest), 600).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MarksNotDescending {
                phase: "rest".into()
            }
        );
    }

    #[test]
    fn rejects_too_many_marks() {
        let marks: Vec<u32> = (1..=40).rev().collect();
        let err = Preset::new("x", PhaseSpec::new(100, marks), None, 600).unwrap_err();
        assert!(matches!(err, ValidationError::TooManyMarks { count: 40, .. }));
    }

    #[test]
    fn phrases() {
        assert_eq!(announcement_phrase(120), "Two minutes to go.");
        assert_eq!(announcement_phrase(60), "One minute to go.");
        assert_eq!(announcement_phrase(90), "Ninety seconds to go.");
        assert_eq!(announcement_phrase(45), "Forty-five seconds to go.");
        assert_eq!(announcement_phrase(5), "Five");
        assert_eq!(announcement_phrase(1), "One");
        assert_eq!(rest_phrase(30), "Break time, thirty seconds.");
    }
}
