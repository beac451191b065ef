//! Synthesis recipes for the cue tones.
//!
//! Each tone is a single oscillator with an exponential frequency sweep and
//! an exponential gain decay, the same shape a browser oscillator node with
//! `exponentialRampToValueAtTime` produces.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// End of a single-phase interval.
    IntervalBuzzer,
    /// Entering a rest phase.
    ShortBeep,
    /// Rest over, next work phase begins.
    PhaseHorn,
    SessionEnd,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::IntervalBuzzer,
        Tone::ShortBeep,
        Tone::PhaseHorn,
        Tone::SessionEnd,
    ];

    pub fn spec(self) -> ToneSpec {
        match self {
            Tone::IntervalBuzzer => ToneSpec {
                waveform: Waveform::Sawtooth,
                start_hz: 180.0,
                end_hz: 80.0,
                sweep_secs: 0.8,
                gain: 0.8,
                duration_secs: 1.0,
            },
            Tone::ShortBeep => ToneSpec {
                waveform: Waveform::Sine,
                start_hz: 880.0,
                end_hz: 880.0,
                sweep_secs: 0.2,
                gain: 0.6,
                duration_secs: 0.2,
            },
            Tone::PhaseHorn => ToneSpec {
                waveform: Waveform::Square,
                start_hz: 220.0,
                end_hz: 196.0,
                sweep_secs: 0.9,
                gain: 0.5,
                duration_secs: 1.2,
            },
            Tone::SessionEnd => ToneSpec {
                waveform: Waveform::Triangle,
                start_hz: 523.25,
                end_hz: 1046.5,
                sweep_secs: 1.0,
                gain: 0.7,
                duration_secs: 1.5,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::IntervalBuzzer => "interval_buzzer",
            Tone::ShortBeep => "short_beep",
            Tone::PhaseHorn => "phase_horn",
            Tone::SessionEnd => "session_end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// One period sampled at `phase` in `0.0..1.0`.
    fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// Gain the envelope decays to by `duration_secs`.
const GAIN_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Time to sweep from `start_hz` to `end_hz`; held afterwards.
    pub sweep_secs: f32,
    /// Peak gain at t = 0.
    pub gain: f32,
    pub duration_secs: f32,
}

impl ToneSpec {
    pub fn frequency_at(&self, t: f32) -> f32 {
        let p = (t / self.sweep_secs).clamp(0.0, 1.0);
        self.start_hz * (self.end_hz / self.start_hz).powf(p)
    }

    pub fn gain_at(&self, t: f32) -> f32 {
        let p = (t / self.duration_secs).clamp(0.0, 1.0);
        self.gain * (GAIN_FLOOR / self.gain).powf(p)
    }

    /// Mono samples in `-1.0..=1.0`, scaled by `volume`.
    pub fn render(&self, sample_rate: u32, volume: f32) -> Vec<f32> {
        let count = (self.duration_secs * sample_rate as f32).round() as usize;
        let dt = 1.0 / sample_rate as f32;
        let mut phase = 0.0f32;
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let t = i as f32 * dt;
            out.push(self.waveform.sample(phase) * self.gain_at(t) * volume);
            phase = (phase + self.frequency_at(t) * dt).fract();
        }
        out
    }
}

/// Wrap mono samples as a 16-bit PCM RIFF/WAVE file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}
