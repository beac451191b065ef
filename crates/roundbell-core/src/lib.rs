//! # Roundbell Core Library
//!
//! This library provides the core logic for the Roundbell interval workout
//! timer. All operations are available through the standalone CLI binary,
//! which is a thin terminal shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine. The caller invokes
//!   `tick()` once per second of wall time; the engine never reads a clock.
//! - **Cues**: Speech and tone side effects derived from engine events,
//!   played through pluggable outputs that may fail without consequence.
//! - **Celebrations**: Frame-driven particle effects with a wall-clock
//!   safety timeout, drawn through the [`Surface`] trait.
//! - **Config**: TOML-based configuration with dot-path get/set.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Workout`]: Engine plus cues and celebrations
//! - [`Config`]: Application configuration management
//! - [`ParticleField`]: Particle simulation for celebrations

pub mod celebration;
pub mod config;
pub mod cue;
pub mod error;
pub mod events;
pub mod timer;
pub mod workout;

pub use celebration::{Celebration, CelebrationKind, EndReason, ParticleField, Surface, Viewport};
pub use config::Config;
pub use cue::{Cue, CueDispatcher, SpeechOutput, Tone, ToneOutput, VoiceSettings};
pub use error::{ConfigError, CoreError, CueError, ValidationError};
pub use events::Event;
pub use timer::{Phase, PhaseSpec, Preset, Readout, TimerEngine, TimerState};
pub use workout::Workout;
