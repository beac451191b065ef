//! Frame-driven particle field.
//!
//! A field is launched once, advanced once per display frame, and finishes
//! exactly once: on its frame cap, when it runs empty (if configured), on
//! its wall-clock safety deadline, or when dismissed. The completion callback
//! fires on that first finish and never again.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::palette::Palette;
use super::particle::{Particle, Pattern};
use super::surface::{draw_particle, Surface, Viewport};

/// Which pattern a batch of particles uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// The field's configured pattern.
    Primary,
    Fixed(Pattern),
    /// A random pick from [`Pattern::SHUFFLE`] per batch.
    Shuffle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub emission: Emission,
    pub count: usize,
}

/// Extra particles added while the field runs. Frame numbers are the count
/// of frames already advanced when the rule is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRule {
    /// `per_frame` each frame while `frame < before_frame` and the
    /// population is under `cap`.
    Stream {
        per_frame: usize,
        before_frame: u32,
        cap: usize,
        emission: Emission,
    },
    /// `count` on every frame divisible by `every` while
    /// `frame < before_frame`.
    Pulse {
        every: u32,
        before_frame: u32,
        count: usize,
        emission: Emission,
    },
}

#[derive(Debug, Clone)]
pub struct FieldConfig {
    pub pattern: Pattern,
    pub palette: Palette,
    pub initial: Vec<Batch>,
    pub spawn: Vec<SpawnRule>,
    pub max_frames: u32,
    /// Finish as soon as the last particle fades.
    pub end_when_empty: bool,
    /// Multiplier on every particle's decay.
    pub decay_scale: f64,
    /// Wall-clock backstop for completion.
    pub safety_timeout: Duration,
}

impl FieldConfig {
    pub fn new(pattern: Pattern, palette: Palette, count: usize, max_frames: u32) -> Self {
        Self {
            pattern,
            palette,
            initial: vec![Batch {
                emission: Emission::Primary,
                count,
            }],
            spawn: Vec::new(),
            max_frames,
            end_when_empty: true,
            decay_scale: 1.0,
            safety_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every particle faded out.
    Exhausted,
    FrameLimit,
    /// The safety deadline passed before the frames finished.
    TimedOut,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Finished(EndReason),
}

type Completion = Box<dyn FnOnce(EndReason)>;

pub struct ParticleField {
    config: FieldConfig,
    /// Logical surface size; `None` when no surface was available.
    bounds: Option<(f64, f64)>,
    particles: Vec<Particle>,
    frame: u32,
    rng: Mcg128Xsl64,
    deadline: Instant,
    outcome: Option<EndReason>,
    on_complete: Option<Completion>,
}

impl ParticleField {
    /// Build the initial population. `viewport == None` yields an inert
    /// field that draws nothing and ends on its safety deadline.
    pub fn launch(config: FieldConfig, viewport: Option<Viewport>, seed: u64, now: Instant) -> Self {
        let mut field = Self::empty(config, viewport, seed, now);
        if field.bounds.is_some() {
            let initial = field.config.initial.clone();
            for batch in initial {
                field.emit(batch.emission, batch.count);
            }
        }
        tracing::debug!(
            particles = field.particles.len(),
            inert = field.bounds.is_none(),
            "particle field launched"
        );
        field
    }

    /// Launch with a caller-supplied population instead of the generators.
    pub fn with_particles(
        config: FieldConfig,
        viewport: Option<Viewport>,
        particles: Vec<Particle>,
        seed: u64,
        now: Instant,
    ) -> Self {
        let mut field = Self::empty(config, viewport, seed, now);
        if field.bounds.is_some() {
            field.particles = particles.into_iter().filter(|p| p.alpha > 0.0).collect();
        }
        field
    }

    fn empty(config: FieldConfig, viewport: Option<Viewport>, seed: u64, now: Instant) -> Self {
        Self {
            deadline: now + config.safety_timeout,
            bounds: viewport.map(|v| (v.width, v.height)),
            particles: Vec::new(),
            frame: 0,
            rng: Mcg128Xsl64::seed_from_u64(seed),
            outcome: None,
            on_complete: None,
            config,
        }
    }

    /// Register the completion callback. Runs exactly once.
    pub fn on_complete(mut self, f: impl FnOnce(EndReason) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn population(&self) -> usize {
        self.particles.len()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn outcome(&self) -> Option<EndReason> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_inert(&self) -> bool {
        self.bounds.is_none()
    }

    /// One physics and render step.
    pub fn advance_frame(&mut self, surface: Option<&mut dyn Surface>) -> FrameStatus {
        if let Some(reason) = self.outcome {
            return FrameStatus::Finished(reason);
        }
        if self.bounds.is_none() {
            return FrameStatus::Running;
        }

        self.run_spawn_rules();

        let scale = self.config.decay_scale;
        self.particles.retain_mut(|p| p.step(scale));

        if let Some(surface) = surface {
            surface.clear();
            for p in &self.particles {
                draw_particle(surface, p);
            }
        }

        self.frame += 1;
        if self.frame >= self.config.max_frames {
            self.finish(EndReason::FrameLimit);
        } else if self.config.end_when_empty && self.particles.is_empty() {
            self.finish(EndReason::Exhausted);
        }
        self.status()
    }

    /// Fire the safety timeout if `now` is past the deadline.
    pub fn poll_deadline(&mut self, now: Instant) -> FrameStatus {
        if self.outcome.is_none() && now >= self.deadline {
            tracing::debug!(frame = self.frame, "particle field timed out");
            self.finish(EndReason::TimedOut);
        }
        self.status()
    }

    pub fn dismiss(&mut self) {
        self.finish(EndReason::Dismissed);
    }

    fn status(&self) -> FrameStatus {
        match self.outcome {
            Some(reason) => FrameStatus::Finished(reason),
            None => FrameStatus::Running,
        }
    }

    fn finish(&mut self, reason: EndReason) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(reason);
        self.particles.clear();
        if let Some(f) = self.on_complete.take() {
            f(reason);
        }
    }

    fn run_spawn_rules(&mut self) {
        let frame = self.frame;
        let rules = self.config.spawn.clone();
        for rule in rules {
            match rule {
                SpawnRule::Stream {
                    per_frame,
                    before_frame,
                    cap,
                    emission,
                } => {
                    if frame < before_frame && self.particles.len() < cap {
                        self.emit(emission, per_frame);
                    }
                }
                SpawnRule::Pulse {
                    every,
                    before_frame,
                    count,
                    emission,
                } => {
                    if every > 0 && frame % every == 0 && frame < before_frame {
                        self.emit(emission, count);
                    }
                }
            }
        }
    }

    fn emit(&mut self, emission: Emission, count: usize) {
        let Some((w, h)) = self.bounds else {
            return;
        };
        let pattern = match emission {
            Emission::Primary => self.config.pattern,
            Emission::Fixed(p) => p,
            Emission::Shuffle => {
                Pattern::SHUFFLE[self.rng.gen_range(0..Pattern::SHUFFLE.len())]
            }
        };
        self.particles.reserve(count);
        for _ in 0..count {
            let p = pattern.spawn(w, h, &self.config.palette, &mut self.rng);
            self.particles.push(p);
        }
    }
}

impl std::fmt::Debug for ParticleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleField")
            .field("frame", &self.frame)
            .field("population", &self.particles.len())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
