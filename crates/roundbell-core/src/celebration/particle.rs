//! Particle records and the per-pattern generators.
//!
//! Every pattern only decides the initial kinematics; integration is the same
//! for all of them (see [`Particle::step`]).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use super::palette::{Palette, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Rect,
    Circle,
    Star,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Rect, Shape::Circle, Shape::Star, Shape::Triangle];
}

/// Emission pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Radial burst from the centre.
    Burst,
    /// Falling from above the top edge.
    Rain,
    /// Thrown upwards from the bottom centre.
    Fountain,
    /// Radial from the upper third with an upward bias.
    Spiral,
    /// Streaming in from the left and right edges.
    Sides,
    /// Radial bursts around random points in the upper half.
    Firework,
}

impl Pattern {
    /// Cycle order used for interval celebrations.
    pub const ALL: [Pattern; 6] = [
        Pattern::Burst,
        Pattern::Rain,
        Pattern::Fountain,
        Pattern::Spiral,
        Pattern::Sides,
        Pattern::Firework,
    ];

    /// Draw order used when the finale shuffles patterns.
    pub const SHUFFLE: [Pattern; 6] = [
        Pattern::Rain,
        Pattern::Burst,
        Pattern::Fountain,
        Pattern::Firework,
        Pattern::Sides,
        Pattern::Spiral,
    ];

    pub fn for_round(round: u32) -> Self {
        Self::ALL[super::palette::round_index(round, Self::ALL.len())]
    }

    /// New particle for a `width` x `height` logical surface.
    pub fn spawn<R: Rng + ?Sized>(
        self,
        width: f64,
        height: f64,
        palette: &Palette,
        rng: &mut R,
    ) -> Particle {
        let color = palette.pick(rng);
        let shape = Shape::ALL[rng.gen_range(0..Shape::ALL.len())];
        let base = Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            size: 0.0,
            color,
            alpha: 1.0,
            rotation: rng.gen::<f64>() * 360.0,
            rotation_speed: 0.0,
            shape,
            gravity: 0.0,
            decay: 0.0,
        };

        match self {
            Pattern::Burst => {
                let (vx, vy) = polar(rng.gen::<f64>() * TAU, 3.0 + rng.gen::<f64>() * 8.0);
                Particle {
                    x: width / 2.0,
                    y: height / 2.0,
                    vx,
                    vy,
                    size: 4.0 + rng.gen::<f64>() * 8.0,
                    rotation_speed: jitter(rng, 10.0),
                    gravity: 0.08,
                    decay: 0.012 + rng.gen::<f64>() * 0.008,
                    ..base
                }
            }
            Pattern::Rain => Particle {
                x: rng.gen::<f64>() * width,
                y: -10.0 - rng.gen::<f64>() * 100.0,
                vx: jitter(rng, 2.0),
                vy: 2.0 + rng.gen::<f64>() * 4.0,
                size: 4.0 + rng.gen::<f64>() * 7.0,
                rotation_speed: jitter(rng, 12.0),
                gravity: 0.03,
                decay: 0.005 + rng.gen::<f64>() * 0.005,
                ..base
            },
            Pattern::Fountain => Particle {
                x: width / 2.0 + jitter(rng, 40.0),
                y: height,
                vx: jitter(rng, 6.0),
                vy: -(6.0 + rng.gen::<f64>() * 10.0),
                size: 4.0 + rng.gen::<f64>() * 8.0,
                rotation_speed: jitter(rng, 8.0),
                gravity: 0.15,
                decay: 0.008 + rng.gen::<f64>() * 0.006,
                ..base
            },
            Pattern::Spiral => {
                let (vx, vy) = polar(rng.gen::<f64>() * TAU, 2.0 + rng.gen::<f64>() * 5.0);
                Particle {
                    x: width / 2.0,
                    y: height / 3.0,
                    vx,
                    vy: vy - 2.0,
                    size: 3.0 + rng.gen::<f64>() * 7.0,
                    rotation_speed: jitter(rng, 15.0),
                    gravity: 0.06,
                    decay: 0.01 + rng.gen::<f64>() * 0.008,
                    ..base
                }
            }
            Pattern::Sides => {
                let from_left = rng.gen::<f64>() > 0.5;
                let speed = 3.0 + rng.gen::<f64>() * 5.0;
                Particle {
                    x: if from_left { -10.0 } else { width + 10.0 },
                    y: rng.gen::<f64>() * height * 0.6,
                    vx: if from_left { speed } else { -speed },
                    vy: -1.0 + rng.gen::<f64>() * 3.0,
                    size: 4.0 + rng.gen::<f64>() * 8.0,
                    rotation_speed: jitter(rng, 12.0),
                    gravity: 0.06,
                    decay: 0.008 + rng.gen::<f64>() * 0.006,
                    ..base
                }
            }
            Pattern::Firework => {
                let cx = width * (0.2 + rng.gen::<f64>() * 0.6);
                let cy = height * (0.1 + rng.gen::<f64>() * 0.4);
                let (vx, vy) = polar(rng.gen::<f64>() * TAU, 1.0 + rng.gen::<f64>() * 6.0);
                Particle {
                    x: cx,
                    y: cy,
                    vx,
                    vy,
                    size: 3.0 + rng.gen::<f64>() * 6.0,
                    rotation_speed: jitter(rng, 10.0),
                    gravity: 0.04,
                    decay: 0.015 + rng.gen::<f64>() * 0.01,
                    ..base
                }
            }
        }
    }
}

fn polar(angle: f64, speed: f64) -> (f64, f64) {
    (angle.cos() * speed, angle.sin() * speed)
}

/// Uniform in `-span/2 .. span/2`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, span: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * span
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub color: Rgb,
    pub alpha: f64,
    /// Degrees.
    pub rotation: f64,
    pub rotation_speed: f64,
    pub shape: Shape,
    pub gravity: f64,
    /// Alpha lost per frame before `decay_scale`.
    pub decay: f64,
}

impl Particle {
    /// One physics step. Returns `false` once the particle has faded out.
    pub fn step(&mut self, decay_scale: f64) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += self.gravity;
        self.rotation += self.rotation_speed;
        self.alpha -= self.decay * decay_scale;
        self.alpha > 0.0
    }

    pub fn rotation_radians(&self) -> f64 {
        self.rotation * PI / 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    const W: f64 = 800.0;
    const H: f64 = 600.0;

    fn sample(pattern: Pattern, n: usize) -> Vec<Particle> {
        let mut rng = Mcg128Xsl64::seed_from_u64(7);
        let palette = Palette::for_round(1);
        (0..n)
            .map(|_| pattern.spawn(W, H, &palette, &mut rng))
            .collect()
    }

    #[test]
    fn burst_starts_at_centre() {
        for p in sample(Pattern::Burst, 50) {
            assert_eq!((p.x, p.y), (W / 2.0, H / 2.0));
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((3.0..11.0).contains(&speed));
            assert!((0.012..0.02).contains(&p.decay));
            assert_eq!(p.alpha, 1.0);
        }
    }

    #[test]
    fn rain_starts_above_and_falls() {
        for p in sample(Pattern::Rain, 50) {
            assert!(p.y <= -10.0 && p.y > -110.0);
            assert!(p.vy >= 2.0);
            assert!((0.0..W).contains(&p.x));
        }
    }

    #[test]
    fn fountain_rises_from_bottom() {
        for p in sample(Pattern::Fountain, 50) {
            assert_eq!(p.y, H);
            assert!(p.vy <= -6.0);
            assert!((p.x - W / 2.0).abs() <= 20.0);
        }
    }

    #[test]
    fn sides_enter_from_edges_moving_inward() {
        for p in sample(Pattern::Sides, 50) {
            if p.x < 0.0 {
                assert!(p.vx > 0.0);
            } else {
                assert_eq!(p.x, W + 10.0);
                assert!(p.vx < 0.0);
            }
            assert!(p.y <= H * 0.6);
        }
    }

    #[test]
    fn firework_centres_in_upper_half() {
        for p in sample(Pattern::Firework, 50) {
            assert!(p.x >= W * 0.2 && p.x <= W * 0.8);
            assert!(p.y >= H * 0.1 && p.y <= H * 0.5);
        }
    }

    #[test]
    fn colors_come_from_palette() {
        let palette = Palette::for_round(1);
        for p in sample(Pattern::Spiral, 50) {
            assert!(palette.colors().contains(&p.color));
        }
    }

    #[test]
    fn step_integrates() {
        let mut p = sample(Pattern::Burst, 1).remove(0);
        let before = p.clone();
        assert!(p.step(1.0));
        assert_eq!(p.x, before.x + before.vx);
        assert_eq!(p.y, before.y + before.vy);
        assert_eq!(p.vy, before.vy + before.gravity);
        assert_eq!(p.alpha, 1.0 - before.decay);
    }

    #[test]
    fn step_reports_fade_out() {
        let mut p = sample(Pattern::Rain, 1).remove(0);
        p.alpha = 0.01;
        p.decay = 0.02;
        assert!(!p.step(1.0));
    }

    #[test]
    fn pattern_cycles_by_round() {
        assert_eq!(Pattern::for_round(1), Pattern::Burst);
        assert_eq!(Pattern::for_round(6), Pattern::Firework);
        assert_eq!(Pattern::for_round(7), Pattern::Burst);
    }
}
