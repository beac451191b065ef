//! Drawing surface contract and the shape painters.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::palette::Rgb;
use super::particle::{Particle, Shape};

/// A 2D canvas-like target.
///
/// Coordinates are logical pixels after whatever transform is current;
/// `save`/`restore` push and pop transform, alpha and fill colour.
pub trait Surface {
    /// Resize the backing store in device pixels. Resets the transform.
    fn resize(&mut self, width_px: u32, height_px: u32);
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    /// Clockwise, in radians.
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    fn set_alpha(&mut self, alpha: f64);
    fn set_fill(&mut self, color: Rgb);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
}

/// Logical size of the drawing area plus the device pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = if ratio > 0.0 { ratio } else { 1.0 };
        self
    }

    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round() as u32,
            (self.height * self.pixel_ratio).round() as u32,
        )
    }

    /// Size `surface` for this viewport so drawing can use logical units.
    pub fn apply(&self, surface: &mut dyn Surface) {
        let (w, h) = self.backing_size();
        surface.resize(w, h);
        surface.scale(self.pixel_ratio, self.pixel_ratio);
    }
}

pub fn draw_particle(surface: &mut dyn Surface, p: &Particle) {
    surface.save();
    surface.translate(p.x, p.y);
    surface.rotate(p.rotation_radians());
    surface.set_alpha(p.alpha);
    surface.set_fill(p.color);

    let half = p.size / 2.0;
    match p.shape {
        Shape::Rect => surface.fill_rect(-half, -half, p.size, p.size * 0.6),
        Shape::Circle => {
            surface.begin_path();
            surface.arc(0.0, 0.0, half, 0.0, TAU);
            surface.fill();
        }
        Shape::Star => {
            const SPIKES: usize = 5;
            let inner = half / 2.0;
            surface.begin_path();
            for i in 0..SPIKES * 2 {
                let r = if i % 2 == 0 { half } else { inner };
                let angle = i as f64 * PI / SPIKES as f64 - FRAC_PI_2;
                let (x, y) = (angle.cos() * r, angle.sin() * r);
                if i == 0 {
                    surface.move_to(x, y);
                } else {
                    surface.line_to(x, y);
                }
            }
            surface.close_path();
            surface.fill();
        }
        Shape::Triangle => {
            surface.begin_path();
            surface.move_to(0.0, -half);
            surface.line_to(-half, half);
            surface.line_to(half, half);
            surface.close_path();
            surface.fill();
        }
    }

    surface.restore();
}
