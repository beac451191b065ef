//! Character-grid drawing surface.
//!
//! Every terminal cell stands for a `CELL_W` x `CELL_H` block of logical
//! pixels. Shapes are rasterized by their transformed bounding box, which is
//! as much precision as a character cell can show.

use std::f64::consts::TAU;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use roundbell_core::celebration::{Rgb, Surface};

pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

pub fn term_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Row-major 2x3 affine transform: `x' = a x + c y + e`, `y' = b x + d y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Affine,
    alpha: f64,
    fill: Rgb,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            fill: Rgb::new(255, 255, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    glyph: char,
    color: Rgb,
}

#[derive(Debug, Default)]
pub struct AsciiSurface {
    cols: usize,
    rows: usize,
    cells: Vec<Option<Cell>>,
    state: DrawState,
    stack: Vec<DrawState>,
    path: Vec<(f64, f64)>,
}

#[cfg(test)]
impl AsciiSurface {
    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    fn painted(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl AsciiSurface {
    /// Queue the grid to `out`, starting at the top-left of the screen.
    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        for row in 0..self.rows {
            queue!(out, MoveTo(0, row as u16))?;
            for col in 0..self.cols {
                match self.cells[row * self.cols + col] {
                    Some(Cell { glyph, color }) => {
                        queue!(out, SetForegroundColor(term_color(color)), Print(glyph))?
                    }
                    None => queue!(out, Print(' '))?,
                }
            }
        }
        queue!(out, ResetColor)
    }

    fn glyph(alpha: f64) -> char {
        match alpha {
            a if a > 0.75 => '█',
            a if a > 0.5 => '▓',
            a if a > 0.25 => '▒',
            _ => '░',
        }
    }

    /// Paint every cell touched by the bounding box of device-space `points`.
    fn paint(&mut self, points: &[(f64, f64)]) {
        if self.state.alpha <= 0.0 || points.is_empty() || self.cols == 0 || self.rows == 0 {
            return;
        }
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let to_col = |x: f64| (x / CELL_W).floor();
        let to_row = |y: f64| (y / CELL_H).floor();
        let (c0, c1) = (to_col(min_x), to_col(max_x));
        let (r0, r1) = (to_row(min_y), to_row(max_y));
        if c1 < 0.0 || r1 < 0.0 || c0 >= self.cols as f64 || r0 >= self.rows as f64 {
            return;
        }

        let cell = Cell {
            glyph: Self::glyph(self.state.alpha),
            color: self.state.fill,
        };
        let last_col = (self.cols - 1) as f64;
        let last_row = (self.rows - 1) as f64;
        for row in r0.max(0.0) as usize..=r1.min(last_row) as usize {
            for col in c0.max(0.0) as usize..=c1.min(last_col) as usize {
                self.cells[row * self.cols + col] = Some(cell);
            }
        }
    }
}

impl Surface for AsciiSurface {
    fn resize(&mut self, width_px: u32, height_px: u32) {
        self.cols = (width_px as f64 / CELL_W) as usize;
        self.rows = (height_px as f64 / CELL_H) as usize;
        self.cells = vec![None; self.cols * self.rows];
        self.state = DrawState::default();
        self.stack.clear();
        self.path.clear();
    }

    fn clear(&mut self) {
        self.cells.fill(None);
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        let t = &mut self.state.transform;
        t.e += t.a * x + t.c * y;
        t.f += t.b * x + t.d * y;
    }

    fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        let t = self.state.transform;
        let m = &mut self.state.transform;
        m.a = t.a * cos + t.c * sin;
        m.b = t.b * cos + t.d * sin;
        m.c = t.c * cos - t.a * sin;
        m.d = t.d * cos - t.b * sin;
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let t = &mut self.state.transform;
        t.a *= sx;
        t.b *= sx;
        t.c *= sy;
        t.d *= sy;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_fill(&mut self, color: Rgb) {
        self.state.fill = color;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let t = self.state.transform;
        let corners = [
            t.apply(x, y),
            t.apply(x + width, y),
            t.apply(x, y + height),
            t.apply(x + width, y + height),
        ];
        self.paint(&corners);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.state.transform.apply(x, y);
        self.path.push(p);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.move_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        const STEPS: usize = 8;
        let sweep = (end - start).clamp(-TAU, TAU);
        for i in 0..=STEPS {
            let angle = start + sweep * i as f64 / STEPS as f64;
            self.move_to(x + radius * angle.cos(), y + radius * angle.sin());
        }
    }

    fn close_path(&mut self) {}

    fn fill(&mut self) {
        let path = std::mem::take(&mut self.path);
        self.paint(&path);
        self.path = path;
    }
}
