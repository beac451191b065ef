//! Terminal presentation for `roundbell run`.
//!
//! On a terminal the screen takes over the alternate buffer: particles on the
//! grid, a status line and a caption line below it. When stdout is piped it
//! prints one plain line per event instead.

use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use roundbell_core::celebration::Surface;
use roundbell_core::timer::{format_clock, Readout, Urgency, UrgencyThresholds};
use roundbell_core::{Celebration, Event, Viewport, Workout};

use crate::outputs::Caption;
use crate::surface::{term_color, AsciiSurface, CELL_H, CELL_W};

/// Lines under the particle grid: status, caption and key help.
const FOOTER_ROWS: u16 = 3;

pub struct Screen {
    out: Stdout,
    tty: bool,
    cols: u16,
    rows: u16,
    grid: AsciiSurface,
    viewport: Option<Viewport>,
    thresholds: UrgencyThresholds,
    caption: Caption,
    headline: Option<String>,
}

impl Screen {
    pub fn detect(thresholds: UrgencyThresholds, caption: Caption) -> Self {
        let out = io::stdout();
        let tty = out.is_terminal();
        let mut screen = Self {
            out,
            tty,
            cols: 0,
            rows: 0,
            grid: AsciiSurface::default(),
            viewport: None,
            thresholds,
            caption,
            headline: None,
        };
        if tty {
            screen.resize(terminal::size().unwrap_or((80, 24)));
        }
        screen
    }

    /// Rebuild the grid for a `cols` x `rows` terminal.
    fn resize(&mut self, (cols, rows): (u16, u16)) {
        self.cols = cols;
        self.rows = rows;
        self.viewport = fit(cols, rows);
        self.grid = AsciiSurface::default();
        if let Some(viewport) = &self.viewport {
            viewport.apply(&mut self.grid);
        }
    }

    /// Follow a terminal resize. Running particles keep their old bounds;
    /// the next celebration uses the new size.
    pub fn refit(&mut self, workout: &mut Workout) -> io::Result<()> {
        if !self.tty {
            return Ok(());
        }
        let size = terminal::size()?;
        if size != (self.cols, self.rows) {
            self.resize(size);
            workout.set_viewport(self.viewport);
            queue!(self.out, Clear(ClearType::All))?;
        }
        Ok(())
    }

    /// `None` when particles have nowhere to go.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn surface(&mut self) -> Option<&mut dyn Surface> {
        if self.viewport.is_some() {
            Some(&mut self.grid as &mut dyn Surface)
        } else {
            None
        }
    }

    pub fn enter(&mut self) -> io::Result<()> {
        if self.tty {
            execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn leave(&mut self) -> io::Result<()> {
        if self.tty {
            execute!(self.out, ResetColor, Show, LeaveAlternateScreen)?;
        }
        Ok(())
    }

    /// React to one event from the workout.
    pub fn show_event(&mut self, event: &Event) -> io::Result<()> {
        match event {
            Event::CelebrationStarted { message, .. } => self.headline = Some(message.clone()),
            Event::CelebrationEnded { .. } => {
                self.headline = None;
                self.grid.clear();
            }
            _ => {}
        }
        if self.tty {
            return Ok(());
        }
        if let Some(line) = describe(event) {
            writeln!(self.out, "{line}")?;
        }
        if let Some(text) = self.caption.borrow_mut().take() {
            writeln!(self.out, "  \"{text}\"")?;
        }
        self.out.flush()
    }

    /// Repaint the full screen. No-op when piped.
    pub fn draw(&mut self, workout: &Workout) -> io::Result<()> {
        if !self.tty {
            return Ok(());
        }
        let readout = workout.readout(&self.thresholds);
        self.grid.present(&mut self.out)?;

        let status_row = self.rows.saturating_sub(FOOTER_ROWS);
        queue!(
            self.out,
            MoveTo(0, status_row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(urgency_color(readout.urgency)),
            Print(status_line(&readout)),
            ResetColor
        )?;

        let caption = self.caption.borrow().clone();
        let second = match (&self.headline, caption) {
            (Some(headline), _) => format!("*** {headline} ***"),
            (None, Some(text)) => text,
            (None, None) => String::new(),
        };
        let accent = match self.headline {
            Some(_) => headline_color(workout.celebration()),
            None => Color::Reset,
        };
        queue!(
            self.out,
            MoveTo(0, status_row + 1),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(accent),
            Print(second),
            ResetColor,
            MoveTo(0, status_row + 2),
            Clear(ClearType::CurrentLine),
            Print("[s]tart  [p]ause  [x] stop  [q]uit, then Enter")
        )?;
        self.out.flush()
    }
}

/// Particle area for a terminal of `cols` x `rows`, above the footer.
fn fit(cols: u16, rows: u16) -> Option<Viewport> {
    (cols > 0 && rows > FOOTER_ROWS).then(|| {
        Viewport::new(
            f64::from(cols) * CELL_W,
            f64::from(rows - FOOTER_ROWS) * CELL_H,
        )
    })
}

/// The running celebration's accent, in its round colour.
fn headline_color(celebration: Option<&Celebration>) -> Color {
    celebration.map_or(Color::Reset, |c| term_color(c.accent()))
}

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Calm => Color::Green,
        Urgency::Warning => Color::Yellow,
        Urgency::Critical => Color::Red,
    }
}

pub fn status_line(readout: &Readout) -> String {
    format!(
        "{:<8} {} {}  round {}  session {} ({:.0}%)",
        readout.status_label(),
        readout.phase.as_str().to_uppercase(),
        readout.phase_clock,
        readout.round,
        readout.session_clock,
        readout.session_progress_pct,
    )
}

/// One plain-text line per event, for piped output.
pub fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TimerStarted {
            resumed,
            phase,
            remaining_phase_secs,
            ..
        } => format!(
            "{} {} {}",
            if *resumed { "resumed" } else { "started" },
            phase.as_str(),
            format_clock(*remaining_phase_secs)
        ),
        Event::TimerPaused {
            remaining_phase_secs,
            ..
        } => format!("paused at {}", format_clock(*remaining_phase_secs)),
        Event::TimerStopped { .. } => "stopped".to_string(),
        Event::Announcement {
            phase,
            remaining_secs,
            ..
        } => format!("{} {}", phase.as_str(), format_clock(*remaining_secs)),
        Event::RestStarted {
            round, rest_secs, ..
        } => format!("round {round}: rest {}", format_clock(*rest_secs)),
        Event::IntervalCompleted { round, .. } => format!("round {round} complete"),
        Event::SessionCompleted { round, .. } => format!("session complete in round {round}"),
        Event::CelebrationStarted { message, .. } => format!("*** {message} ***"),
        Event::CelebrationEnded { .. } | Event::StateSnapshot { .. } => return None,
    };
    Some(line)
}
