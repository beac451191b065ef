use std::io::Write;
use std::path::Path;

use clap::Args;
use roundbell_core::{Event, TimerEngine};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Preset to run instead of the configured one
    #[arg(long)]
    pub preset: Option<String>,
    /// Stop after this many ticks (default: until the session completes)
    #[arg(long)]
    pub ticks: Option<u32>,
    /// Include the cue owed by each event
    #[arg(long)]
    pub cues: bool,
}

/// Drive the engine headless at full speed, one JSON object per line.
pub fn run(args: SimulateArgs, explicit: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(explicit)?;
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    let mut engine = TimerEngine::new(config.resolve_preset()?);
    let limit = args.ticks.unwrap_or(u32::MAX);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut emit = |event: &Event| -> Result<(), Box<dyn std::error::Error>> {
        let line = if args.cues {
            serde_json::json!({ "event": event, "cue": event.cue() })
        } else {
            serde_json::to_value(event)?
        };
        writeln!(out, "{line}")?;
        Ok(())
    };

    if let Some(started) = engine.start() {
        emit(&started)?;
    }
    let mut ticks = 0;
    while ticks < limit && !engine.is_complete() {
        ticks += 1;
        if let Some(event) = engine.tick() {
            emit(&event)?;
        }
    }
    emit(&engine.snapshot())?;
    tracing::debug!(ticks, "simulation finished");
    Ok(())
}
