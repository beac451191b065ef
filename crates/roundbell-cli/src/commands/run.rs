use std::path::Path;
use std::time::Duration;

use clap::Args;
use roundbell_core::{CueDispatcher, Event, TimerState, Workout};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::outputs::{speech_output, tone_output, Caption};
use crate::screen::Screen;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Preset to run instead of the configured one
    #[arg(long)]
    pub preset: Option<String>,
    /// Start counting immediately instead of waiting for `s`
    #[arg(long)]
    pub start: bool,
    /// Workout seconds per wall-clock second
    #[arg(long, default_value_t = 1, hide = true)]
    pub speed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Start,
    Pause,
    Toggle,
    Stop,
    Quit,
}

fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(Control::Toggle),
        "s" | "start" => Some(Control::Start),
        "p" | "pause" => Some(Control::Pause),
        "x" | "stop" => Some(Control::Stop),
        "q" | "quit" => Some(Control::Quit),
        _ => None,
    }
}

pub fn run(args: RunArgs, explicit: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(explicit)?;
    if let Some(preset) = &args.preset {
        config.preset = preset.clone();
    }

    let caption = Caption::default();
    let cues = CueDispatcher::new(speech_output(&config, caption.clone()), tone_output(&config));
    let mut screen = Screen::detect(config.thresholds(), caption);
    let mut workout = Workout::from_config(&config, cues)?.with_viewport(screen.viewport());

    let tick_period = Duration::from_secs(1) / args.speed.clamp(1, 1000);
    let frame_period = Duration::from_secs(1) / config.celebration.frame_rate.clamp(1, 120);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    screen.enter()?;
    let result = runtime.block_on(session(
        &mut workout,
        &mut screen,
        tick_period,
        frame_period,
        args.start,
    ));
    // A pending stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    screen.leave()?;
    result
}

/// Apply one control to the workout. A start realigns the tick interval so
/// the first second is a full one.
fn control(workout: &mut Workout, ticker: &mut Interval, control: Control) -> Vec<Event> {
    let control = match control {
        Control::Toggle if workout.engine().state() == TimerState::Running => Control::Pause,
        Control::Toggle => Control::Start,
        other => other,
    };
    match control {
        Control::Start => {
            let started = workout.start();
            if started.is_some() {
                ticker.reset();
            }
            started.into_iter().collect()
        }
        Control::Pause => workout.pause().into_iter().collect(),
        Control::Stop => workout.stop(),
        Control::Toggle | Control::Quit => Vec::new(),
    }
}

async fn session(
    workout: &mut Workout,
    screen: &mut Screen,
    tick_period: Duration,
    frame_period: Duration,
    autostart: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = time::interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames = time::interval(frame_period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    if autostart {
        for event in control(workout, &mut ticker, Control::Start) {
            screen.show_event(&event)?;
        }
    }
    screen.draw(workout)?;

    loop {
        if workout.engine().is_complete() && !workout.is_celebrating() {
            return Ok(());
        }

        let running = workout.engine().state() == TimerState::Running;
        let celebrating = workout.is_celebrating();
        let deadline = workout.next_deadline();
        // Placeholder for the disabled branch; never awaited.
        let wake = deadline
            .map(Instant::from_std)
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        let events = tokio::select! {
            _ = ticker.tick(), if running => workout.on_tick(std::time::Instant::now()),
            _ = frames.tick(), if celebrating => {
                workout.on_frame(std::time::Instant::now(), screen.surface())
            }
            _ = time::sleep_until(wake), if deadline.is_some() => {
                workout.on_deadline(std::time::Instant::now())
            }
            line = input.next_line(), if input_open => match line? {
                Some(line) => match parse_control(&line) {
                    Some(Control::Quit) => {
                        workout.stop();
                        return Ok(());
                    }
                    Some(c) => control(workout, &mut ticker, c),
                    None => {
                        tracing::warn!(input = %line.trim(), "unknown command");
                        Vec::new()
                    }
                },
                None => {
                    input_open = false;
                    Vec::new()
                }
            },
            // Idle with stdin closed: nothing can happen any more.
            else => return Ok(()),
        };

        for event in &events {
            screen.show_event(event)?;
        }
        screen.refit(workout)?;
        screen.draw(workout)?;
    }
}
