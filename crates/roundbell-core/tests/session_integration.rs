//! Integration tests for full interval sessions driven tick by tick.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use proptest::prelude::*;
use roundbell_core::{
    CueDispatcher, CueError, Event, Phase, Preset, SpeechOutput, TimerEngine, TimerState, Tone,
    ToneOutput, VoiceSettings, Workout,
};

type Log = Rc<RefCell<Vec<String>>>;

struct RecordingSpeech(Log);

impl SpeechOutput for RecordingSpeech {
    fn speak(&mut self, text: &str, _voice: &VoiceSettings) -> Result<(), CueError> {
        self.0.borrow_mut().push(format!("say {text}"));
        Ok(())
    }
    fn cancel(&mut self) -> Result<(), CueError> {
        Ok(())
    }
}

struct RecordingTones(Log);

impl ToneOutput for RecordingTones {
    fn unlock(&mut self) -> Result<(), CueError> {
        Ok(())
    }
    fn play(&mut self, tone: Tone) -> Result<(), CueError> {
        self.0.borrow_mut().push(format!("tone {}", tone.as_str()));
        Ok(())
    }
}

struct Broken;

impl SpeechOutput for Broken {
    fn speak(&mut self, _text: &str, _voice: &VoiceSettings) -> Result<(), CueError> {
        Err(CueError::Backend("speech engine crashed".into()))
    }
    fn cancel(&mut self) -> Result<(), CueError> {
        Err(CueError::Backend("speech engine crashed".into()))
    }
}

impl ToneOutput for Broken {
    fn unlock(&mut self) -> Result<(), CueError> {
        Err(CueError::Locked)
    }
    fn play(&mut self, _tone: Tone) -> Result<(), CueError> {
        Err(CueError::Locked)
    }
}

fn recording_workout(preset: Preset) -> (Workout, Log) {
    let log: Log = Rc::default();
    let cues = CueDispatcher::new(
        Box::new(RecordingSpeech(log.clone())),
        Box::new(RecordingTones(log.clone())),
    );
    let workout = Workout::new(preset, cues).with_seed(1).with_celebrations(false);
    (workout, log)
}

fn tick_n(workout: &mut Workout, n: u32) -> Vec<Event> {
    let now = Instant::now();
    (0..n).flat_map(|_| workout.on_tick(now)).collect()
}

fn ticks(engine: &mut TimerEngine, n: u32) -> Vec<Event> {
    (0..n).filter_map(|_| engine.tick()).collect()
}

#[test]
fn single_phase_first_interval() {
    let (mut w, log) = recording_workout(Preset::single_phase());
    w.start();
    let events = tick_n(&mut w, 180);

    let announced: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            Event::Announcement { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(announced, vec![120, 60, 5, 4, 3, 2, 1]);

    assert!(matches!(
        events.last(),
        Some(Event::IntervalCompleted {
            round: 1,
            closing_phase: Phase::Work,
            ..
        })
    ));
    assert_eq!(w.engine().round(), 2);
    assert_eq!(w.engine().remaining_phase_secs(), 180);
    assert_eq!(w.engine().remaining_session_secs(), 2520);

    let log = log.borrow();
    assert_eq!(log.first().map(String::as_str), Some("say Two minutes to go."));
    assert!(log.contains(&"say One minute to go.".to_string()));
    assert_eq!(log.last().map(String::as_str), Some("tone interval_buzzer"));
}

#[test]
fn two_phase_cycle() {
    let (mut w, log) = recording_workout(Preset::two_phase());
    w.start();

    let work = tick_n(&mut w, 150);
    assert!(matches!(
        work.last(),
        Some(Event::RestStarted {
            round: 1,
            rest_secs: 30,
            ..
        })
    ));
    assert_eq!(w.engine().phase(), Phase::Rest);
    assert_eq!(w.engine().round(), 1);
    assert_eq!(w.engine().remaining_phase_secs(), 30);
    assert_eq!(
        work.iter().filter(|e| e.kind() == "announcement").count(),
        7
    );
    assert!(log.borrow().contains(&"say Break time, thirty seconds.".to_string()));
    assert!(log.borrow().contains(&"tone short_beep".to_string()));

    let rest = tick_n(&mut w, 30);
    assert_eq!(rest.iter().filter(|e| e.kind() == "announcement").count(), 5);
    assert!(matches!(
        rest.last(),
        Some(Event::IntervalCompleted {
            round: 1,
            closing_phase: Phase::Rest,
            ..
        })
    ));
    assert_eq!(w.engine().phase(), Phase::Work);
    assert_eq!(w.engine().round(), 2);
    assert_eq!(w.engine().remaining_phase_secs(), 150);
    assert_eq!(log.borrow().last().map(String::as_str), Some("tone phase_horn"));
}

#[test]
fn session_end_takes_precedence_over_phase_end() {
    let mut engine = TimerEngine::new(Preset::single_phase()).with_position(Phase::Work, 1, 1, 3);
    engine.start();
    let events = ticks(&mut engine, 1);
    assert!(matches!(events.as_slice(), [Event::SessionCompleted { round: 3, .. }]));
    assert_eq!(engine.round(), 3);
    assert!(engine.is_complete());
}

#[test]
fn session_ends_exactly_at_configured_length() {
    let (mut w, log) = recording_workout(Preset::single_phase());
    w.start();
    let events = tick_n(&mut w, 2699);
    assert!(!w.engine().is_complete());
    assert_eq!(
        events.iter().filter(|e| e.kind() == "interval_completed").count(),
        14
    );

    let last = tick_n(&mut w, 1);
    assert!(matches!(last.as_slice(), [Event::SessionCompleted { round: 15, .. }]));
    assert_eq!(w.engine().state(), TimerState::Idle);
    assert_eq!(w.engine().remaining_session_secs(), 0);
    assert!(log.borrow().ends_with(&[
        "tone session_end".to_string(),
        "say Workout complete. Great work.".to_string(),
    ]));

    assert!(tick_n(&mut w, 10).is_empty());
    assert!(w.start().is_none());
}

#[test]
fn stop_after_completion_allows_restart() {
    let mut engine = TimerEngine::new(Preset::single_phase()).with_position(Phase::Work, 1, 1, 3);
    engine.start();
    engine.tick();
    assert!(engine.start().is_none());
    engine.stop();
    assert!(engine.start().is_some());
    assert_eq!(engine.remaining_session_secs(), 2700);
    assert_eq!(engine.round(), 1);
}

#[test]
fn pause_and_resume_keeps_position() {
    let mut engine = TimerEngine::new(Preset::two_phase());
    engine.start();
    ticks(&mut engine, 40);
    engine.pause();
    assert!(ticks(&mut engine, 100).is_empty());
    assert_eq!(engine.remaining_phase_secs(), 110);
    assert!(matches!(
        engine.start(),
        Some(Event::TimerStarted { resumed: true, .. })
    ));
    ticks(&mut engine, 10);
    assert_eq!(engine.remaining_session_secs(), 2650);
}

#[test]
fn stop_while_paused_resets_counters() {
    let mut engine = TimerEngine::new(Preset::two_phase());
    engine.start();
    ticks(&mut engine, 170);
    engine.pause();
    assert_eq!(engine.state(), TimerState::Paused);
    assert_eq!(engine.phase(), Phase::Rest);

    engine.stop();
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.phase(), Phase::Work);
    assert_eq!(engine.round(), 1);
    assert_eq!(engine.remaining_phase_secs(), 150);
    assert_eq!(engine.remaining_session_secs(), 2700);
    assert!(matches!(
        engine.start(),
        Some(Event::TimerStarted { resumed: false, .. })
    ));
}

#[test]
fn failing_cues_never_stall_the_timer() {
    let cues = CueDispatcher::new(Box::new(Broken), Box::new(Broken));
    let mut w = Workout::new(Preset::two_phase(), cues).with_celebrations(false);
    w.start();
    let events = tick_n(&mut w, 180);
    assert_eq!(w.engine().round(), 2);
    assert!(events.iter().any(|e| e.kind() == "rest_started"));
    assert!(events.iter().any(|e| e.kind() == "interval_completed"));
    w.stop();
    assert_eq!(w.engine().state(), TimerState::Idle);
}

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Stop,
    Tick(u16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Pause),
        Just(Op::Stop),
        (1u16..400).prop_map(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn counters_stay_in_bounds(two_phase in any::<bool>(), ops in prop::collection::vec(op(), 1..40)) {
        let preset = if two_phase { Preset::two_phase() } else { Preset::single_phase() };
        let mut engine = TimerEngine::new(preset);
        let mut last_session = engine.remaining_session_secs();
        let mut last_round = engine.round();

        for op in ops {
            match op {
                Op::Start => { engine.start(); }
                Op::Pause => { engine.pause(); }
                Op::Stop => {
                    let stopped = engine.stop();
                    let is_stopped = matches!(stopped, Event::TimerStopped { .. });
                    prop_assert!(is_stopped);
                    prop_assert_eq!(engine.state(), TimerState::Idle);
                    prop_assert_eq!(engine.phase(), Phase::Work);
                    prop_assert_eq!(engine.round(), 1);
                    prop_assert!(!engine.is_complete());
                    prop_assert_eq!(engine.remaining_session_secs(), engine.preset().session_secs);
                    prop_assert_eq!(engine.remaining_phase_secs(), engine.phase_duration());
                    last_session = engine.remaining_session_secs();
                    last_round = 1;
                    continue;
                }
                Op::Tick(n) => {
                    for _ in 0..n {
                        let event = engine.tick();
                        let round = engine.round();
                        prop_assert!(round == last_round || round == last_round + 1);
                        if round == last_round + 1 {
                            let cycle_closed = matches!(event, Some(Event::IntervalCompleted { .. }));
                            prop_assert!(cycle_closed);
                        }
                        last_round = round;
                    }
                }
            }
            let session = engine.remaining_session_secs();
            prop_assert!(session <= last_session);
            prop_assert!(engine.remaining_phase_secs() <= engine.phase_duration());
            if engine.is_complete() {
                prop_assert_eq!(session, 0);
                prop_assert_eq!(engine.state(), TimerState::Idle);
            }
            last_session = session;
        }
    }
}
