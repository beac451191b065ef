//! Audio and speech cues.
//!
//! The engine only decides *which* cue is owed ([`Event::cue`]). Playing it is
//! the job of two collaborators behind traits, and [`CueDispatcher`] makes
//! sure a failing or missing backend never reaches the timekeeping code.
//!
//! [`Event::cue`]: crate::events::Event::cue

mod tone;

pub use tone::{encode_wav, Tone, ToneSpec, Waveform};

use serde::{Deserialize, Serialize};

use crate::error::CueError;

/// What to play for one event. Either half may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub tone: Option<Tone>,
    pub speech: Option<String>,
}

impl Cue {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn tone(tone: Tone) -> Self {
        Self {
            tone: Some(tone),
            speech: None,
        }
    }

    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            tone: None,
            speech: Some(text.into()),
        }
    }

    pub fn with_speech(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tone.is_none() && self.speech.is_none()
    }
}

/// Utterance settings handed to speech backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 0.95,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Speech collaborator.
///
/// `speak` is fire-and-forget and must cancel any utterance still in
/// progress before starting the new one.
pub trait SpeechOutput {
    fn speak(&mut self, text: &str, voice: &VoiceSettings) -> Result<(), CueError>;
    fn cancel(&mut self) -> Result<(), CueError>;
}

/// Tone collaborator.
///
/// Backends acquire their output device lazily. `unlock` is called from the
/// user-initiated start and only after it may `play` produce sound.
pub trait ToneOutput {
    fn unlock(&mut self) -> Result<(), CueError>;
    fn play(&mut self, tone: Tone) -> Result<(), CueError>;
}

/// Backend for machines without audio or speech.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SpeechOutput for Silent {
    fn speak(&mut self, _text: &str, _voice: &VoiceSettings) -> Result<(), CueError> {
        Err(CueError::Unavailable("speech"))
    }

    fn cancel(&mut self) -> Result<(), CueError> {
        Ok(())
    }
}

impl ToneOutput for Silent {
    fn unlock(&mut self) -> Result<(), CueError> {
        Err(CueError::Unavailable("audio"))
    }

    fn play(&mut self, _tone: Tone) -> Result<(), CueError> {
        Err(CueError::Unavailable("audio"))
    }
}

/// Owns the collaborators and absorbs their failures.
pub struct CueDispatcher {
    speech: Box<dyn SpeechOutput>,
    tones: Box<dyn ToneOutput>,
    voice: VoiceSettings,
    speech_enabled: bool,
    tones_enabled: bool,
}

impl CueDispatcher {
    pub fn new(speech: Box<dyn SpeechOutput>, tones: Box<dyn ToneOutput>) -> Self {
        Self {
            speech,
            tones,
            voice: VoiceSettings::default(),
            speech_enabled: true,
            tones_enabled: true,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(Silent), Box::new(Silent))
    }

    pub fn with_voice(mut self, voice: VoiceSettings) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_enabled(mut self, speech: bool, tones: bool) -> Self {
        self.speech_enabled = speech;
        self.tones_enabled = tones;
        self
    }

    /// Call from the user-initiated start.
    pub fn unlock(&mut self) {
        if !self.tones_enabled {
            return;
        }
        if let Err(e) = self.tones.unlock() {
            tracing::warn!(error = %e, "audio unlock failed");
        }
    }

    pub fn dispatch(&mut self, cue: &Cue) {
        if let (Some(tone), true) = (cue.tone, self.tones_enabled) {
            if let Err(e) = self.tones.play(tone) {
                tracing::warn!(tone = tone.as_str(), error = %e, "tone cue skipped");
            }
        }
        if let (Some(text), true) = (cue.speech.as_deref(), self.speech_enabled) {
            if let Err(e) = self.speech.speak(text, &self.voice) {
                tracing::warn!(text, error = %e, "speech cue skipped");
            }
        }
    }

    /// Silence any utterance in flight.
    pub fn cancel_speech(&mut self) {
        if let Err(e) = self.speech.cancel() {
            tracing::warn!(error = %e, "speech cancel failed");
        }
    }
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("voice", &self.voice)
            .field("speech_enabled", &self.speech_enabled)
            .field("tones_enabled", &self.tones_enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl SpeechOutput for Log {
        fn speak(&mut self, text: &str, _voice: &VoiceSettings) -> Result<(), CueError> {
            self.0.borrow_mut().push(format!("say:{text}"));
            Ok(())
        }
        fn cancel(&mut self) -> Result<(), CueError> {
            self.0.borrow_mut().push("cancel".into());
            Ok(())
        }
    }

    impl ToneOutput for Log {
        fn unlock(&mut self) -> Result<(), CueError> {
            self.0.borrow_mut().push("unlock".into());
            Ok(())
        }
        fn play(&mut self, tone: Tone) -> Result<(), CueError> {
            self.0.borrow_mut().push(format!("tone:{}", tone.as_str()));
            Ok(())
        }
    }

    struct Broken;

    impl ToneOutput for Broken {
        fn unlock(&mut self) -> Result<(), CueError> {
            Err(CueError::Backend("no device".into()))
        }
        fn play(&mut self, _tone: Tone) -> Result<(), CueError> {
            Err(CueError::Locked)
        }
    }

    #[test]
    fn dispatch_plays_tone_then_speech() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = CueDispatcher::new(Box::new(Log(log.clone())), Box::new(Log(log.clone())));
        d.dispatch(&Cue::tone(Tone::ShortBeep).with_speech("Break time"));
        assert_eq!(
            *log.borrow(),
            vec!["tone:short_beep".to_string(), "say:Break time".to_string()]
        );
    }

    #[test]
    fn failures_are_swallowed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = CueDispatcher::new(Box::new(Log(log.clone())), Box::new(Broken));
        d.unlock();
        d.dispatch(&Cue::tone(Tone::PhaseHorn).with_speech("Go"));
        assert_eq!(*log.borrow(), vec!["say:Go".to_string()]);
    }

    #[test]
    fn silent_dispatcher_never_panics() {
        let mut d = CueDispatcher::silent();
        d.unlock();
        d.dispatch(&Cue::tone(Tone::SessionEnd).with_speech("done"));
        d.cancel_speech();
    }

    #[test]
    fn disabled_channels_are_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = CueDispatcher::new(Box::new(Log(log.clone())), Box::new(Log(log.clone())))
            .with_enabled(false, true);
        d.unlock();
        d.dispatch(&Cue::tone(Tone::ShortBeep).with_speech("hidden"));
        assert_eq!(
            *log.borrow(),
            vec!["unlock".to_string(), "tone:short_beep".to_string()]
        );
    }
}
