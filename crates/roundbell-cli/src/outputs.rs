//! Speech and tone backends for the terminal.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use roundbell_core::config::{Config, SAMPLE_RATES};
use roundbell_core::cue::{encode_wav, SpeechOutput, Tone, ToneOutput, VoiceSettings};
use roundbell_core::CueError;

/// Latest spoken phrase, shown by the screen when no speech program is set.
pub type Caption = Rc<RefCell<Option<String>>>;

pub fn speech_output(config: &Config, caption: Caption) -> Box<dyn SpeechOutput> {
    if config.speech.command.is_empty() {
        Box::new(CaptionSpeech { caption })
    } else {
        Box::new(CommandSpeech::new(config.speech.command.clone()))
    }
}

pub fn tone_output(config: &Config) -> Box<dyn ToneOutput> {
    Box::new(PlayerTones::new(
        config.audio.player.clone(),
        config.audio.sample_rate,
        config.audio.volume as f32 / 100.0,
    ))
}

/// Writes the phrase to the caption line.
#[derive(Debug)]
pub struct CaptionSpeech {
    caption: Caption,
}

impl SpeechOutput for CaptionSpeech {
    fn speak(&mut self, text: &str, _voice: &VoiceSettings) -> Result<(), CueError> {
        *self.caption.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), CueError> {
        self.caption.borrow_mut().take();
        Ok(())
    }
}

/// Runs `program args... <phrase>` per utterance. A new utterance kills the
/// one still speaking.
#[derive(Debug)]
pub struct CommandSpeech {
    command: Vec<String>,
    current: Option<Child>,
}

impl CommandSpeech {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            current: None,
        }
    }
}

impl SpeechOutput for CommandSpeech {
    fn speak(&mut self, text: &str, voice: &VoiceSettings) -> Result<(), CueError> {
        self.cancel()?;
        let (program, args) = self
            .command
            .split_first()
            .ok_or(CueError::Unavailable("speech"))?;
        let child = Command::new(program)
            .args(args)
            .arg(text)
            .env("ROUNDBELL_VOICE_RATE", voice.rate.to_string())
            .env("ROUNDBELL_VOICE_PITCH", voice.pitch.to_string())
            .env("ROUNDBELL_VOICE_VOLUME", voice.volume.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.current = Some(child);
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), CueError> {
        if let Some(mut child) = self.current.take() {
            if child.try_wait()?.is_none() {
                child.kill()?;
                child.wait()?;
            }
        }
        Ok(())
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}

/// Pipes synthesized WAV data into a player, or rings the terminal bell on
/// stderr when no player is configured. Silent until unlocked.
///
/// The WAV is fed from a writer thread so a player that stalls on its
/// input never holds up the caller.
#[derive(Debug)]
pub struct PlayerTones {
    player: Vec<String>,
    sample_rate: u32,
    volume: f32,
    unlocked: bool,
    rendered: HashMap<Tone, Arc<[u8]>>,
    playing: Vec<Child>,
}

impl PlayerTones {
    pub fn new(player: Vec<String>, sample_rate: u32, volume: f32) -> Self {
        Self {
            player,
            sample_rate: sample_rate.clamp(*SAMPLE_RATES.start(), *SAMPLE_RATES.end()),
            volume: volume.clamp(0.0, 1.0),
            unlocked: false,
            rendered: HashMap::new(),
            playing: Vec::new(),
        }
    }

    fn wav(&mut self, tone: Tone) -> Arc<[u8]> {
        let (rate, volume) = (self.sample_rate, self.volume);
        self.rendered
            .entry(tone)
            .or_insert_with(|| encode_wav(&tone.spec().render(rate, volume), rate).into())
            .clone()
    }

    fn reap(&mut self) {
        self.playing
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl ToneOutput for PlayerTones {
    fn unlock(&mut self) -> Result<(), CueError> {
        self.unlocked = true;
        Ok(())
    }

    fn play(&mut self, tone: Tone) -> Result<(), CueError> {
        if !self.unlocked {
            return Err(CueError::Locked);
        }
        self.reap();

        let Some((program, args)) = self.player.split_first() else {
            let mut out = std::io::stderr();
            out.write_all(b"\x07")?;
            out.flush()?;
            return Ok(());
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CueError::Backend("player has no stdin".into()))?;
        self.playing.push(child);
        let wav = self.wav(tone);
        thread::Builder::new()
            .name("roundbell-tone".into())
            .spawn(move || {
                if let Err(e) = stdin.write_all(&wav) {
                    tracing::debug!(?tone, error = %e, "tone player stopped reading");
                }
            })?;
        Ok(())
    }
}
