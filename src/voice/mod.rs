//! Speech input/output adapters
//!
//! Wake listening, microphone transcription and spoken replies, with
//! console fallbacks for keyboard-driven sessions.

mod capture;
mod console;
mod playback;
mod stt;
mod tts;
mod wake_word;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::config::Config;

pub use capture::{SAMPLE_RATE, record_window, rms_level, samples_to_wav};
pub use console::{ConsoleInput, ConsoleOutput};
pub use playback::play_mp3;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
pub use wake_word::PhraseSet;

/// Source of user utterances
///
/// `transcribe` returns an empty string when nothing was heard within the
/// window, so callers can treat silence as a first-class value.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Listen for one window and report whether a wake phrase was heard
    async fn listen_for_wake(&self) -> Result<bool>;

    /// Capture one utterance, waiting at most `window` when given
    async fn transcribe(&self, window: Option<Duration>) -> Result<String>;
}

/// Sink for spoken replies
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Microphone capture plus Whisper transcription
pub struct VoiceInput {
    stt: SpeechToText,
    wake_phrases: PhraseSet,
    listen_window: Duration,
}

impl VoiceInput {
    #[must_use]
    pub const fn new(stt: SpeechToText, wake_phrases: PhraseSet, listen_window: Duration) -> Self {
        Self {
            stt,
            wake_phrases,
            listen_window,
        }
    }

    /// Record one window and transcribe it, yielding "" for silence
    async fn capture_text(&self, window: Duration) -> Result<String> {
        let samples = record_window(window).await?;
        if samples.is_empty() {
            return Ok(String::new());
        }

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        self.stt.transcribe(wav).await
    }
}

#[async_trait]
impl SpeechInput for VoiceInput {
    async fn listen_for_wake(&self) -> Result<bool> {
        match self.capture_text(self.listen_window).await {
            Ok(heard) => {
                if !heard.is_empty() {
                    tracing::debug!(heard = %heard, "wake window transcribed");
                }
                Ok(self.wake_phrases.matches(&heard))
            }
            Err(e) => {
                // A missing device would otherwise spin this loop hot
                tracing::warn!(error = %e, "wake listening failed");
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(false)
            }
        }
    }

    async fn transcribe(&self, window: Option<Duration>) -> Result<String> {
        let window = window.map_or(self.listen_window, |w| w.min(self.listen_window));

        match self.capture_text(window).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed, treating as silence");
                Ok(String::new())
            }
        }
    }
}

/// Speech synthesis plus speaker playback
pub struct VoiceOutput {
    tts: TextToSpeech,
}

impl VoiceOutput {
    #[must_use]
    pub const fn new(tts: TextToSpeech) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl SpeechOutput for VoiceOutput {
    async fn speak(&self, text: &str) -> Result<()> {
        let audio = self.tts.synthesize(text).await?;
        play_mp3(audio).await
    }
}

/// Build the speech input adapter for the configured runtime mode
///
/// # Errors
///
/// Returns an error if voice mode is configured without an API key
pub fn build_input(config: &Config) -> Result<Arc<dyn SpeechInput>> {
    let wake_phrases = PhraseSet::new(&config.session.wake_phrases);

    if !config.voice.enabled {
        return Ok(Arc::new(ConsoleInput::new(wake_phrases)));
    }

    let stt = SpeechToText::new(
        config.llm.base_url.clone(),
        config.api_keys.require_openai()?.to_string(),
        config.voice.stt_model.clone(),
        config.voice.stt_language.clone(),
    )?;

    Ok(Arc::new(VoiceInput::new(
        stt,
        wake_phrases,
        config.voice.listen_window(),
    )))
}

/// Build the speech output adapter for the configured runtime mode
///
/// # Errors
///
/// Returns an error if voice mode is configured without an API key
pub fn build_output(config: &Config) -> Result<Arc<dyn SpeechOutput>> {
    if !config.voice.enabled {
        return Ok(Arc::new(ConsoleOutput));
    }

    let tts = TextToSpeech::new(
        config.llm.base_url.clone(),
        config.api_keys.require_openai()?.to_string(),
        config.voice.tts_voice.clone(),
        config.voice.tts_model.clone(),
    )?;

    Ok(Arc::new(VoiceOutput::new(tts)))
}
