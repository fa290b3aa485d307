//! Shared scripted adapters and the engine test harness

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Mutex;

use lumi_companion::animator::FeedbackAnimator;
use lumi_companion::config::{
    DEFAULT_PERSONA, DEFAULT_SLEEP_ACK, DEFAULT_WAKE_ACK, SessionConfig,
};
use lumi_companion::display::DisplayAdapter;
use lumi_companion::memory::{ConversationMessage, MemoryStore};
use lumi_companion::model::LanguageModel;
use lumi_companion::session::SessionEngine;
use lumi_companion::voice::{PhraseSet, SpeechInput, SpeechOutput};
use lumi_companion::{Error, Result};

/// Speech input driven by a fixed script
///
/// Both wake listening and transcription consume lines in order. An empty
/// entry simulates a window of silence; an exhausted script fails like a
/// closed input source, which ends the engine's run loop.
pub struct ScriptedInput {
    wake_phrases: PhraseSet,
    script: Mutex<VecDeque<String>>,
}

impl ScriptedInput {
    pub fn new(wake_phrases: &[String], script: &[&str]) -> Self {
        Self {
            wake_phrases: PhraseSet::new(wake_phrases),
            script: Mutex::new(script.iter().map(ToString::to_string).collect()),
        }
    }

    async fn next_line(&self) -> Option<String> {
        self.script.lock().await.pop_front()
    }
}

fn input_closed() -> Error {
    Error::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    async fn listen_for_wake(&self) -> Result<bool> {
        let line = self.next_line().await.ok_or_else(input_closed)?;
        Ok(self.wake_phrases.matches(&line))
    }

    async fn transcribe(&self, window: Option<Duration>) -> Result<String> {
        let line = self.next_line().await.ok_or_else(input_closed)?;

        // Silence lasts the whole window before the engine sees it
        if line.is_empty() {
            if let Some(window) = window {
                tokio::time::sleep(window).await;
            }
        }

        Ok(line)
    }
}

/// Records everything spoken through it
#[derive(Default)]
pub struct RecordingOutput {
    spoken: Mutex<Vec<String>>,
}

impl RecordingOutput {
    pub async fn spoken(&self) -> Vec<String> {
        self.spoken.lock().await.clone()
    }
}

#[async_trait]
impl SpeechOutput for RecordingOutput {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().await.push(text.to_string());
        Ok(())
    }
}

/// Records every frame shown
#[derive(Default)]
pub struct RecordingDisplay {
    frames: std::sync::Mutex<Vec<String>>,
}

impl DisplayAdapter for RecordingDisplay {
    fn show_frame(&self, frame: &str) {
        self.frames
            .lock()
            .expect("frame lock poisoned")
            .push(frame.to_string());
    }
}

/// Language model returning scripted replies, then a fixed default
pub struct StubModel {
    default_reply: String,
    script: Mutex<VecDeque<Result<String>>>,
}

impl StubModel {
    pub fn new(default_reply: &str) -> Self {
        Self {
            default_reply: default_reply.to_string(),
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_script(default_reply: &str, script: Vec<Result<String>>) -> Self {
        Self {
            default_reply: default_reply.to_string(),
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, _messages: &[ConversationMessage]) -> Result<String> {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_reply.clone()))
    }
}

/// Default session settings used by the scenario tests
pub fn session_config() -> SessionConfig {
    SessionConfig {
        wake_phrases: vec!["Hi, Lumi".to_string(), "小Lumi".to_string()],
        sleep_keywords: vec![
            "睡觉吧Lumi".to_string(),
            "睡吧Lumi".to_string(),
            "goodnight Lumi".to_string(),
            "晚安Lumi".to_string(),
        ],
        silence_timeout_secs: 8,
        persona: DEFAULT_PERSONA.to_string(),
        wake_ack: DEFAULT_WAKE_ACK.to_string(),
        sleep_ack: DEFAULT_SLEEP_ACK.to_string(),
        max_history_messages: 100,
    }
}

/// A fully wired engine over temp stores and scripted adapters
pub struct TestHarness {
    pub engine: SessionEngine,
    pub output: Arc<RecordingOutput>,
    /// Second handle onto the same store files, for post-run inspection
    pub store: MemoryStore,
    _dir: TempDir,
}

pub fn harness(script: &[&str], model: StubModel, silence: Duration) -> TestHarness {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let short = dir.path().join("memory.json");
    let long = dir.path().join("long_term.json");

    let config = session_config();
    let output = Arc::new(RecordingOutput::default());
    let input = Arc::new(ScriptedInput::new(&config.wake_phrases, script));
    let display = Arc::new(RecordingDisplay::default());
    let animator = FeedbackAnimator::new(display, Duration::from_millis(10));

    let engine = SessionEngine::new(
        &config,
        MemoryStore::new(short.clone(), long.clone()),
        Arc::new(model),
        input,
        output.clone(),
        animator,
    )
    .expect("failed to build engine")
    .with_silence_timeout(silence);

    TestHarness {
        engine,
        output,
        store: MemoryStore::new(short, long),
        _dir: dir,
    }
}
