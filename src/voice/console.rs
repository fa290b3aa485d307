//! Console-mode speech adapters
//!
//! Text stand-ins for the microphone and the speaker: utterances are read as
//! stdin lines and replies are printed. Useful on machines without audio
//! hardware and in development.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::voice::wake_word::PhraseSet;
use crate::voice::{SpeechInput, SpeechOutput};

/// Reads utterances as lines from stdin
pub struct ConsoleInput {
    wake_phrases: PhraseSet,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleInput {
    #[must_use]
    pub fn new(wake_phrases: PhraseSet) -> Self {
        Self {
            wake_phrases,
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Read the next line, returning an empty string when the window elapses
    ///
    /// Closed stdin is an error; the session cannot continue without input.
    async fn read_line(&self, window: Option<Duration>) -> Result<String> {
        let mut lines = self.lines.lock().await;

        let line = match window {
            Some(limit) => match tokio::time::timeout(limit, lines.next_line()).await {
                Ok(read) => read?,
                Err(_) => return Ok(String::new()),
            },
            None => lines.next_line().await?,
        };

        let line = line.ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof))?;

        Ok(line.trim().to_string())
    }
}

#[async_trait]
impl SpeechInput for ConsoleInput {
    async fn listen_for_wake(&self) -> Result<bool> {
        let line = self.read_line(None).await?;
        Ok(self.wake_phrases.matches(&line))
    }

    async fn transcribe(&self, window: Option<Duration>) -> Result<String> {
        self.read_line(window).await
    }
}

/// Prints replies to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

#[async_trait]
impl SpeechOutput for ConsoleOutput {
    async fn speak(&self, text: &str) -> Result<()> {
        println!("小Lumi: {text}");
        Ok(())
    }
}
