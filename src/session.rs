//! Session lifecycle engine
//!
//! Drives the Dormant/Awake state machine: wake-phrase detection, the
//! conversation turn, sleep keywords and the silence timeout. The engine
//! runs as one logical task; the only concurrent piece is the feedback
//! animator's display loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::Result;
use crate::animator::FeedbackAnimator;
use crate::config::SessionConfig;
use crate::emotion::{self, EmotionLabel};
use crate::memory::{
    ConversationMessage, ConversationRecord, LongTermMemory, MemoryStore, apply_history_bound,
};
use crate::model::LanguageModel;
use crate::preferences::{PreferenceExtractor, RegexExtractor};
use crate::prompt::build_system_prompt;
use crate::voice::{PhraseSet, SpeechInput, SpeechOutput};

/// Lifecycle state of the companion
///
/// The sleeping transition is an edge, not a resting state, so two states
/// suffice. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Listening only for a wake phrase
    Dormant,
    /// Actively exchanging conversation turns
    Awake,
}

/// The wake/sleep state machine plus the conversation turn
pub struct SessionEngine {
    state: SessionState,
    sleep_keywords: PhraseSet,
    store: MemoryStore,
    messages: Vec<ConversationMessage>,
    long_term: LongTermMemory,
    extractor: Box<dyn PreferenceExtractor>,
    model: Arc<dyn LanguageModel>,
    input: Arc<dyn SpeechInput>,
    output: Arc<dyn SpeechOutput>,
    animator: FeedbackAnimator,
    persona: String,
    wake_ack: String,
    sleep_ack: String,
    silence_timeout: Duration,
    max_history: usize,
    last_activity: Instant,
    session_id: Uuid,
}

impl SessionEngine {
    /// Build the engine and load both memory stores
    ///
    /// # Errors
    ///
    /// Returns an error if either persisted store exists but cannot be
    /// read or parsed.
    pub fn new(
        config: &SessionConfig,
        store: MemoryStore,
        model: Arc<dyn LanguageModel>,
        input: Arc<dyn SpeechInput>,
        output: Arc<dyn SpeechOutput>,
        animator: FeedbackAnimator,
    ) -> Result<Self> {
        let messages = store.load_short_term(&config.persona)?;
        let long_term = store.load_long_term()?;

        Ok(Self {
            state: SessionState::Dormant,
            sleep_keywords: PhraseSet::new(&config.sleep_keywords),
            store,
            messages,
            long_term,
            extractor: Box::new(RegexExtractor),
            model,
            input,
            output,
            animator,
            persona: config.persona.clone(),
            wake_ack: config.wake_ack.clone(),
            sleep_ack: config.sleep_ack.clone(),
            silence_timeout: config.silence_timeout(),
            max_history: config.max_history_messages,
            last_activity: Instant::now(),
            session_id: Uuid::new_v4(),
        })
    }

    /// Replace the preference extractor
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn PreferenceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Override the silence timeout with sub-second precision
    #[must_use]
    pub const fn with_silence_timeout(mut self, timeout: Duration) -> Self {
        self.silence_timeout = timeout;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The in-memory short-term conversation sequence
    #[must_use]
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// The in-memory long-term memory document
    #[must_use]
    pub const fn long_term(&self) -> &LongTermMemory {
        &self.long_term
    }

    /// Run the wake/sleep loop until shutdown is requested
    ///
    /// # Errors
    ///
    /// Returns an error when the speech input source fails permanently
    /// (e.g. console stdin closed).
    pub async fn run(&mut self, shutdown: &mut mpsc::Receiver<()>) -> Result<()> {
        let result = self.run_inner(shutdown).await;
        self.animator.stop().await;
        result
    }

    async fn run_inner(&mut self, shutdown: &mut mpsc::Receiver<()>) -> Result<()> {
        tracing::info!("companion ready, listening for wake phrase");
        self.animator.display(EmotionLabel::Neutral);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("shutdown requested");
                    return Ok(());
                }
                woke = self.input.listen_for_wake() => {
                    if woke? {
                        self.wake_up().await;
                        if self.converse(shutdown).await? {
                            tracing::info!("shutdown requested");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Enter Awake: greet, animate happy, start the inactivity clock
    async fn wake_up(&mut self) {
        self.state = SessionState::Awake;
        self.session_id = Uuid::new_v4();
        tracing::info!(session_id = %self.session_id, "wake phrase detected, session awake");

        self.speak(&self.wake_ack).await;
        self.animator.start_loop(EmotionLabel::Happy).await;

        // The clock starts after the greeting so speaking time does not
        // eat into the silence window
        self.last_activity = Instant::now();
    }

    /// Exchange turns until a sleep keyword or the silence timeout
    ///
    /// Returns `true` when shutdown was requested mid-conversation.
    async fn converse(&mut self, shutdown: &mut mpsc::Receiver<()>) -> Result<bool> {
        while self.state == SessionState::Awake {
            let remaining = self.silence_timeout.saturating_sub(self.last_activity.elapsed());
            if remaining.is_zero() {
                self.fall_asleep("silence timeout").await;
                break;
            }

            let utterance = tokio::select! {
                _ = shutdown.recv() => return Ok(true),
                heard = self.input.transcribe(Some(remaining)) => heard?,
            };

            if utterance.is_empty() {
                continue;
            }

            self.last_activity = Instant::now();

            if self.sleep_keywords.matches(&utterance) {
                self.fall_asleep("sleep keyword").await;
                break;
            }

            self.take_turn(&utterance).await;
        }

        Ok(false)
    }

    /// Return to Dormant: farewell and the sleep animation
    async fn fall_asleep(&mut self, reason: &str) {
        tracing::info!(session_id = %self.session_id, reason, "session going dormant");
        self.state = SessionState::Dormant;

        self.speak(&self.sleep_ack).await;
        self.animator.start_loop(EmotionLabel::Sleep).await;
    }

    /// One conversation turn for a non-empty, non-keyword utterance
    async fn take_turn(&mut self, utterance: &str) {
        // The system message reflects the preferences learned so far
        let system = build_system_prompt(&self.persona, &self.long_term.preferences);
        if let Some(head) = self.messages.first_mut() {
            head.content = system;
        }

        self.messages.push(ConversationMessage::user(utterance));

        let reply = match self.model.complete(&self.messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "model call failed");
                format!("抱歉，我遇到了一点小问题: {e}")
            }
        };

        self.messages.push(ConversationMessage::assistant(reply.as_str()));
        apply_history_bound(&mut self.messages, self.max_history);
        if let Err(e) = self.store.persist_short_term(&self.messages) {
            tracing::warn!(error = %e, "failed to persist short-term memory");
        }

        // The user's emotion wins; the reply only decides when the user
        // reads neutral
        let user_emotion = emotion::classify(utterance);
        let display_emotion = if user_emotion == EmotionLabel::Neutral {
            emotion::classify(&reply)
        } else {
            user_emotion
        };

        let found = self.extractor.extract(utterance);
        let added = self.long_term.preferences.merge(&found);
        if added > 0 {
            tracing::debug!(session_id = %self.session_id, added, "learned new preferences");
        }
        self.long_term
            .conversations
            .push(ConversationRecord::new(utterance, reply.as_str(), display_emotion));
        if let Err(e) = self.store.persist_long_term(&self.long_term) {
            tracing::warn!(error = %e, "failed to persist long-term memory");
        }

        self.speak(&reply).await;
        self.animator.start_loop(display_emotion).await;

        tracing::info!(
            session_id = %self.session_id,
            emotion = %display_emotion,
            "turn complete"
        );
    }

    /// Speak through the output adapter, logging failures and continuing
    async fn speak(&self, text: &str) {
        if let Err(e) = self.output.speak(text).await {
            tracing::warn!(error = %e, "speech output failed");
        }
    }
}
