//! Feedback animator
//!
//! Owns at most one background animation loop at a time. The loop cycles the
//! frames of the active emotion on the display adapter until it is cancelled;
//! cancellation is cooperative and the join is bounded, so stopping never
//! hangs the session engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::display::DisplayAdapter;
use crate::emotion::{self, EmotionLabel};

/// Longest the engine waits for the loop task to observe a stop
const STOP_WAIT: Duration = Duration::from_secs(1);

/// Drives emotion animations on a display adapter
pub struct FeedbackAnimator {
    display: Arc<dyn DisplayAdapter>,
    frame_interval: Duration,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl FeedbackAnimator {
    #[must_use]
    pub const fn new(display: Arc<dyn DisplayAdapter>, frame_interval: Duration) -> Self {
        Self {
            display,
            frame_interval,
            running: None,
        }
    }

    /// Show the first frame of an emotion without starting a loop
    pub fn display(&self, emotion: EmotionLabel) {
        if let Some(frame) = emotion::frames(emotion).first() {
            self.display.show_frame(frame);
        }
    }

    /// Replace any running loop with one cycling the emotion's frames
    pub async fn start_loop(&mut self, emotion: EmotionLabel) {
        self.stop().await;

        let frames = emotion::frames(emotion);
        let display = Arc::clone(&self.display);
        let interval = self.frame_interval;
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                for frame in frames {
                    display.show_frame(frame);
                    tokio::select! {
                        () = loop_token.cancelled() => return,
                        () = tokio::time::sleep(interval) => {}
                    }
                }
            }
        });

        self.running = Some((token, handle));
        tracing::debug!(%emotion, "animation loop started");
    }

    /// Stop the running loop, if any
    ///
    /// Idempotent. Waits at most [`STOP_WAIT`] for the task to finish, then
    /// aborts it rather than hang.
    pub async fn stop(&mut self) {
        let Some((token, handle)) = self.running.take() else {
            return;
        };

        token.cancel();

        let abort = handle.abort_handle();
        match tokio::time::timeout(STOP_WAIT, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "animation task ended abnormally"),
            Err(_) => {
                tracing::warn!("animation task missed the stop deadline, aborting");
                abort.abort();
            }
        }
    }

    /// Whether an animation loop is currently running
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.running.is_some()
    }
}
