//! Debounced local typing indicator.
//!
//! `Idle -> Typing` on the first non-empty input, `Typing -> Idle` after the
//! quiet period with no further input, when the input is cleared, or when a
//! message is sent. Each transition emits exactly one notification. Every
//! keystroke restarts the quiet-period timer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default quiet period before typing is considered stopped.
pub const TYPING_QUIET_PERIOD: Duration = Duration::from_millis(2_000);

/// Receives typing transitions, typically forwarding them to the socket.
pub trait TypingNotifier: Send + Sync + 'static {
    fn typing_changed(&self, conversation_id: &str, is_typing: bool);
}

/// A typing transition for one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEvent {
    pub conversation_id: String,
    pub is_typing: bool,
}

impl TypingNotifier for mpsc::UnboundedSender<TypingEvent> {
    fn typing_changed(&self, conversation_id: &str, is_typing: bool) {
        let event = TypingEvent {
            conversation_id: conversation_id.to_string(),
            is_typing,
        };
        if self.send(event).is_err() {
            tracing::debug!("Typing receiver dropped for {}", conversation_id);
        }
    }
}

#[derive(Debug, Default)]
struct TypingState {
    is_typing: bool,
    last_keystroke: Option<Instant>,
    /// Bumped on every keystroke and stop; a timer only fires for its own.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Local typing state for one conversation.
///
/// Timers run on the ambient Tokio runtime, so input must be fed from within
/// one.
pub struct TypingTracker<N> {
    conversation_id: Arc<str>,
    quiet_period: Duration,
    notifier: Arc<N>,
    state: Arc<Mutex<TypingState>>,
}

impl<N> std::fmt::Debug for TypingTracker<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingTracker")
            .field("conversation_id", &self.conversation_id)
            .field("quiet_period", &self.quiet_period)
            .finish_non_exhaustive()
    }
}

impl<N: TypingNotifier> TypingTracker<N> {
    pub fn new(conversation_id: impl Into<String>, notifier: N) -> Self {
        Self::with_quiet_period(conversation_id, notifier, TYPING_QUIET_PERIOD)
    }

    pub fn with_quiet_period(
        conversation_id: impl Into<String>,
        notifier: N,
        quiet_period: Duration,
    ) -> Self {
        Self {
            conversation_id: Arc::from(conversation_id.into()),
            quiet_period,
            notifier: Arc::new(notifier),
            state: Arc::new(Mutex::new(TypingState::default())),
        }
    }

    pub fn is_typing(&self) -> bool {
        lock(&self.state).is_typing
    }

    pub fn last_keystroke(&self) -> Option<Instant> {
        lock(&self.state).last_keystroke
    }

    /// Feed the current contents of the input field.
    pub fn on_input_changed(&self, text: &str) {
        if text.is_empty() {
            self.stop("cleared");
            return;
        }

        let started = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.last_keystroke = Some(Instant::now());
            let started = !state.is_typing;
            state.is_typing = true;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.timer = Some(self.spawn_timer(state.generation));
            started
        };

        if started {
            tracing::debug!("Started typing in {}", self.conversation_id);
            self.notifier.typing_changed(&self.conversation_id, true);
        }
    }

    /// A message went out; typing ends immediately.
    pub fn on_message_sent(&self) {
        self.stop("sent");
    }

    fn stop(&self, reason: &str) {
        let was_typing = {
            let mut state = lock(&self.state);
            state.generation += 1;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            std::mem::replace(&mut state.is_typing, false)
        };

        if was_typing {
            tracing::debug!("Stopped typing in {} ({})", self.conversation_id, reason);
            self.notifier.typing_changed(&self.conversation_id, false);
        }
    }

    fn spawn_timer(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let notifier = Arc::clone(&self.notifier);
        let conversation_id = Arc::clone(&self.conversation_id);
        let quiet_period = self.quiet_period;

        tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let expired = {
                let mut state = lock(&state);
                if state.generation == generation && state.is_typing {
                    state.is_typing = false;
                    state.timer = None;
                    true
                } else {
                    false
                }
            };
            if expired {
                tracing::debug!("Stopped typing in {} (timeout)", conversation_id);
                notifier.typing_changed(&conversation_id, false);
            }
        })
    }
}

impl<N> Drop for TypingTracker<N> {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.state).timer.take() {
            timer.abort();
        }
    }
}

fn lock(state: &Mutex<TypingState>) -> MutexGuard<'_, TypingState> {
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
