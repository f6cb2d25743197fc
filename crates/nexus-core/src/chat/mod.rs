//! Chat screen state: local typing indicator, remote typing peers and the
//! auto-scroll policy.

mod scroll;
mod typing;

use std::collections::HashSet;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::models::ChatMessage;

pub use scroll::{
    dedup_messages, is_near_bottom, wait_for_layout, LayoutProbe, ScrollDecision, ScrollTracker,
    Viewport, LAYOUT_POLL_INTERVAL, NEAR_BOTTOM_ITEMS,
};
pub use typing::{TypingEvent, TypingNotifier, TypingTracker, TYPING_QUIET_PERIOD};

/// Per-conversation chat state holder.
#[derive(Debug)]
pub struct ChatSession<N> {
    local_user_id: String,
    messages: Vec<ChatMessage>,
    typing: TypingTracker<N>,
    scroll: ScrollTracker,
    typing_peers: HashSet<String>,
}

impl<N: TypingNotifier> ChatSession<N> {
    pub fn new(
        conversation_id: impl Into<String>,
        local_user_id: impl Into<String>,
        notifier: N,
    ) -> Self {
        Self::with_quiet_period(
            conversation_id,
            local_user_id,
            notifier,
            TYPING_QUIET_PERIOD,
        )
    }

    /// Session using the configured typing quiet period.
    pub fn from_config(
        conversation_id: impl Into<String>,
        local_user_id: impl Into<String>,
        notifier: N,
        config: &ClientConfig,
    ) -> Self {
        Self::with_quiet_period(
            conversation_id,
            local_user_id,
            notifier,
            config.typing_quiet_period(),
        )
    }

    pub fn with_quiet_period(
        conversation_id: impl Into<String>,
        local_user_id: impl Into<String>,
        notifier: N,
        quiet_period: Duration,
    ) -> Self {
        Self {
            local_user_id: local_user_id.into(),
            messages: Vec::new(),
            typing: TypingTracker::with_quiet_period(conversation_id, notifier, quiet_period),
            scroll: ScrollTracker::new(),
            typing_peers: HashSet::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Input field changed.
    pub fn on_local_keystroke(&self, text: &str) {
        self.typing.on_input_changed(text);
    }

    pub fn on_message_sent(&self) {
        self.typing.on_message_sent();
    }

    pub fn is_local_typing(&self) -> bool {
        self.typing.is_typing()
    }

    /// Remote typing state as pushed by the socket.
    pub fn set_peer_typing(&mut self, peer_id: &str, is_typing: bool) {
        if is_typing {
            self.typing_peers.insert(peer_id.to_string());
        } else {
            self.typing_peers.remove(peer_id);
        }
    }

    pub fn is_typing(&self, peer_id: &str) -> bool {
        self.typing_peers.contains(peer_id)
    }

    /// Replace the message list and decide how the view should scroll.
    pub fn receive_messages(
        &mut self,
        messages: Vec<ChatMessage>,
        viewport: Viewport,
    ) -> ScrollDecision {
        self.messages = dedup_messages(messages);
        let remote_typing = !self.typing_peers.is_empty();
        self.scroll.evaluate(
            &self.messages,
            viewport,
            &self.local_user_id,
            remote_typing,
        )
    }
}
