//! Auto-scroll policy for the message list.

use std::collections::HashSet;
use std::time::Duration;

use crate::models::ChatMessage;

/// Positions from the end that still count as "at the bottom".
pub const NEAR_BOTTOM_ITEMS: usize = 4;

/// Poll interval while waiting for the first layout pass.
pub const LAYOUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the list view reports about its current layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub first_visible_index: usize,
    /// Zero until the list has completed its first layout pass.
    pub laid_out_items: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Leave the viewport where it is.
    Stay,
    /// Scroll to the item at this index now.
    ScrollToBottom(usize),
    /// First message set: wait for layout, then scroll to this index.
    AwaitLayoutThenScroll(usize),
}

/// Remembers the newest message id the view has reacted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollTracker {
    last_seen_id: Option<String>,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen_id(&self) -> Option<&str> {
        self.last_seen_id.as_deref()
    }

    /// Decide how to react to the current (de-duplicated) message list.
    pub fn evaluate(
        &mut self,
        messages: &[ChatMessage],
        viewport: Viewport,
        local_user_id: &str,
        remote_typing: bool,
    ) -> ScrollDecision {
        let Some(newest) = messages.last() else {
            return ScrollDecision::Stay;
        };
        if self.last_seen_id.as_deref() == Some(newest.id.as_str()) {
            return ScrollDecision::Stay;
        }

        let last_index = messages.len() - 1;
        let first_time = self.last_seen_id.is_none();
        self.last_seen_id = Some(newest.id.clone());

        if first_time {
            return if viewport.laid_out_items == 0 {
                ScrollDecision::AwaitLayoutThenScroll(last_index)
            } else {
                ScrollDecision::ScrollToBottom(last_index)
            };
        }

        let own_message = newest.sender_id == local_user_id;
        if own_message
            || is_near_bottom(viewport.first_visible_index, messages.len())
            || remote_typing
        {
            ScrollDecision::ScrollToBottom(last_index)
        } else {
            ScrollDecision::Stay
        }
    }
}

/// Whether the first visible item is within the last [`NEAR_BOTTOM_ITEMS`].
pub const fn is_near_bottom(first_visible_index: usize, message_count: usize) -> bool {
    first_visible_index + NEAR_BOTTOM_ITEMS >= message_count
}

/// Drop messages whose id was already seen, keeping the first occurrence.
pub fn dedup_messages(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|message| seen.insert(message.id.clone()))
        .collect()
}

/// Source of the list view's current layout.
pub trait LayoutProbe {
    fn laid_out_items(&self) -> usize;
}

impl<F: Fn() -> usize> LayoutProbe for F {
    fn laid_out_items(&self) -> usize {
        self()
    }
}

/// Poll `probe` until at least one item is laid out.
pub async fn wait_for_layout(probe: &impl LayoutProbe, interval: Duration) {
    while probe.laid_out_items() == 0 {
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;

    fn conversation(count: usize, last_sender: &str) -> Vec<ChatMessage> {
        (0..count)
            .map(|index| {
                let sender = if index + 1 == count { last_sender } else { "peer" };
                ChatMessage::new(format!("m{index}"), sender, "hello")
            })
            .collect()
    }

    fn at(first_visible_index: usize) -> Viewport {
        Viewport {
            first_visible_index,
            laid_out_items: 10,
        }
    }

    fn seen(messages: &[ChatMessage]) -> ScrollTracker {
        let mut tracker = ScrollTracker::new();
        tracker.evaluate(messages, at(0), "me", false);
        tracker
    }

    #[test]
    fn first_message_set_waits_for_layout() {
        let mut tracker = ScrollTracker::new();
        let decision = tracker.evaluate(&conversation(3, "peer"), Viewport::default(), "me", false);
        assert_eq!(decision, ScrollDecision::AwaitLayoutThenScroll(2));
        assert_eq!(tracker.last_seen_id(), Some("m2"));
    }

    #[test]
    fn first_message_set_after_layout_scrolls_immediately() {
        let mut tracker = ScrollTracker::new();
        let decision = tracker.evaluate(&conversation(3, "peer"), at(0), "me", false);
        assert_eq!(decision, ScrollDecision::ScrollToBottom(2));
    }

    #[test]
    fn empty_or_unchanged_lists_stay() {
        let mut tracker = ScrollTracker::new();
        assert_eq!(tracker.evaluate(&[], at(0), "me", false), ScrollDecision::Stay);

        let messages = conversation(3, "peer");
        tracker.evaluate(&messages, at(0), "me", false);
        assert_eq!(
            tracker.evaluate(&messages, at(0), "me", true),
            ScrollDecision::Stay
        );
    }

    #[test]
    fn peer_message_while_reading_history_stays() {
        let mut tracker = seen(&conversation(49, "peer"));
        let decision = tracker.evaluate(&conversation(50, "peer"), at(9), "me", false);
        assert_eq!(decision, ScrollDecision::Stay);
    }

    #[test]
    fn peer_message_near_bottom_scrolls() {
        let mut tracker = seen(&conversation(49, "peer"));
        let decision = tracker.evaluate(&conversation(50, "peer"), at(47), "me", false);
        assert_eq!(decision, ScrollDecision::ScrollToBottom(49));
    }

    #[test]
    fn own_message_always_scrolls() {
        let mut tracker = seen(&conversation(49, "peer"));
        let decision = tracker.evaluate(&conversation(50, "me"), at(0), "me", false);
        assert_eq!(decision, ScrollDecision::ScrollToBottom(49));
    }

    #[test]
    fn remote_typing_scrolls() {
        let mut tracker = seen(&conversation(49, "peer"));
        let decision = tracker.evaluate(&conversation(50, "peer"), at(0), "me", true);
        assert_eq!(decision, ScrollDecision::ScrollToBottom(49));
    }

    #[test]
    fn near_bottom_boundary() {
        assert!(is_near_bottom(46, 50));
        assert!(!is_near_bottom(45, 50));
        assert!(is_near_bottom(0, 3));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let messages = vec![
            ChatMessage::new("a", "peer", "one"),
            ChatMessage::new("b", "me", "two"),
            ChatMessage::new("a", "peer", "one again"),
        ];
        let deduped = dedup_messages(messages);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].content, "one");
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_layout_polls_until_items_exist() {
        let laid_out = Arc::new(AtomicUsize::new(0));
        let probe = {
            let laid_out = Arc::clone(&laid_out);
            move || laid_out.load(Ordering::SeqCst)
        };

        let waiter = tokio::spawn(async move {
            wait_for_layout(&probe, LAYOUT_POLL_INTERVAL).await;
        });
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!waiter.is_finished());

        laid_out.store(5, Ordering::SeqCst);
        tokio::time::sleep(LAYOUT_POLL_INTERVAL).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(waiter.is_finished());
    }
}
