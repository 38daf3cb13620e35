//! Message admission: dedup over recent ids, self-author rejection, and the
//! keyword relevance test.

use std::collections::VecDeque;

use crate::forwarder::message::{InboundMessage, MessageKey};

/// How many message ids the dedup cache remembers.
pub const RECENT_CAPACITY: usize = 100;

/// Substrings that make a message worth forwarding. Matched
/// case-insensitively, no word boundaries: "Demographics" counts as a hit
/// for "demo". That false positive is inherited behavior and kept on
/// purpose.
pub const KEYWORDS: &[&str] = &["mom", "demo", "internal demo"];

/// Bounded FIFO of recently seen message keys.
///
/// Membership testing plus insert-with-eviction; once full, inserting
/// evicts the oldest entry. Never persisted, so duplicates can reappear
/// after a restart.
pub struct RecentIds {
    ids: VecDeque<MessageKey>,
    capacity: usize,
}

impl RecentIds {
    pub fn new(capacity: usize) -> Self {
        Self { ids: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn contains(&self, key: MessageKey) -> bool {
        self.ids.contains(&key)
    }

    pub fn insert(&mut self, key: MessageKey) {
        if self.ids.len() == self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(key);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Decides which messages get processed at all.
pub struct MessageFilter {
    bot_user_id: i64,
    recent: RecentIds,
}

impl MessageFilter {
    pub fn new(bot_user_id: i64) -> Self {
        Self { bot_user_id, recent: RecentIds::new(RECENT_CAPACITY) }
    }

    /// Admit a message for processing.
    ///
    /// Rejects self-authored messages and anything whose key is still in
    /// the recent cache (at-least-once transports can redeliver). Admitted
    /// messages are recorded so a redelivery within the cache window is
    /// dropped.
    pub fn admit(&mut self, msg: &InboundMessage) -> bool {
        if msg.author_id == self.bot_user_id || self.recent.contains(msg.key) {
            return false;
        }
        self.recent.insert(msg.key);
        true
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.recent.len()
    }
}

/// True when any keyword appears in the text, case-insensitively.
pub fn is_relevant(text: &str) -> bool {
    let lowered = text.to_lowercase();
    KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_ID: i64 = 999;

    fn msg(id: i64, author_id: i64, text: &str) -> InboundMessage {
        InboundMessage {
            key: MessageKey { chat_id: -100, message_id: id },
            author_id,
            author_name: "alice".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_admits_fresh_message() {
        let mut filter = MessageFilter::new(BOT_ID);
        assert!(filter.admit(&msg(1, 100, "hello")));
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let mut filter = MessageFilter::new(BOT_ID);
        assert!(filter.admit(&msg(1, 100, "hello")));
        assert!(!filter.admit(&msg(1, 100, "hello")));
    }

    #[test]
    fn test_duplicate_rejected_regardless_of_relevance() {
        let mut filter = MessageFilter::new(BOT_ID);
        assert!(filter.admit(&msg(1, 100, "Quick MOM: shipped v2")));
        assert!(!filter.admit(&msg(1, 100, "Quick MOM: shipped v2")));
    }

    #[test]
    fn test_rejects_self_authored() {
        let mut filter = MessageFilter::new(BOT_ID);
        assert!(!filter.admit(&msg(1, BOT_ID, "demo time")));
        // Rejection has no side effect on the cache
        assert_eq!(filter.cached(), 0);
    }

    #[test]
    fn test_cache_never_exceeds_capacity() {
        let mut filter = MessageFilter::new(BOT_ID);
        for id in 0..(RECENT_CAPACITY as i64 * 3) {
            filter.admit(&msg(id, 100, "x"));
            assert!(filter.cached() <= RECENT_CAPACITY);
        }
        assert_eq!(filter.cached(), RECENT_CAPACITY);
    }

    #[test]
    fn test_cache_holds_min_of_capacity_and_distinct() {
        let mut filter = MessageFilter::new(BOT_ID);
        for id in 0..7 {
            filter.admit(&msg(id, 100, "x"));
        }
        assert_eq!(filter.cached(), 7);
    }

    #[test]
    fn test_fifo_eviction_readmits_oldest() {
        let mut filter = MessageFilter::new(BOT_ID);
        assert!(filter.admit(&msg(0, 100, "x")));
        // Push the first id out of the window
        for id in 1..=(RECENT_CAPACITY as i64) {
            assert!(filter.admit(&msg(id, 100, "x")));
        }
        // Id 0 was evicted, so a redelivery is admitted again
        assert!(filter.admit(&msg(0, 100, "x")));
        // Id 1 is still in the window
        assert!(!filter.admit(&msg(1, 100, "x")));
    }

    #[test]
    fn test_relevance_case_insensitive() {
        assert!(is_relevant("Had our DEMO today"));
        assert!(is_relevant("quick MoM about the launch"));
    }

    #[test]
    fn test_relevance_is_pure_substring() {
        // No word-boundary check; a known, accepted false positive
        assert!(is_relevant("Demographics report"));
        assert!(is_relevant("mommentum"));
    }

    #[test]
    fn test_irrelevant_text() {
        assert!(!is_relevant("lunch at noon?"));
        assert!(!is_relevant(""));
    }

    #[test]
    fn test_internal_demo_phrase() {
        assert!(is_relevant("scheduling the Internal Demo for friday"));
    }
}
