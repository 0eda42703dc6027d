//! Bounded per-conversation message history
//!
//! Each agent owns one [`ConversationLog`]. Conversations are created lazily on
//! first append and hold at most `max_history` records; older records are dropped
//! first. Conversation ids themselves are only removed by [`ConversationLog::clear`].

use crate::utils::format_timestamp;
use chrono::{DateTime, Local, TimeZone};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Default number of records kept per conversation
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Who produced a history record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

/// One stored turn of a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    pub content: String,
    pub timestamp: String,
}

pub struct ConversationLog {
    conversations: DashMap<String, Vec<HistoryMessage>>,
    max_history: usize,
    /// Epoch millis of the last append, 0 when nothing was ever appended
    last_activity_ms: AtomicI64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// A zero limit is raised to one so the latest record always survives
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            conversations: DashMap::new(),
            max_history: max_history.max(1),
            last_activity_ms: AtomicI64::new(0),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Append a record, trimming the oldest entries past `max_history`
    pub fn append(&self, conversation_id: &str, role: HistoryRole, content: impl Into<String>) {
        let now = Local::now();
        let message = HistoryMessage {
            role,
            content: content.into(),
            timestamp: format_timestamp(&now),
        };

        {
            let mut entry = self
                .conversations
                .entry(conversation_id.to_string())
                .or_default();
            entry.push(message);
            if entry.len() > self.max_history {
                let excess = entry.len() - self.max_history;
                entry.drain(..excess);
            }
        }

        self.last_activity_ms
            .store(now.timestamp_millis(), Ordering::Relaxed);
    }

    /// Stored records for a conversation, oldest first
    pub fn get(&self, conversation_id: &str) -> Vec<HistoryMessage> {
        self.conversations
            .get(conversation_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Remove a conversation; returns whether it existed
    pub fn clear(&self, conversation_id: &str) -> bool {
        self.conversations.remove(conversation_id).is_some()
    }

    /// Number of distinct conversations
    pub fn count(&self) -> usize {
        self.conversations.len()
    }

    pub fn total_messages(&self) -> usize {
        self.conversations.iter().map(|entry| entry.len()).sum()
    }

    pub fn last_activity(&self) -> Option<DateTime<Local>> {
        match self.last_activity_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Local.timestamp_millis_opt(ms).single(),
        }
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
