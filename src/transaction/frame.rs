//! Undo frames.
//!
//! A frame remembers, for every key touched while it was the innermost
//! transaction, what that key looked like just before the frame first
//! touched it. The one exception is a key created inside the frame and then
//! unset: the frame then remembers the created value.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ulid::Ulid;

/// The state a key had before a frame first touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Original {
    /// The key did not exist; undo deletes it.
    Absent,
    /// The key held this value; undo writes it back.
    Value(i64),
}

impl From<Option<i64>> for Original {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(v) => Original::Value(v),
            None => Original::Absent,
        }
    }
}

impl From<Original> for Option<i64> {
    fn from(original: Original) -> Self {
        match original {
            Original::Absent => None,
            Original::Value(v) => Some(v),
        }
    }
}

/// One open transaction's undo log.
#[derive(Debug, Clone)]
pub struct Frame {
    id: Ulid,
    opened_at: DateTime<Utc>,
    undo: HashMap<String, Original>,
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self {
            id: Ulid::new(),
            opened_at: Utc::now(),
            undo: HashMap::new(),
        }
    }

    /// Unique id of this frame.
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// When the frame was opened.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Number of distinct keys touched in this frame.
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// The captured original state of `key`, if this frame touched it.
    #[cfg(test)]
    pub(crate) fn original(&self, key: &str) -> Option<Original> {
        self.undo.get(key).copied()
    }

    /// Record `current` as the original state of `key` before a set.
    ///
    /// Only the first capture per key sticks. Returns `true` if this call
    /// recorded a new entry.
    pub(crate) fn capture(&mut self, key: &str, current: Option<i64>) -> bool {
        match self.undo.entry(key.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Original::from(current));
                true
            }
        }
    }

    /// Record the original state of `key` before an unset.
    ///
    /// Same as [`Frame::capture`], except that an `Absent` entry for a key
    /// that is currently present is replaced by the current value, so the
    /// rollback restores the set made earlier in this frame. Captured values
    /// are never replaced. Returns `true` if the entry changed.
    pub(crate) fn capture_unset(&mut self, key: &str, current: Option<i64>) -> bool {
        match self.undo.entry(key.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(Original::from(current));
                true
            }
            Entry::Occupied(mut slot) => match (*slot.get(), current) {
                (Original::Absent, Some(v)) => {
                    slot.insert(Original::Value(v));
                    true
                }
                _ => false,
            },
        }
    }

    /// Consume the frame, yielding the entries needed to undo it.
    pub(crate) fn into_undo(self) -> impl Iterator<Item = (String, Original)> {
        self.undo.into_iter()
    }
}

/// A read-only summary of an open frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// Frame id.
    pub id: Ulid,
    /// Nesting depth, 1 for the outermost transaction.
    pub depth: usize,
    /// When the frame was opened.
    pub opened_at: DateTime<Utc>,
    /// Number of keys the frame will restore on rollback.
    pub touched: usize,
}
