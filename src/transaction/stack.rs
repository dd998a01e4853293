//! The transaction stack.
//!
//! Index 0 is the outermost transaction, the last frame is the innermost.
//! An empty stack means no transaction is open.

use ulid::Ulid;

use crate::transaction::error::{TransactionError, TransactionResult};
use crate::transaction::frame::{Frame, FrameInfo};

/// Ordered sequence of open undo frames.
#[derive(Debug, Default, Clone)]
pub struct TransactionStack {
    frames: Vec<Frame>,
}

impl TransactionStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Open a new innermost frame, returning its id.
    pub fn push(&mut self) -> Ulid {
        let frame = Frame::new();
        let id = frame.id();
        self.frames.push(frame);
        id
    }

    /// The frame that currently receives undo entries.
    pub fn innermost(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub(crate) fn innermost_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// Remove the innermost frame so the caller can replay it.
    pub fn pop(&mut self) -> TransactionResult<Frame> {
        self.frames.pop().ok_or(TransactionError::NoTransaction)
    }

    /// Discard every open frame, returning how many were dropped.
    pub fn clear(&mut self) -> TransactionResult<usize> {
        if self.frames.is_empty() {
            return Err(TransactionError::NoTransaction);
        }
        let dropped = self.frames.len();
        self.frames.clear();
        Ok(dropped)
    }

    /// Summaries of the open frames, outermost first.
    pub fn frames(&self) -> Vec<FrameInfo> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| FrameInfo {
                id: frame.id(),
                depth: i + 1,
                opened_at: frame.opened_at(),
                touched: frame.len(),
            })
            .collect()
    }
}
