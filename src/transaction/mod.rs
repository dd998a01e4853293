//! Transaction bookkeeping for txstore.
//!
//! Transactions are undo logs, not write buffers. Every mutation goes
//! straight to the store; the innermost open frame remembers what each key
//! looked like before the frame first touched it, so a rollback can put it
//! back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TransactionStack                          │
//! │   (outermost frame at index 0, innermost at the top)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │   Frame 1   │       │   Frame 2   │       │   Frame n   │
//!  │ key→Original│       │ key→Original│       │ key→Original│
//!  └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! - `BEGIN` pushes an empty frame.
//! - `COMMIT` drops every frame; the store already holds the latest values.
//! - `ROLLBACK` pops the innermost frame and replays it.

mod error;
mod frame;
mod stack;

pub use error::{TransactionError, TransactionResult};
pub use frame::{Frame, FrameInfo, Original};
pub use stack::TransactionStack;
