//! High-level database API, shared handle and REPL interface.
//!
//! [`TransactionalStore`] is the core. Everything else in this module is a
//! caller of its public operations: [`SharedStore`] adds locking,
//! [`Database`] and [`Repl`] add a line-oriented command language.

mod api;
mod command;
mod demo;
mod repl;
mod shared;
mod store;

pub use api::{Database, DatabaseError, DatabaseResult, DatabaseStats};
pub use command::{Command, CommandError, Outcome};
pub use demo::run_demo;
pub use repl::{Repl, ReplConfig};
pub use shared::SharedStore;
pub use store::TransactionalStore;
