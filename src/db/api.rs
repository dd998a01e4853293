//! Database API - text-command front end over a [`TransactionalStore`].

use thiserror::Error;
use tracing::debug;

use super::command::{Command, CommandError, Outcome};
use super::store::TransactionalStore;
use crate::transaction::TransactionError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("command error: {0}")]
    Command(#[from] CommandError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatabaseError {
    /// Check if the session can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            DatabaseError::Transaction(e) => e.is_recoverable(),
            DatabaseError::Command(_) => true,
            DatabaseError::Io(_) => false,
        }
    }
}

/// Snapshot of database counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseStats {
    /// Keys currently set.
    pub keys: usize,
    /// Open transactions.
    pub open_transactions: usize,
    /// Commands executed successfully.
    pub commands: u64,
    /// Of those, commands that could modify the store.
    pub mutations: u64,
}

/// The main database handle.
#[derive(Debug, Default)]
pub struct Database {
    store: TransactionalStore,
    commands: u64,
    mutations: u64,
}

impl Database {
    /// Open an empty in-memory database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and execute a single command line.
    pub fn execute(&mut self, line: &str) -> DatabaseResult<Outcome> {
        let command: Command = line.parse()?;
        self.run(&command)
    }

    /// Execute an already parsed command.
    pub fn run(&mut self, command: &Command) -> DatabaseResult<Outcome> {
        debug!(command = %command, "execute");
        let outcome = command.apply(&mut self.store)?;
        self.commands += 1;
        if command.is_mutation() {
            self.mutations += 1;
        }
        Ok(outcome)
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &TransactionalStore {
        &self.store
    }

    /// Mutably borrow the underlying store.
    pub fn store_mut(&mut self) -> &mut TransactionalStore {
        &mut self.store
    }

    /// Consume the database, returning its store.
    pub fn into_store(self) -> TransactionalStore {
        self.store
    }

    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            keys: self.store.len(),
            open_transactions: self.store.depth(),
            commands: self.commands,
            mutations: self.mutations,
        }
    }
}
