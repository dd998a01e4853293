//! Text commands understood by the shell.
//!
//! One command per line, verbs are case-insensitive, keys are case-sensitive:
//!
//! ```text
//! SET <key> <integer>
//! GET <key>
//! UNSET <key>
//! BEGIN
//! COMMIT
//! ROLLBACK
//! ```

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

use super::store::TransactionalStore;
use crate::transaction::TransactionResult;

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command} expects {expected} argument(s), got {found}")]
    Arity {
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid integer {value:?}: {source}")]
    InvalidValue {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: i64 },
    Get { key: String },
    Unset { key: String },
    Begin,
    Commit,
    Rollback,
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command changed state and has nothing to print.
    Done,
    /// Result of a `GET`.
    Value(Option<i64>),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => Ok(()),
            Outcome::Value(Some(v)) => write!(f, "{}", v),
            Outcome::Value(None) => write!(f, "NULL"),
        }
    }
}

impl Command {
    /// The command verb as written in the command language.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Get { .. } => "GET",
            Command::Unset { .. } => "UNSET",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Rollback => "ROLLBACK",
        }
    }

    /// Check if the command can modify the store.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::Get { .. })
    }

    /// Run the command against `store`.
    pub fn apply(&self, store: &mut TransactionalStore) -> TransactionResult<Outcome> {
        match self {
            Command::Set { key, value } => store.set(key, *value),
            Command::Get { key } => return Ok(Outcome::Value(store.get(key))),
            Command::Unset { key } => store.unset(key),
            Command::Begin => store.begin(),
            Command::Commit => store.commit()?,
            Command::Rollback => store.rollback()?,
        }
        Ok(Outcome::Done)
    }
}

fn expect_args(command: &'static str, args: &[&str], expected: usize) -> Result<(), CommandError> {
    if args.len() != expected {
        return Err(CommandError::Arity {
            command,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = parts.collect();

        match verb.to_uppercase().as_str() {
            "SET" => {
                expect_args("SET", &args, 2)?;
                let value = args[1].parse().map_err(|source| CommandError::InvalidValue {
                    value: args[1].to_string(),
                    source,
                })?;
                Ok(Command::Set {
                    key: args[0].to_string(),
                    value,
                })
            }
            "GET" => {
                expect_args("GET", &args, 1)?;
                Ok(Command::Get {
                    key: args[0].to_string(),
                })
            }
            "UNSET" => {
                expect_args("UNSET", &args, 1)?;
                Ok(Command::Unset {
                    key: args[0].to_string(),
                })
            }
            "BEGIN" => expect_args("BEGIN", &args, 0).map(|_| Command::Begin),
            "COMMIT" => expect_args("COMMIT", &args, 0).map(|_| Command::Commit),
            "ROLLBACK" => expect_args("ROLLBACK", &args, 0).map(|_| Command::Rollback),
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set { key, value } => write!(f, "SET {} {}", key, value),
            Command::Get { key } => write!(f, "GET {}", key),
            Command::Unset { key } => write!(f, "UNSET {}", key),
            other => write!(f, "{}", other.name()),
        }
    }
}
