//! Sample transaction sequences, printed step by step.

use std::io::{self, Write};

use super::store::TransactionalStore;
use crate::transaction::TransactionResult;

fn show(value: Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NULL".to_string(),
    }
}

fn report<W: Write>(out: &mut W, op: &str, result: TransactionResult<()>) -> io::Result<()> {
    if let Err(e) = result {
        writeln!(out, "{}: {}", op, e)?;
    }
    Ok(())
}

/// Run the three sample sequences against fresh stores.
pub fn run_demo<W: Write>(out: &mut W) -> io::Result<()> {
    nested_rollback(out)?;
    writeln!(out)?;
    nested_commit(out)?;
    writeln!(out)?;
    nested_unset(out)
}

/// Two nested transactions, each rolled back in turn.
fn nested_rollback<W: Write>(out: &mut W) -> io::Result<()> {
    let mut store = TransactionalStore::new();
    writeln!(out, "Example 1:")?;

    store.begin();
    store.set("a", 10);
    writeln!(out, "GET a: {}", show(store.get("a")))?;

    store.begin();
    store.set("a", 20);
    writeln!(out, "GET a: {}", show(store.get("a")))?;

    report(out, "ROLLBACK", store.rollback())?;
    writeln!(out, "GET a after rollback: {}", show(store.get("a")))?;

    report(out, "ROLLBACK", store.rollback())?;
    writeln!(out, "GET a after second rollback: {}", show(store.get("a")))
}

/// A commit closes every open transaction at once.
fn nested_commit<W: Write>(out: &mut W) -> io::Result<()> {
    let mut store = TransactionalStore::new();
    writeln!(out, "Example 2:")?;

    store.begin();
    store.set("a", 30);
    store.begin();
    store.set("a", 40);

    report(out, "COMMIT", store.commit())?;
    writeln!(out, "GET a after commit: {}", show(store.get("a")))?;

    report(out, "ROLLBACK", store.rollback())
}

/// Unset inside a nested transaction, undone by rollback.
fn nested_unset<W: Write>(out: &mut W) -> io::Result<()> {
    let mut store = TransactionalStore::new();
    writeln!(out, "Example 3:")?;

    store.set("a", 50);
    store.begin();
    writeln!(out, "GET a: {}", show(store.get("a")))?;

    store.set("a", 60);
    store.begin();
    store.unset("a");
    writeln!(out, "GET a after unset: {}", show(store.get("a")))?;

    report(out, "ROLLBACK", store.rollback())?;
    writeln!(out, "GET a after rollback: {}", show(store.get("a")))?;

    report(out, "COMMIT", store.commit())?;
    writeln!(out, "GET a after final commit: {}", show(store.get("a")))
}
