//! txstore - An in-memory key-value store with nested transactions
//!
//! Keys are strings, values are `i64`. Transactions nest without limit:
//! `rollback` undoes only the innermost one, `commit` makes all of them
//! permanent at once.
//!
//! # Example
//!
//! ```
//! use txstore::db::TransactionalStore;
//! use txstore::transaction::TransactionError;
//!
//! let mut store = TransactionalStore::new();
//! store.set("a", 10);
//!
//! store.begin();
//! store.set("a", 20);
//! store.begin();
//! store.unset("a");
//! assert_eq!(store.get("a"), None);
//!
//! store.rollback().unwrap();
//! assert_eq!(store.get("a"), Some(20));
//!
//! store.commit().unwrap();
//! assert_eq!(store.rollback(), Err(TransactionError::NoTransaction));
//! assert_eq!(store.get("a"), Some(20));
//! ```

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod db;
pub mod transaction;
