//! The transactional key-value store.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::transaction::{Frame, FrameInfo, Original, TransactionResult, TransactionStack};

/// An in-memory map of string keys to integers with nested transactions.
///
/// Mutations are applied eagerly. While a transaction is open the innermost
/// frame records each touched key's prior state, so `rollback` can undo the
/// innermost transaction and `commit` only has to forget the undo logs.
///
/// Not thread-safe on its own; see [`SharedStore`](super::SharedStore).
#[derive(Debug, Default, Clone)]
pub struct TransactionalStore {
    data: HashMap<String, i64>,
    transactions: TransactionStack,
}

impl TransactionalStore {
    /// Create an empty store with no open transaction.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Data Operations ====================

    /// Set `key` to `value`, overwriting any previous value.
    pub fn set(&mut self, key: &str, value: i64) {
        self.capture(key, Frame::capture);
        self.data.insert(key.to_owned(), value);
    }

    /// Read the current value of `key`.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.data.get(key).copied()
    }

    /// Remove `key`. Removing a missing key is a no-op on the data.
    ///
    /// If `key` was created earlier in the innermost transaction, the
    /// rollback of that transaction restores the created value.
    pub fn unset(&mut self, key: &str) {
        self.capture(key, Frame::capture_unset);
        self.data.remove(key);
    }

    /// Record the pre-mutation state of `key` in the innermost frame.
    fn capture<F>(&mut self, key: &str, record: F)
    where
        F: FnOnce(&mut Frame, &str, Option<i64>) -> bool,
    {
        let current = self.data.get(key).copied();
        if let Some(frame) = self.transactions.innermost_mut() {
            if record(frame, key, current) {
                trace!(frame = %frame.id(), key, original = ?current, "captured original");
            }
        }
    }

    // ==================== Transaction Control ====================

    /// Open a new, possibly nested, transaction.
    pub fn begin(&mut self) {
        let id = self.transactions.push();
        debug!(frame = %id, depth = self.transactions.depth(), "begin");
    }

    /// Make every open transaction permanent.
    ///
    /// Fails with [`NoTransaction`](crate::transaction::TransactionError::NoTransaction)
    /// when nothing is open.
    pub fn commit(&mut self) -> TransactionResult<()> {
        match self.transactions.clear() {
            Ok(dropped) => {
                debug!(frames = dropped, "commit");
                Ok(())
            }
            Err(e) => {
                warn!("commit with no open transaction");
                Err(e)
            }
        }
    }

    /// Undo the innermost open transaction.
    ///
    /// Outer transactions stay open. Fails with
    /// [`NoTransaction`](crate::transaction::TransactionError::NoTransaction)
    /// when nothing is open.
    pub fn rollback(&mut self) -> TransactionResult<()> {
        let frame = self.transactions.pop().inspect_err(|_| {
            warn!("rollback with no open transaction");
        })?;

        let id = frame.id();
        let restored = frame.len();
        for (key, original) in frame.into_undo() {
            match original {
                Original::Absent => {
                    self.data.remove(&key);
                }
                Original::Value(v) => {
                    self.data.insert(key, v);
                }
            }
        }

        debug!(
            frame = %id,
            restored,
            depth = self.transactions.depth(),
            "rollback"
        );
        Ok(())
    }

    // ==================== Introspection ====================

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.transactions.depth()
    }

    pub fn in_transaction(&self) -> bool {
        !self.transactions.is_empty()
    }

    /// Number of keys currently set.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Summaries of the open transactions, outermost first.
    pub fn frames(&self) -> Vec<FrameInfo> {
        self.transactions.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionError;

    #[test]
    fn test_set_get_without_transaction() {
        let mut store = TransactionalStore::new();
        assert_eq!(store.get("a"), None);

        store.set("a", 10);
        assert_eq!(store.get("a"), Some(10));

        store.set("a", -3);
        assert_eq!(store.get("a"), Some(-3));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unset_without_transaction() {
        let mut store = TransactionalStore::new();
        store.set("a", 10);
        store.unset("a");
        assert_eq!(store.get("a"), None);
        assert!(store.is_empty());

        // Unsetting a missing key is fine.
        store.unset("never");
        assert_eq!(store.get("never"), None);
    }

    #[test]
    fn test_commit_rollback_without_transaction() {
        let mut store = TransactionalStore::new();
        store.set("a", 1);

        assert_eq!(store.commit(), Err(TransactionError::NoTransaction));
        assert_eq!(store.rollback(), Err(TransactionError::NoTransaction));
        assert_eq!(store.get("a"), Some(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_nested_rollback() {
        let mut store = TransactionalStore::new();
        store.set("a", 10);
        store.begin();
        store.set("a", 20);
        store.begin();
        store.set("a", 30);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(20));
        assert_eq!(store.depth(), 1);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(10));
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_commit_collapses_all() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.set("a", 30);
        store.begin();
        store.set("a", 40);

        store.commit().unwrap();
        assert_eq!(store.get("a"), Some(40));
        assert_eq!(store.depth(), 0);
        assert_eq!(store.rollback(), Err(TransactionError::NoTransaction));
        assert_eq!(store.get("a"), Some(40));
    }

    #[test]
    fn test_unset_then_rollback_then_commit() {
        let mut store = TransactionalStore::new();
        store.set("a", 50);
        store.begin();
        assert_eq!(store.get("a"), Some(50));
        store.set("a", 60);
        store.begin();
        store.unset("a");
        assert_eq!(store.get("a"), None);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(60));

        store.commit().unwrap();
        assert_eq!(store.get("a"), Some(60));
    }

    #[test]
    fn test_repeated_set_restores_pre_transaction_value() {
        let mut store = TransactionalStore::new();
        store.set("a", 1);
        store.begin();
        store.set("a", 2);
        store.set("a", 3);
        store.set("a", 4);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(1));
    }

    #[test]
    fn test_rollback_removes_created_keys() {
        let mut store = TransactionalStore::new();
        store.set("key1", 10);
        store.begin();
        store.set("key1", 20);
        store.set("key2", 30);

        store.rollback().unwrap();
        assert_eq!(store.get("key1"), Some(10));
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_unset_unknown_key_in_transaction() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.unset("ghost");
        store.rollback().unwrap();

        assert_eq!(store.get("ghost"), None);
        assert!(!store.contains_key("ghost"));
    }

    #[test]
    fn test_set_then_unset_in_same_frame() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.set("a", 5);
        store.unset("a");
        assert_eq!(store.get("a"), None);

        // The unset replaced the absent marker with 5.
        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(5));
    }

    #[test]
    fn test_created_value_kept_after_later_touches() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.set("a", 5);
        store.unset("a");
        store.set("a", 6);
        store.unset("a");
        store.set("a", 7);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(5));
    }

    #[test]
    fn test_unset_then_set_in_same_frame() {
        let mut store = TransactionalStore::new();
        store.set("a", 5);
        store.begin();
        store.set("a", 6);
        store.unset("a");
        store.set("a", 8);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(5));
    }

    #[test]
    fn test_unset_after_captured_value_restores_pre_frame_value() {
        let mut store = TransactionalStore::new();
        store.set("a", 5);
        store.begin();
        store.set("a", 6);
        store.unset("a");

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(5));
    }

    #[test]
    fn test_unset_missing_then_set_rolls_back_to_absent() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.unset("a");
        store.set("a", 3);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_unset_set_unset_of_missing_key() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.unset("a");
        store.set("a", 3);
        store.unset("a");

        // The second unset finds the absent marker with the key present.
        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(3));
    }

    #[test]
    fn test_created_in_inner_frame_then_unset() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.begin();
        store.set("a", 1);
        store.unset("a");

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(1));

        // The outer frame never touched the key.
        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(1));
    }

    #[test]
    fn test_inner_rollback_keeps_outer_frame() {
        let mut store = TransactionalStore::new();
        store.set("a", 1);
        store.begin();
        store.set("a", 2);
        store.begin();
        store.set("a", 3);
        store.set("b", 4);
        store.rollback().unwrap();

        assert_eq!(store.get("a"), Some(2));
        assert_eq!(store.get("b"), None);

        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(1));
    }

    #[test]
    fn test_key_untouched_by_outer_restored_by_inner() {
        let mut store = TransactionalStore::new();
        store.set("b", 9);
        store.begin();
        store.begin();
        store.unset("b");
        store.rollback().unwrap();
        assert_eq!(store.get("b"), Some(9));

        store.rollback().unwrap();
        assert_eq!(store.get("b"), Some(9));
    }

    #[test]
    fn test_deep_nesting() {
        let mut store = TransactionalStore::new();
        for i in 0..100 {
            store.begin();
            store.set("n", i);
        }
        assert_eq!(store.depth(), 100);

        for i in (0..100).rev() {
            assert_eq!(store.get("n"), Some(i));
            store.rollback().unwrap();
        }
        assert_eq!(store.get("n"), None);
    }

    #[test]
    fn test_frames_report_touched_keys() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.set("a", 1);
        store.set("b", 2);
        store.set("a", 3);
        store.begin();
        store.unset("a");

        let frames = store.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].touched, 2);
        assert_eq!(frames[1].touched, 1);
    }

    #[test]
    fn test_independent_instances() {
        let mut first = TransactionalStore::new();
        let second = TransactionalStore::new();
        first.begin();
        first.set("a", 1);

        assert_eq!(second.get("a"), None);
        assert!(!second.in_transaction());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Set(&'static str, i64),
        Unset(&'static str),
        Begin,
        Commit,
        Rollback,
    }

    impl quickcheck::Arbitrary for Op {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            // few keys, so frames overlap often
            let key = *g.choose(&["a", "b", "c"]).unwrap();
            match *g.choose(&[0u8, 0, 1, 2, 3, 4]).unwrap() {
                0 => Op::Set(key, i64::from(<i8 as quickcheck::Arbitrary>::arbitrary(g))),
                1 => Op::Unset(key),
                2 => Op::Begin,
                3 => Op::Commit,
                _ => Op::Rollback,
            }
        }
    }

    /// Reference model: snapshot the whole map on begin.
    ///
    /// Unsetting a key that is present but missing from the innermost
    /// snapshot (created inside that transaction) writes its current value
    /// into the snapshot, so the rollback restores it.
    #[derive(Default)]
    struct SnapshotModel {
        data: HashMap<String, i64>,
        snapshots: Vec<Snapshot>,
        /// Cleared once an upgraded snapshot is restored under an open outer
        /// transaction. The outer frame then captures the restored value on
        /// first touch, which whole-map snapshots cannot express.
        exact: bool,
    }

    struct Snapshot {
        data: HashMap<String, i64>,
        upgraded: bool,
    }

    impl SnapshotModel {
        fn new() -> Self {
            Self {
                exact: true,
                ..Default::default()
            }
        }

        fn apply(&mut self, op: &Op) -> TransactionResult<()> {
            match op {
                Op::Set(k, v) => {
                    self.data.insert(k.to_string(), *v);
                }
                Op::Unset(k) => {
                    let current = self.data.remove(*k);
                    if let (Some(snapshot), Some(v)) = (self.snapshots.last_mut(), current) {
                        if !snapshot.data.contains_key(*k) {
                            snapshot.data.insert(k.to_string(), v);
                            snapshot.upgraded = true;
                        }
                    }
                }
                Op::Begin => self.snapshots.push(Snapshot {
                    data: self.data.clone(),
                    upgraded: false,
                }),
                Op::Commit => {
                    if self.snapshots.is_empty() {
                        return Err(TransactionError::NoTransaction);
                    }
                    self.snapshots.clear();
                }
                Op::Rollback => {
                    let snapshot = self.snapshots.pop().ok_or(TransactionError::NoTransaction)?;
                    if snapshot.upgraded && !self.snapshots.is_empty() {
                        self.exact = false;
                    }
                    self.data = snapshot.data;
                }
            }
            Ok(())
        }
    }

    fn apply(store: &mut TransactionalStore, op: &Op) -> TransactionResult<()> {
        match op {
            Op::Set(k, v) => store.set(k, *v),
            Op::Unset(k) => store.unset(k),
            Op::Begin => store.begin(),
            Op::Commit => return store.commit(),
            Op::Rollback => return store.rollback(),
        }
        Ok(())
    }

    #[quickcheck]
    fn matches_snapshot_model(ops: Vec<Op>) -> bool {
        let mut store = TransactionalStore::new();
        let mut model = SnapshotModel::new();

        for op in &ops {
            let agreed = apply(&mut store, op) == model.apply(op)
                && store.data == model.data
                && store.depth() == model.snapshots.len();
            if !agreed {
                return false;
            }
            if !model.exact {
                break;
            }
        }
        true
    }

    #[test]
    fn test_upgraded_value_restored_into_outer_frame() {
        let mut store = TransactionalStore::new();
        store.begin();
        store.begin();
        store.set("a", 1);
        store.unset("a");
        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(1));

        // First touch in the outer frame captures the restored value.
        store.set("a", 2);
        store.rollback().unwrap();
        assert_eq!(store.get("a"), Some(1));
    }

    #[quickcheck]
    fn failed_control_leaves_data_unchanged(ops: Vec<Op>) -> bool {
        let mut store = TransactionalStore::new();
        for op in &ops {
            if matches!(op, Op::Set(..) | Op::Unset(..)) {
                apply(&mut store, op).unwrap();
            }
        }
        let before = store.data.clone();
        store.commit().is_err() && store.rollback().is_err() && store.data == before
    }
}
