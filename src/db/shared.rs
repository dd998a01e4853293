//! Thread-safe handle around a [`TransactionalStore`].

use std::sync::Arc;

use parking_lot::Mutex;

use super::store::TransactionalStore;
use crate::transaction::{FrameInfo, TransactionError, TransactionResult};

/// A store that can be shared across threads.
///
/// Cloning is cheap and every clone sees the same data and the same
/// transaction stack. Each call takes the lock for its own duration only;
/// use [`SharedStore::with_transaction`] or [`SharedStore::lock`] when a
/// sequence of calls must not interleave with other callers.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<TransactionalStore>>,
}

impl SharedStore {
    /// Create a shared handle over an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store.
    pub fn from_store(store: TransactionalStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Hold the lock for a sequence of operations.
    pub fn lock(&self) -> parking_lot::MutexGuard<'_, TransactionalStore> {
        self.inner.lock()
    }

    pub fn set(&self, key: &str, value: i64) {
        self.inner.lock().set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.inner.lock().get(key)
    }

    pub fn unset(&self, key: &str) {
        self.inner.lock().unset(key);
    }

    pub fn begin(&self) {
        self.inner.lock().begin();
    }

    pub fn commit(&self) -> TransactionResult<()> {
        self.inner.lock().commit()
    }

    pub fn rollback(&self) -> TransactionResult<()> {
        self.inner.lock().rollback()
    }

    pub fn depth(&self) -> usize {
        self.inner.lock().depth()
    }

    pub fn frames(&self) -> Vec<FrameInfo> {
        self.inner.lock().frames()
    }

    /// Run `f` inside a new transaction while holding the lock.
    ///
    /// Every frame above the depth on entry belongs to this call. If `f`
    /// returns `Err`, those frames are rolled back innermost first and the
    /// error is passed through. If `f` returns `Ok` and any of them is still
    /// open, the store is committed, which collapses every open transaction.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TransactionalStore) -> Result<T, E>,
        E: From<TransactionError>,
    {
        let mut store = self.inner.lock();
        let base = store.depth();
        store.begin();

        match f(&mut *store) {
            Ok(result) => {
                if store.depth() > base {
                    store.commit()?;
                }
                Ok(result)
            }
            Err(e) => {
                while store.depth() > base {
                    store.rollback()?;
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.inner.lock();
        f.debug_struct("SharedStore")
            .field("keys", &store.len())
            .field("depth", &store.depth())
            .finish()
    }
}
