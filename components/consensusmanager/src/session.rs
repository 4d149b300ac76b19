//! Session guards over a [`crate::readers_lock::ReadersFirstRwLock`],
//! generalized from an original `ConsensusInstance`/`ConsensusSession`
//! pair (which wrapped a `DynConsensus`) to any `T: Send + Sync` value —
//! here, the chain view (trie overlay + coin view) a block-validation
//! write-session mutates and every reader (mempool admission, future RPC)
//! takes a read snapshot of.

use crate::readers_lock::{ReadersFirstRwLock, ReadersFirstRwLockReadGuard};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::RwLockWriteGuard;

/// A read snapshot of `T` at acquisition time. Never blocks a writer from
/// *starting* (readers-first semantics of the backing lock).
pub struct SessionReadGuard<T: Send + Sync + 'static>(ReadersFirstRwLockReadGuard<T>);

impl<T: Send + Sync + 'static> Deref for SessionReadGuard<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

/// The single exclusive write-session (one block validation at a time).
pub struct SessionWriteGuard<'a, T: Send + Sync + 'static>(RwLockWriteGuard<'a, T>);

impl<T: Send + Sync + 'static> Deref for SessionWriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Send + Sync + 'static> DerefMut for SessionWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

/// Single-writer/multi-reader contract over a chain view: exactly one
/// write-session (block validation) holds the exclusive lock at a time;
/// readers (mempool admission, future RPC/DNS) acquire a [`SessionReadGuard`]
/// that never blocks the writer from starting. Cloning shares the same
/// underlying lock.
#[derive(Clone)]
pub struct SessionLock<T: Send + Sync + 'static>(Arc<ReadersFirstRwLock<T>>);

impl<T: Send + Sync + 'static> SessionLock<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(ReadersFirstRwLock::new(value)))
    }

    pub async fn read(&self) -> SessionReadGuard<T> {
        SessionReadGuard(self.0.read().await)
    }

    pub fn blocking_read(&self) -> SessionReadGuard<T> {
        SessionReadGuard(self.0.blocking_read())
    }

    pub async fn write(&self) -> SessionWriteGuard<'_, T> {
        SessionWriteGuard(self.0.write().await)
    }

    pub fn blocking_write(&self) -> SessionWriteGuard<'_, T> {
        SessionWriteGuard(self.0.blocking_write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_readers_see_snapshot_writer_mutates() {
        let lock = SessionLock::new(0u32);
        {
            let mut w = lock.write().await;
            *w = 1;
        }
        let r = lock.read().await;
        assert_eq!(*r, 1);
    }

    #[tokio::test]
    async fn test_clone_shares_same_lock() {
        let lock = SessionLock::new(vec![1, 2, 3]);
        let other = lock.clone();
        {
            let mut w = other.write().await;
            w.push(4);
        }
        assert_eq!(*lock.read().await, vec![1, 2, 3, 4]);
    }
}
