//! Adapter from a begin/commit/rollback transaction manager to the engine's
//! boundary hooks.

use crate::transaction::TransactionBoundary;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

/// A transaction manager with explicit begin, commit and rollback.
pub trait UnitOfWork: Send + Sync {
    type Transaction: Send;

    fn begin(&self) -> Self::Transaction;
    fn commit(&self, transaction: Self::Transaction);
    fn rollback(&self, transaction: Self::Transaction);
}

/// Opens at most one transaction per calling thread.
///
/// `create_transaction` begins a transaction only if the calling thread has
/// none open. `close_transaction` commits or rolls back the open one and
/// does nothing when none is open.
///
/// # Example
///
/// ```rust
/// use statework::transaction::{ManagedTransactions, TransactionBoundary, UnitOfWork};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Counting { begun: AtomicUsize, committed: AtomicUsize }
///
/// impl UnitOfWork for Counting {
///     type Transaction = ();
///     fn begin(&self) { self.begun.fetch_add(1, Ordering::SeqCst); }
///     fn commit(&self, _: ()) { self.committed.fetch_add(1, Ordering::SeqCst); }
///     fn rollback(&self, _: ()) {}
/// }
///
/// let boundary = ManagedTransactions::new(Counting::default());
/// boundary.create_transaction();
/// boundary.create_transaction();
/// boundary.close_transaction(false);
/// boundary.close_transaction(false);
///
/// assert_eq!(boundary.unit_of_work().begun.load(Ordering::SeqCst), 1);
/// assert_eq!(boundary.unit_of_work().committed.load(Ordering::SeqCst), 1);
/// ```
pub struct ManagedTransactions<U: UnitOfWork> {
    unit_of_work: U,
    open: Mutex<HashMap<ThreadId, U::Transaction>>,
}

impl<U: UnitOfWork> ManagedTransactions<U> {
    pub fn new(unit_of_work: U) -> Self {
        Self {
            unit_of_work,
            open: Mutex::new(HashMap::new()),
        }
    }

    pub fn unit_of_work(&self) -> &U {
        &self.unit_of_work
    }

    /// Whether the calling thread has an open transaction.
    pub fn is_open(&self) -> bool {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        open.contains_key(&thread::current().id())
    }
}

impl<U: UnitOfWork> TransactionBoundary for ManagedTransactions<U> {
    fn create_transaction(&self) {
        let id = thread::current().id();
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if open.contains_key(&id) {
            tracing::debug!("Transaction already open, reusing it");
            return;
        }
        tracing::debug!("Beginning transaction");
        open.insert(id, self.unit_of_work.begin());
    }

    fn close_transaction(&self, rollback: bool) {
        let transaction = {
            let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
            open.remove(&thread::current().id())
        };
        match transaction {
            Some(tx) if rollback => {
                tracing::debug!("Rolling back transaction");
                self.unit_of_work.rollback(tx);
            }
            Some(tx) => {
                tracing::debug!("Committing transaction");
                self.unit_of_work.commit(tx);
            }
            None => {}
        }
    }
}

impl<U: UnitOfWork + fmt::Debug> fmt::Debug for ManagedTransactions<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedTransactions")
            .field("unit_of_work", &self.unit_of_work)
            .finish_non_exhaustive()
    }
}
