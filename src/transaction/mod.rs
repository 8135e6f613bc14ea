//! Transaction boundary hooks.
//!
//! The engine demarcates its work through a [`TransactionBoundary`]:
//!
//! - `create_transaction` is called at the start of every `send_event` and
//!   again at the start of each attempted transition, right before exit
//!   validation. The second call happens while the first boundary is still
//!   open and must be a no-op in that case.
//! - `close_transaction(rollback)` is called once per finished attempt,
//!   with `rollback = true` after a failure, and once more at the end of
//!   every `send_event`. Closing with nothing open must be a no-op.
//!
//! [`NoTransaction`] ignores both hooks. [`ManagedTransactions`] adapts any
//! [`UnitOfWork`] to the contract above.

mod managed;

pub use managed::{ManagedTransactions, UnitOfWork};

/// Hooks a transaction manager implements to wrap engine calls.
pub trait TransactionBoundary: Send + Sync {
    fn create_transaction(&self) {}

    fn close_transaction(&self, _rollback: bool) {}
}

/// Boundary that does nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoTransaction;

impl TransactionBoundary for NoTransaction {}

impl<T: TransactionBoundary + ?Sized> TransactionBoundary for std::sync::Arc<T> {
    fn create_transaction(&self) {
        (**self).create_transaction()
    }

    fn close_transaction(&self, rollback: bool) {
        (**self).close_transaction(rollback)
    }
}
