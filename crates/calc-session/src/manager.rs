//! Session manager for accumulating calculator sessions.

use std::sync::Arc;

use calc_core::{Arithmetic, CalcError, Handle, OpTag, OperationRecord, WrappingArithmetic};

use crate::table::HandleTable;

/// Accumulator state behind a session handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Running value.
    pub current: u32,
    /// Applied operations, oldest first.
    pub history: Vec<OperationRecord>,
}

impl Session {
    fn push(&mut self, arithmetic: &impl Arithmetic, op: OpTag, value: u32) -> OperationRecord {
        let record = OperationRecord {
            op,
            x: self.current,
            y: value,
            value: arithmetic.apply(op, self.current, value),
        };
        self.history.push(record);
        self.current = record.value;
        record
    }

    fn reset(&mut self) {
        self.current = 0;
        self.history.clear();
    }
}

/// Owns every live [`Session`].
pub struct SessionManager<A = WrappingArithmetic> {
    arithmetic: Arc<A>,
    sessions: HandleTable<Session>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Arc::new(WrappingArithmetic))
    }
}

impl<A: Arithmetic> SessionManager<A> {
    /// Create a session manager over shared arithmetic.
    #[must_use]
    pub fn new(arithmetic: Arc<A>) -> Self {
        Self {
            arithmetic,
            sessions: HandleTable::new("sessions"),
        }
    }

    /// Start a new session at zero with empty history.
    ///
    /// # Errors
    /// Returns `HandlesExhausted` if no handle is left.
    pub fn create(&self) -> Result<Handle, CalcError> {
        self.sessions.create(Session::default())
    }

    /// Apply `op` with `value` to the running total and record it.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn push_op(&self, handle: Handle, op: OpTag, value: u32) -> Result<(), CalcError> {
        let record = self
            .sessions
            .with_mut(handle, |s| s.push(self.arithmetic.as_ref(), op, value))?;
        tracing::debug!(%handle, %op, x = record.x, y = record.y, value = record.value, "pushed op");
        Ok(())
    }

    /// Current running value.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn current(&self, handle: Handle) -> Result<u32, CalcError> {
        self.sessions.with(handle, |s| s.current)
    }

    /// Snapshot of the history in append order.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn history(&self, handle: Handle) -> Result<Vec<OperationRecord>, CalcError> {
        self.sessions.with(handle, |s| s.history.clone())
    }

    /// Back to zero with empty history.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn reset(&self, handle: Handle) -> Result<(), CalcError> {
        self.sessions.with_mut(handle, Session::reset)?;
        tracing::debug!(%handle, "session reset");
        Ok(())
    }

    /// Drop the session; the handle becomes invalid.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn destroy(&self, handle: Handle) -> Result<(), CalcError> {
        self.sessions.destroy(handle).map(drop)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
