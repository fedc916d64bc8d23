//! Lock-guarded handle table.

use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use calc_core::{CalcError, Handle};

struct Inner<T> {
    /// Next value to hand out; `None` once the counter passed `u32::MAX`.
    next: Option<NonZeroU32>,
    entries: HashMap<Handle, T>,
}

/// Table of objects addressed by [`Handle`].
///
/// Handles come from a monotonically increasing counter starting at 1 and
/// are never reused, so a destroyed handle stays invalid forever. A single
/// lock guards the whole table.
pub struct HandleTable<T> {
    label: &'static str,
    inner: RwLock<Inner<T>>,
}

impl<T> HandleTable<T> {
    /// Create an empty table. `label` tags log lines.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self::starting_at(label, NonZeroU32::MIN)
    }

    fn starting_at(label: &'static str, first: NonZeroU32) -> Self {
        Self {
            label,
            inner: RwLock::new(Inner {
                next: Some(first),
                entries: HashMap::new(),
            }),
        }
    }

    // Every mutation completes before a closure can observe the table, so a
    // poisoned lock never guards a half-written entry.
    fn read(&self) -> RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `value` under a fresh handle.
    ///
    /// # Errors
    /// Returns `HandlesExhausted` once every `u32` handle has been issued.
    pub fn create(&self, value: T) -> Result<Handle, CalcError> {
        let mut inner = self.write();
        let Some(raw) = inner.next else {
            tracing::warn!(table = self.label, "handle counter exhausted");
            return Err(CalcError::HandlesExhausted);
        };
        inner.next = raw.checked_add(1);

        let handle = Handle::from(raw);
        inner.entries.insert(handle, value);
        tracing::debug!(table = self.label, %handle, "created");
        Ok(handle)
    }

    /// Run `f` against the object behind `handle`.
    ///
    /// # Errors
    /// Returns `HandleNotFound` if the handle was never issued or was destroyed.
    pub fn with<R>(&self, handle: Handle, f: impl FnOnce(&T) -> R) -> Result<R, CalcError> {
        let inner = self.read();
        let entry = inner
            .entries
            .get(&handle)
            .ok_or_else(|| self.not_found(handle))?;
        Ok(f(entry))
    }

    /// Run `f` against the object behind `handle`, mutably.
    ///
    /// # Errors
    /// Returns `HandleNotFound` if the handle was never issued or was destroyed.
    pub fn with_mut<R>(&self, handle: Handle, f: impl FnOnce(&mut T) -> R) -> Result<R, CalcError> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(&handle)
            .ok_or_else(|| self.not_found(handle))?;
        Ok(f(entry))
    }

    /// Remove the object behind `handle` and return it.
    ///
    /// # Errors
    /// Returns `HandleNotFound` if the handle was never issued or was destroyed.
    pub fn destroy(&self, handle: Handle) -> Result<T, CalcError> {
        let removed = self
            .write()
            .entries
            .remove(&handle)
            .ok_or_else(|| self.not_found(handle))?;
        tracing::debug!(table = self.label, %handle, "destroyed");
        Ok(removed)
    }

    /// Whether `handle` is live.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.read().entries.contains_key(&handle)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(&self, handle: Handle) -> CalcError {
        tracing::warn!(table = self.label, %handle, "handle not found");
        CalcError::HandleNotFound(handle)
    }
}
