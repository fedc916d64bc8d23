//! Core traits and identifiers shared by every component.

use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::OpTag;

/// Opaque identifier of a live session or stream.
///
/// Never zero. Values come from a per-table counter and are not reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Wrap a raw value received from the host. Zero is never a handle.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Raw value handed to the host.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl From<NonZeroU32> for Handle {
    fn from(n: NonZeroU32) -> Self {
        Self(n)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced by handle-based operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("handle not found: {0}")]
    HandleNotFound(Handle),
    #[error("handle space exhausted")]
    HandlesExhausted,
}

/// Arithmetic primitives supplied by an external module.
pub trait Arithmetic: Send + Sync {
    /// `x + y`.
    fn add(&self, x: u32, y: u32) -> u32;

    /// `x - y`.
    fn sub(&self, x: u32, y: u32) -> u32;

    /// `x * y`.
    fn mul(&self, x: u32, y: u32) -> u32;

    /// Dispatch on an operation tag.
    fn apply(&self, op: OpTag, x: u32, y: u32) -> u32 {
        match op {
            OpTag::Add => self.add(x, y),
            OpTag::Sub => self.sub(x, y),
            OpTag::Mul => self.mul(x, y),
        }
    }
}

/// Two's-complement arithmetic over `u32`, matching the stock adder component.
#[derive(Debug, Default, Clone, Copy)]
pub struct WrappingArithmetic;

impl Arithmetic for WrappingArithmetic {
    fn add(&self, x: u32, y: u32) -> u32 {
        x.wrapping_add(y)
    }

    fn sub(&self, x: u32, y: u32) -> u32 {
        x.wrapping_sub(y)
    }

    fn mul(&self, x: u32, y: u32) -> u32 {
        x.wrapping_mul(y)
    }
}

/// Receiver of values produced by a push generator.
///
/// Implement this to forward numbers to the host. The generator decides
/// when to stop; the sink can only ask it to stop early.
pub trait NumberSink {
    /// Accept one value. Return `false` to request early termination.
    fn on_number(&mut self, value: u32) -> bool;

    /// Called exactly once after the last value, on every path.
    fn on_done(&mut self);
}

impl<S: NumberSink + ?Sized> NumberSink for &mut S {
    fn on_number(&mut self, value: u32) -> bool {
        (**self).on_number(value)
    }

    fn on_done(&mut self) {
        (**self).on_done();
    }
}
