//! The exported operation surface of a calculator component.

use std::sync::Arc;

use calc_core::{Arithmetic, CalcError, CalcResult, Handle, OpTag, SequenceKind, WrappingArithmetic};
use calc_engine::Evaluator;

use crate::{SessionManager, StreamManager, StreamKind};

/// Owns all component state and exposes every stateful exported operation.
///
/// One `Calculator` is one component instance: its session and stream
/// tables are independent of any other instance. Push generators hold no
/// state; call [`calc_engine::generate`] directly.
pub struct Calculator<A = WrappingArithmetic> {
    evaluator: Evaluator<A>,
    sessions: SessionManager<A>,
    streams: StreamManager,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(WrappingArithmetic)
    }
}

impl<A: Arithmetic> Calculator<A> {
    /// Create a calculator over the given arithmetic module.
    #[must_use]
    pub fn new(arithmetic: A) -> Self {
        let arithmetic = Arc::new(arithmetic);
        Self {
            evaluator: Evaluator::new(Arc::clone(&arithmetic)),
            sessions: SessionManager::new(arithmetic),
            streams: StreamManager::new(),
        }
    }

    #[must_use]
    pub fn eval_expression(&self, op: OpTag, x: u32, y: u32) -> String {
        self.evaluator.eval_expression(op, x, y)
    }

    #[must_use]
    pub fn eval_expression_detailed(&self, op: OpTag, x: u32, y: u32) -> CalcResult {
        self.evaluator.eval_expression_detailed(op, x, y)
    }

    /// The stateless evaluator, including the raw-tag entry points.
    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator<A> {
        &self.evaluator
    }

    /// Session table.
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager<A> {
        &self.sessions
    }

    /// Stream table.
    #[must_use]
    pub const fn streams(&self) -> &StreamManager {
        &self.streams
    }

    /// `calc-session` constructor.
    ///
    /// # Errors
    /// Returns `HandlesExhausted` if no handle is left.
    pub fn session_new(&self) -> Result<Handle, CalcError> {
        self.sessions.create()
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn session_push_op(&self, handle: Handle, op: OpTag, value: u32) -> Result<(), CalcError> {
        self.sessions.push_op(handle, op, value)
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn session_get_current(&self, handle: Handle) -> Result<u32, CalcError> {
        self.sessions.current(handle)
    }

    /// History rendered as host-facing records.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn session_get_history(&self, handle: Handle) -> Result<Vec<CalcResult>, CalcError> {
        Ok(self
            .sessions
            .history(handle)?
            .into_iter()
            .map(CalcResult::from)
            .collect())
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn session_reset(&self, handle: Handle) -> Result<(), CalcError> {
        self.sessions.reset(handle)
    }

    /// `calc-session` destructor.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn session_drop(&self, handle: Handle) -> Result<(), CalcError> {
        self.sessions.destroy(handle)
    }

    /// `number-stream` constructor.
    ///
    /// # Errors
    /// Returns `HandlesExhausted` if no handle is left.
    pub fn stream_new(&self) -> Result<Handle, CalcError> {
        self.streams.create()
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn stream_start(&self, handle: Handle, kind: SequenceKind) -> Result<(), CalcError> {
        self.streams.start(handle, kind)
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn stream_read(&self, handle: Handle, count: u32) -> Result<Vec<u32>, CalcError> {
        self.streams.read(handle, count)
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn stream_stop(&self, handle: Handle) -> Result<(), CalcError> {
        self.streams.stop(handle)
    }

    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn stream_kind(&self, handle: Handle) -> Result<StreamKind, CalcError> {
        self.streams.kind(handle)
    }

    /// `number-stream` destructor.
    ///
    /// # Errors
    /// Returns `HandleNotFound` for an unknown or destroyed handle.
    pub fn stream_drop(&self, handle: Handle) -> Result<(), CalcError> {
        self.streams.destroy(handle)
    }
}
