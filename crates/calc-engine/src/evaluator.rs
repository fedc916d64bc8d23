//! Stateless expression evaluation.

use std::sync::Arc;

use calc_core::{Arithmetic, CalcResult, OpTag, WrappingArithmetic};

/// Text returned for an operation tag that could not be recognized.
pub const UNKNOWN_OPERATION: &str = "unknown operation";

/// Evaluates single operations against an [`Arithmetic`] implementation.
pub struct Evaluator<A = WrappingArithmetic> {
    arithmetic: Arc<A>,
}

impl<A> Clone for Evaluator<A> {
    fn clone(&self) -> Self {
        Self {
            arithmetic: Arc::clone(&self.arithmetic),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Arc::new(WrappingArithmetic))
    }
}

impl<A: Arithmetic> Evaluator<A> {
    /// Create an evaluator over shared arithmetic.
    #[must_use]
    pub fn new(arithmetic: Arc<A>) -> Self {
        Self { arithmetic }
    }

    /// Evaluate and describe the result, e.g. `the operation of 1 add 2 = 3`.
    #[must_use]
    pub fn eval_expression(&self, op: OpTag, x: u32, y: u32) -> String {
        let value = self.arithmetic.apply(op, x, y);
        tracing::debug!(%op, x, y, value, "evaluated expression");
        format!("the operation of {x} {op} {y} = {value}")
    }

    /// Evaluate and return a structured record.
    #[must_use]
    pub fn eval_expression_detailed(&self, op: OpTag, x: u32, y: u32) -> CalcResult {
        let value = self.arithmetic.apply(op, x, y);
        tracing::debug!(%op, x, y, value, "evaluated detailed expression");
        CalcResult {
            value,
            op: op.as_str().to_string(),
            x,
            y,
        }
    }

    /// Like [`Self::eval_expression`] for a raw tag from the host.
    ///
    /// Unrecognized tags yield [`UNKNOWN_OPERATION`].
    #[must_use]
    pub fn eval_tag(&self, tag: &str, x: u32, y: u32) -> String {
        match tag.parse::<OpTag>() {
            Ok(op) => self.eval_expression(op, x, y),
            Err(e) => {
                tracing::warn!(tag, "{e}");
                UNKNOWN_OPERATION.to_string()
            }
        }
    }

    /// Like [`Self::eval_expression_detailed`] for a raw tag from the host.
    ///
    /// Unrecognized tags yield [`CalcResult::unknown`].
    #[must_use]
    pub fn eval_tag_detailed(&self, tag: &str, x: u32, y: u32) -> CalcResult {
        match tag.parse::<OpTag>() {
            Ok(op) => self.eval_expression_detailed(op, x, y),
            Err(e) => {
                tracing::warn!(tag, "{e}");
                CalcResult::unknown(x, y)
            }
        }
    }
}
