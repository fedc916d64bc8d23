//! Core building blocks for calculator components.
//!
//! This crate provides:
//! - `OpTag`, `OperationRecord`, `CalcResult` - operation value types
//! - `Arithmetic` - seam for the external add/sub/mul module
//! - `NumberSink` - seam for host callbacks driven by push generators
//! - `Sequence` - resumable fibonacci/squares/primes stepping
//! - Trial-division primality helpers

pub mod op;
pub mod primes;
mod proptests;
pub mod sequence;
pub mod traits;

pub use op::{CalcResult, OpTag, OperationRecord, UnknownOp};
pub use primes::{is_prime, next_prime_at_or_after};
pub use sequence::{Sequence, SequenceKind};
pub use traits::{Arithmetic, CalcError, Handle, NumberSink, WrappingArithmetic};
