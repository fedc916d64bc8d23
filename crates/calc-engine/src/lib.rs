//! Stateless calculator operations.
//!
//! Provides:
//! - `Evaluator` - single-expression evaluation over an `Arithmetic`
//! - Push generators for fibonacci, squares and primes
//! - Stock sinks for driving generators in-process

pub mod evaluator;
pub mod generators;
pub mod sinks;

pub use evaluator::{Evaluator, UNKNOWN_OPERATION};
pub use generators::{
    GenerateOutcome, generate, generate_fibonacci, generate_primes, generate_squares,
};
pub use sinks::{CollectSink, FnSink};
