//! Stateful calculator resources.
//!
//! Provides:
//! - `HandleTable` - lock-guarded, never-reusing handle table
//! - `SessionManager` - accumulating calculator sessions
//! - `StreamManager` - resumable number streams
//! - `Calculator` - one component instance exposing every exported operation

pub mod calculator;
pub mod manager;
pub mod stream;
pub mod table;

pub use calculator::Calculator;
pub use manager::{Session, SessionManager};
pub use stream::{Stream, StreamKind, StreamManager};
pub use table::HandleTable;
