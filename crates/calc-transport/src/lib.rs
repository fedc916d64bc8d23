//! Transport layer for calculator hosts.
//!
//! Provides:
//! - Wire protocol (JSON, one message per request/response)
//! - `Connection` - dispatch with per-connection handle ownership
//! - `HostConfig` - host settings
//! - WebSocket transport (feature: websocket)

pub mod config;
pub mod dispatch;
pub mod protocol;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use config::{ConfigError, HostConfig};
pub use dispatch::Connection;
pub use protocol::{ErrorKind, ProtocolError, Request, Response};
