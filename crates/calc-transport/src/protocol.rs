//! Wire protocol between a host and a calculator component.

use calc_core::{CalcError, CalcResult, Handle, OpTag};
use serde::{Deserialize, Serialize};

/// Protocol error.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Message from host to component.
///
/// Evaluator ops carry the tag as raw text so an unknown tag degrades to a
/// sentinel instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    EvalExpression { op: String, x: u32, y: u32 },
    EvalExpressionDetailed { op: String, x: u32, y: u32 },
    GenerateFibonacci { max_count: u32 },
    GenerateSquares { max_count: u32 },
    GeneratePrimes { max_count: u32 },
    SessionCreate,
    SessionPushOp { handle: Handle, op: OpTag, value: u32 },
    SessionGetCurrent { handle: Handle },
    SessionGetHistory { handle: Handle },
    SessionReset { handle: Handle },
    SessionDestroy { handle: Handle },
    StreamCreate,
    StreamStartFibonacci { handle: Handle },
    StreamStartSquares { handle: Handle },
    StreamStartPrimes { handle: Handle },
    StreamRead { handle: Handle, count: u32 },
    StreamStop { handle: Handle },
    StreamDestroy { handle: Handle },
    /// Keepalive.
    Ping,
}

impl Request {
    /// Decode a request from JSON text.
    ///
    /// # Errors
    /// Returns error if the text is not a valid request.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Error category reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    HandleNotFound,
    HandlesExhausted,
    InvalidRequest,
}

/// Message from component to host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Result of `eval_expression`.
    Text { value: String },
    /// Result of `eval_expression_detailed`.
    Detailed { result: CalcResult },
    /// One value from a generator.
    Number { value: u32 },
    /// Generator finished.
    Done,
    /// Newly created session or stream.
    Handle { handle: Handle },
    Current { value: u32 },
    History { entries: Vec<CalcResult> },
    Numbers { values: Vec<u32> },
    /// Operation completed with no result.
    Ack,
    Error { kind: ErrorKind, message: String },
    Pong,
}

impl Response {
    /// Error response for a request that could not be decoded.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::Error {
            kind: ErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    /// Encode as JSON text.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<CalcError> for Response {
    fn from(err: CalcError) -> Self {
        let kind = match err {
            CalcError::HandleNotFound(_) => ErrorKind::HandleNotFound,
            CalcError::HandlesExhausted => ErrorKind::HandlesExhausted,
        };
        Self::Error {
            kind,
            message: err.to_string(),
        }
    }
}
