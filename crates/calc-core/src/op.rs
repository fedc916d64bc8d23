//! Operation tags and result records.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Arithmetic operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpTag {
    Add,
    Sub,
    Mul,
}

impl OpTag {
    /// All tags, in declaration order.
    pub const ALL: [Self; 3] = [Self::Add, Self::Sub, Self::Mul];

    /// Lowercase name used on the wire and in history records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
        }
    }
}

impl fmt::Display for OpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name an [`OpTag`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation: {0}")]
pub struct UnknownOp(pub String);

impl FromStr for OpTag {
    type Err = UnknownOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "sub" => Ok(Self::Sub),
            "mul" => Ok(Self::Mul),
            other => Err(UnknownOp(other.to_string())),
        }
    }
}

/// One applied operation inside a session history.
///
/// `x` is the accumulator before the operation, `y` the operand applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub op: OpTag,
    pub x: u32,
    pub y: u32,
    pub value: u32,
}

/// Result record as exposed across the host boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcResult {
    pub value: u32,
    pub op: String,
    pub x: u32,
    pub y: u32,
}

impl CalcResult {
    /// Op name carried by [`CalcResult::unknown`].
    pub const UNKNOWN_OP: &'static str = "unknown";

    /// Sentinel record for an operation tag that could not be recognized.
    #[must_use]
    pub fn unknown(x: u32, y: u32) -> Self {
        Self {
            value: 0,
            op: Self::UNKNOWN_OP.to_string(),
            x,
            y,
        }
    }

    /// Whether this is the unknown-operation sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.op == Self::UNKNOWN_OP
    }
}

impl From<OperationRecord> for CalcResult {
    fn from(record: OperationRecord) -> Self {
        Self {
            value: record.value,
            op: record.op.as_str().to_string(),
            x: record.x,
            y: record.y,
        }
    }
}
