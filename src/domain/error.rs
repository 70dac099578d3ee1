//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent illegal mutations or malformed page descriptions.
/// A mutation that returns one of these has left the arena unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("operation not allowed on root master: {0}")]
    RootMaster(NodeId),

    #[error("node {child} is already attached to parent {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { child: NodeId, parent: NodeId },

    #[error("index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("adding {child} under {parent} would create a cycle")]
    CompositionCycle { child: NodeId, parent: NodeId },

    #[error("node listed more than once as child: {0}")]
    DuplicateChild(NodeId),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("unknown master: {0}")]
    UnknownMaster(String),

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("component defined more than once: {0}")]
    DuplicateName(String),

    #[error("cycle detected in page description at: {0}")]
    CycleDetected(String),

    #[error("invalid page description: {message}")]
    InvalidPage { message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
