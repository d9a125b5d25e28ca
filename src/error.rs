//! Error types for the virtual tree core.
//!
//! Structural errors (`PathOutsideRoot`, `StaleNavigation`) are recovered by
//! the callers with a safe fallback: root widening and navigation clamping.
//! Move legality is a boolean decision; `InvalidMoveTarget` only appears when
//! a rejected move is explicitly executed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A record path does not start with the common root
    #[error("path {path} is outside the common root '{root}'")]
    PathOutsideRoot { path: String, root: String },

    /// A navigation segment no longer exists in the tree
    #[error("folder '{segment}' at depth {depth} no longer exists")]
    StaleNavigation { segment: String, depth: usize },

    /// A move or copy destination was rejected by the validator
    #[error("cannot move or copy selection into {destination}")]
    InvalidMoveTarget { destination: String },

    /// A path that matches no folder or leaf in the tree
    #[error("no folder or file in the collection at {path}")]
    UnknownItem { path: String },
}
