//! Frame graph error types.
//!
//! Every error here is fatal to the current frame: the caller decides whether
//! to abort, fall back to a simpler configuration, or terminate. Nothing is
//! retried internally because replaying a malformed plan reproduces the same
//! error deterministically.

use thiserror::Error;

use crate::binding::ImageLayout;

/// Errors raised while declaring, planning, or executing a frame graph.
#[derive(Error, Debug)]
pub enum FrameGraphError {
    /// Two nodes were declared with the same id; a caller bug.
    #[error("duplicate node id '{0}' declared in graph")]
    DuplicateNodeId(String),
    /// A declared node has no execute callback in the plan.
    #[error("no execute callback registered for node '{0}'")]
    MissingCallback(String),
    /// A logical resource name has no entry in the binding table.
    #[error("resource '{0}' is not bound")]
    ResourceNotBound(String),
    /// The tracked layout of a resource disagrees with what a barrier expects.
    ///
    /// This is the system's primary self-check: it catches planner/executor
    /// desynchronization, stale bindings, and out-of-order execution before
    /// they corrupt a frame.
    #[error("layout mismatch on resource '{resource}': expected {expected:?}, found {actual:?}")]
    LayoutMismatch {
        resource: String,
        expected: ImageLayout,
        actual: ImageLayout,
    },
    /// A barrier's destination access does not belong to any node in the plan.
    #[error("barrier destination '{0}' does not match any node in the plan")]
    DanglingBarrier(String),
    /// A pass callback reported a failure.
    #[error("pass '{node}' failed: {message}")]
    PassFailed { node: String, message: String },
    /// Backend-level failure while recording a barrier or transition.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience alias used throughout the crate.
pub type GraphResult<T> = Result<T, FrameGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameGraphError::DuplicateNodeId("shadow:cascade#0".to_string());
        assert_eq!(
            err.to_string(),
            "duplicate node id 'shadow:cascade#0' declared in graph"
        );

        let err = FrameGraphError::LayoutMismatch {
            resource: "scene_color".to_string(),
            expected: ImageLayout::ShaderReadOnly,
            actual: ImageLayout::ColorAttachment,
        };
        assert!(err.to_string().contains("scene_color"));
        assert!(err.to_string().contains("ShaderReadOnly"));
        assert!(err.to_string().contains("ColorAttachment"));
    }
}
