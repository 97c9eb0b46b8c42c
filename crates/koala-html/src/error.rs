//! Error types and recorded parse issues.

use serde::Serialize;
use thiserror::Error;

/// Errors that stop tree construction.
///
/// Ordinary parse errors never show up here: the tree builder records them
/// as [`ParseIssue`]s and applies the recovery rule instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeBuilderError {
    /// The document cannot be represented as an XML 1.0 infoset and the
    /// builder was configured with [`NamePolicy::Fatal`](crate::NamePolicy::Fatal).
    #[error("fatal at token {token_index}: {message}")]
    Fatal {
        /// Human-readable description.
        message: String,
        /// Index of the token being processed.
        token_index: usize,
    },

    /// An internal invariant of the tree builder did not hold.
    #[error("tree builder invariant violated: {0}")]
    Invariant(&'static str),
}

/// A parse error or warning recorded while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    /// Human-readable description of the issue.
    pub message: String,
    /// Index of the token being processed when the issue was detected.
    pub token_index: usize,
    /// True for parse errors, false for warnings.
    pub is_error: bool,
}
