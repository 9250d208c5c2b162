//! Error type for expression compilation and request assembly.
//!
//! Every error is raised synchronously at compile time, before anything is
//! sent over the wire. None of them are retryable: the caller has to change
//! the input.

/// Errors produced while compiling or assembling expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// An update contained no actions, so no clause could be produced.
    #[error("update expression has no actions")]
    EmptyUpdate,

    /// A logical group (or a template) contained no sub-conditions.
    #[error("condition group has no sub-conditions")]
    EmptyCondition,

    /// A node is missing a required part or combines parts that the
    /// expression grammar does not allow.
    #[error("malformed expression at '{path}': {reason}")]
    MalformedExpression {
        /// The attribute path the node was attached to.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A request named a secondary index the table does not declare.
    #[error("table '{table}' has no index named '{index}'")]
    UnresolvableIndexReference {
        /// The requested index name.
        index: String,
        /// The table that was searched.
        table: String,
    },

    /// A compiled clause was attached to an operation that cannot carry it.
    #[error("{operation} does not accept a {clause} expression")]
    UnsupportedClause {
        /// The clause kind, e.g. `update`.
        clause: &'static str,
        /// The operation name, e.g. `Query`.
        operation: &'static str,
    },

    /// A compiled expression exceeds the configured size limit.
    #[error("{clause} expression is {length} bytes, limit is {limit}")]
    ExpressionTooLong {
        /// The clause kind.
        clause: &'static str,
        /// Actual length in bytes.
        length: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
}

impl ExpressionError {
    /// Shorthand for a [`ExpressionError::MalformedExpression`].
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedExpression {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience result type for expression operations.
pub type ExpressionResult<T> = Result<T, ExpressionError>;
