//! Error types for fixed-point bound tightening.

use thiserror::Error;

/// Errors that can occur while evaluating a node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FbbtError {
    /// A row carries a sense code other than L, E, G or R.
    #[error("Constraint {row} has undefined sense {sense:?}")]
    Configuration {
        /// Row index in the node relaxation.
        row: usize,
        /// Sense code as supplied by the host.
        sense: char,
    },

    /// The host could not fit the node's row matrix in the requested space.
    #[error("Not enough room to fetch node rows: {required} nonzeros, capacity {capacity}")]
    Capacity {
        /// Nonzeros the host actually holds.
        required: usize,
        /// Nonzeros the evaluator asked for.
        capacity: usize,
    },

    /// Node data is inconsistent (dimension mismatch, bad index).
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The LP engine refused a call.
    #[error("LP engine failed: {0}")]
    Engine(String),

    /// The host refused a bound cut.
    #[error("Cut rejected by host: {0}")]
    CutRejected(String),
}

impl FbbtError {
    /// Returns true for errors the host must treat as fatal to the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FbbtError::Configuration { .. } | FbbtError::Capacity { .. })
    }
}

/// Result type for bound tightening operations.
pub type FbbtResult<T> = Result<T, FbbtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(FbbtError::Configuration { row: 3, sense: 'X' }.is_fatal());
        assert!(FbbtError::Capacity { required: 10, capacity: 4 }.is_fatal());
        assert!(!FbbtError::Engine("boom".into()).is_fatal());
        assert!(!FbbtError::CutRejected("full".into()).is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = FbbtError::Configuration { row: 7, sense: 'Q' };
        assert_eq!(err.to_string(), "Constraint 7 has undefined sense 'Q'");
    }
}
