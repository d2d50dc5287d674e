//! ## Errors for the spatial index
//!
//! This module defines the error type returned by fallible operations on [`crate::tree::Tree`].

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents errors specific to invalid operations or parameters on the index.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Occurs when a constructor or query argument is out of range (non-positive dimension,
    /// non-positive bucket size, non-positive radius, or a mismatched coordinate count).
    InvalidArgument {
        /// Human-readable description of which argument was invalid and why.
        message: String,
    },
    /// Occurs when a result buffer or internal structure cannot grow to hold more elements.
    OutOfMemory {
        /// The number of additional elements that could not be allocated.
        requested: usize,
    },
    /// Occurs when a query is issued before `set_data` has built a tree.
    Uninitialized,
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::InvalidArgument { message } => {
                write!(f, "invalid argument: {message}")
            }
            IndexError::OutOfMemory { requested } => {
                write!(f, "out of memory: failed to allocate {requested} more element(s)")
            }
            IndexError::Uninitialized => {
                write!(f, "query issued before set_data built a tree")
            }
        }
    }
}

impl Error for IndexError {}

impl IndexError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        IndexError::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = IndexError::invalid("radius must be positive");
        assert_eq!(
            format!("{}", err),
            "invalid argument: radius must be positive"
        );
    }

    #[test]
    fn test_out_of_memory_display() {
        let err = IndexError::OutOfMemory { requested: 4 };
        assert_eq!(
            format!("{}", err),
            "out of memory: failed to allocate 4 more element(s)"
        );
    }

    #[test]
    fn test_uninitialized_display() {
        assert_eq!(
            format!("{}", IndexError::Uninitialized),
            "query issued before set_data built a tree"
        );
    }
}
