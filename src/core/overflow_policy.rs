//! Backpressure policies for target queues
//!
//! Each target type has a fixed policy describing what happens when its
//! queue is full.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a target does with a new event when its queue is full
///
/// # Example
///
/// ```
/// use rust_log_pipeline::OverflowPolicy;
///
/// assert!(OverflowPolicy::Unbounded.is_lossless());
/// assert!(!OverflowPolicy::DropNewest.is_lossless());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Discard the incoming event; the producer never waits
    ///
    /// Used by the console target.
    DropNewest,

    /// Evict the oldest stored event to make room
    ///
    /// Used by the memory target's ring buffer.
    DropOldest,

    /// Never drop; the queue grows without bound
    ///
    /// Used by the file target. Memory growth is the accepted cost.
    Unbounded,
}

impl OverflowPolicy {
    pub fn is_lossless(&self) -> bool {
        matches!(self, OverflowPolicy::Unbounded)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::Unbounded => write!(f, "Unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_policy_display() {
        assert_eq!(OverflowPolicy::DropNewest.to_string(), "DropNewest");
        assert_eq!(OverflowPolicy::DropOldest.to_string(), "DropOldest");
        assert_eq!(OverflowPolicy::Unbounded.to_string(), "Unbounded");
    }
}
