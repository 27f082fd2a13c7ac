//! Target implementations

pub mod console;
pub mod file;
pub mod memory;
pub mod path_locks;
pub mod worker;

/// Largest queue or ring capacity a target accepts
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

pub use console::{ConsoleTarget, ConsoleTargetBuilder, DEFAULT_CONSOLE_CAPACITY};
pub use file::{FileTarget, FileTargetBuilder, DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL};
pub use memory::{MemoryTarget, DEFAULT_MEMORY_CAPACITY};
pub use worker::CancellationSignal;

// Re-export the trait alongside its implementations
pub use crate::core::Target;
