//! Subproc Core - Platform-independent subprocess capability surface
//!
//! This crate provides the generic subprocess trait, the error taxonomy,
//! and the completion latch that are shared across platform-specific
//! implementations.

mod error;
mod latch;
mod subprocess;

pub use error::*;
pub use latch::*;
pub use subprocess::*;

// Re-export the interruption handle callers pass to interruptible waits.
pub use tokio_util::sync::CancellationToken;
