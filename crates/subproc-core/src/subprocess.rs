use std::io::{Read, Write};

use tokio_util::sync::CancellationToken;

use crate::SubprocessResult;

/// Generic capability set for a spawned child process.
///
/// A subprocess owns a live child and exposes byte-stream access to its
/// standard streams plus lifecycle control. Platform crates provide the
/// concrete implementations; callers program against this trait.
pub trait Subprocess: Send + Sync {
    /// Ask the OS to terminate the child. Best-effort: the returned flag is
    /// the native call's success report, and actual exit is observed later
    /// through [`Subprocess::finished`] / [`Subprocess::wait_for`].
    ///
    /// Fails with an illegal-state error once the handle has been released.
    fn destroy(&self) -> SubprocessResult<bool>;

    /// The child's exit code. Does not block; callers are expected to have
    /// awaited completion first. Fails with an illegal-state error if the
    /// handle has been released or the native layer reports an error for
    /// the query.
    fn exit_value(&self) -> SubprocessResult<i32>;

    /// True iff the child has been observed to exit (or the native wait
    /// itself failed). Never blocks and never touches the native handle.
    fn finished(&self) -> bool;

    /// Block until the child has been observed to exit. Safe from any number
    /// of threads concurrently, and returns immediately after completion.
    fn wait_for(&self);

    /// As [`Subprocess::wait_for`], but fails with an interrupted error when
    /// `cancel` is cancelled while waiting. Cancellation leaves the child
    /// and the completion state untouched.
    fn wait_for_interruptible(&self, cancel: &CancellationToken) -> SubprocessResult<()>;

    /// Byte sink feeding the child's stdin. Always available.
    fn stdin(&self) -> Box<dyn Write + Send>;

    /// Byte source draining the child's stdout, or `None` if stdout was
    /// redirected away at construction.
    fn stdout(&self) -> Option<Box<dyn Read + Send>>;

    /// Byte source draining the child's stderr, or `None` if stderr was
    /// redirected away at construction.
    fn stderr(&self) -> Option<Box<dyn Read + Send>>;
}
