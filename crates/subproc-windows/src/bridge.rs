/// Opaque identifier for one native child process and its pipe endpoints.
///
/// The value is owned by the foreign bridge; this crate only threads it
/// through and never interprets it beyond the released sentinel.
pub type NativeHandle = i64;

/// Slot value stored once the handle has been released.
pub const RELEASED_HANDLE: NativeHandle = -1;

/// Foreign surface wrapping the Win32 process and pipe primitives
/// (`WaitForSingleObject`, `TerminateProcess`, `GetExitCodeProcess`,
/// `ReadFile`, `WriteFile`).
///
/// Contracts relied on by the facade:
/// - `wait_for` blocks until the child exits or the wait itself fails, and
///   is safe to call concurrently with pipe I/O on the same handle;
/// - reads and writes are blocking, may return a short count, and signal
///   failure by returning -1 after populating the per-handle last-error;
/// - `delete` invalidates the handle and is called at most once.
///
/// Implementations must be `Send + Sync`: the waiter thread and caller
/// threads share one bridge.
pub trait NativeBridge: Send + Sync {
    /// Block until the child exits. Returns false if the wait itself failed.
    fn wait_for(&self, handle: NativeHandle) -> bool;

    /// The child's pid, for diagnostics.
    fn process_pid(&self, handle: NativeHandle) -> u32;

    /// Ask the OS to terminate the child. Returns the native success flag.
    fn terminate(&self, handle: NativeHandle) -> bool;

    /// The child's exit code. OS-defined if the child is still running.
    fn exit_code(&self, handle: NativeHandle) -> i32;

    /// The most recent OS-level failure recorded for this handle; empty
    /// means no error.
    fn last_error(&self, handle: NativeHandle) -> String;

    /// Read from the child's stdout into `buf`. Non-negative is a byte
    /// count (0 at end of stream), -1 is a failure.
    fn read_stdout(&self, handle: NativeHandle, buf: &mut [u8]) -> isize;

    /// Read from the child's stderr into `buf`, same contract as
    /// [`NativeBridge::read_stdout`].
    fn read_stderr(&self, handle: NativeHandle, buf: &mut [u8]) -> isize;

    /// Write `buf` to the child's stdin. Non-negative is the count actually
    /// written (possibly short), -1 is a failure.
    fn write_stdin(&self, handle: NativeHandle, buf: &[u8]) -> isize;

    /// Release the native resources behind `handle`.
    fn delete(&self, handle: NativeHandle);
}
