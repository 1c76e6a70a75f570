use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

static WAITER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Waiter threads only block in the native wait; 16 KiB is plenty. The OS
/// rounds this up to its minimum where needed.
const WAITER_STACK_SIZE: usize = 16 * 1024;

/// Spawn a detached waiter thread with a process-wide monotonic name,
/// `Windows-Process-Waiter-Thread-<n>`. One such thread exists per live
/// child; the deterministic names keep thread dumps readable.
pub(crate) fn spawn_waiter<F>(body: F) -> io::Result<()>
where
    F: FnOnce() + Send + 'static,
{
    let name = format!(
        "Windows-Process-Waiter-Thread-{}",
        WAITER_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    );
    thread::Builder::new()
        .name(name)
        .stack_size(WAITER_STACK_SIZE)
        .spawn(body)
        .map(|_join_handle| ())
}
