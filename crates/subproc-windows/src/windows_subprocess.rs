use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use subproc_core::{
    CancellationToken, CompletionLatch, Subprocess, SubprocessError, SubprocessResult,
};
use tracing::{debug, warn};

use crate::bridge::{NativeBridge, NativeHandle, RELEASED_HANDLE};
use crate::waiter;

/// Routes a source adapter's reads to the matching native endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamKind {
    Out,
    Err,
}

/// State shared between the facade, its stream adapters, and the waiter.
///
/// The handle slot is the serialization point: every native call except the
/// waiter's blocking wait runs while holding it, so the bridge observes a
/// strict serial order of calls per handle.
struct Shared {
    bridge: Arc<dyn NativeBridge>,
    handle: Mutex<NativeHandle>,
    latch: CompletionLatch,
    pid: u32,
}

impl Shared {
    fn lock_handle(&self) -> MutexGuard<'_, NativeHandle> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(handle: NativeHandle) -> SubprocessResult<NativeHandle> {
        if handle == RELEASED_HANDLE {
            Err(SubprocessError::HandleReleased)
        } else {
            Ok(handle)
        }
    }

    fn read_stream(&self, kind: StreamKind, buf: &mut [u8]) -> io::Result<usize> {
        let guard = self.lock_handle();
        let handle = Self::live(*guard)?;

        let count = match kind {
            StreamKind::Out => self.bridge.read_stdout(handle, buf),
            StreamKind::Err => self.bridge.read_stderr(handle, buf),
        };
        if count < 0 {
            return Err(SubprocessError::PipeIo(self.bridge.last_error(handle)).into());
        }

        Ok(count as usize)
    }

    fn write_stream(&self, buf: &[u8]) -> io::Result<()> {
        let guard = self.lock_handle();
        let handle = Self::live(*guard)?;

        // Native writes may be short; keep writing the remaining suffix
        // until the buffer is drained or the bridge reports a failure.
        let mut drained = 0;
        while drained < buf.len() {
            let written = self.bridge.write_stdin(handle, &buf[drained..]);
            if written < 0 {
                return Err(SubprocessError::PipeIo(self.bridge.last_error(handle)).into());
            }
            drained += written as usize;
        }

        Ok(())
    }

    fn release(&self) {
        let mut guard = self.lock_handle();
        if *guard != RELEASED_HANDLE {
            self.bridge.delete(*guard);
            *guard = RELEASED_HANDLE;
            debug!(pid = self.pid, "released native process handle");
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.release();
    }
}

/// A Windows subprocess backed by a native handle.
///
/// Owns an already-spawned child. A dedicated waiter thread blocks on the
/// native wait and fires the completion latch exactly once; all other native
/// calls on the handle are serialized through a per-instance mutex.
pub struct WindowsSubprocess {
    shared: Arc<Shared>,
    stdout_redirected: bool,
    stderr_redirected: bool,
}

impl WindowsSubprocess {
    /// Wrap `handle` and immediately schedule its waiter thread.
    ///
    /// `stdout_redirected` / `stderr_redirected` declare that the stream was
    /// redirected away at spawn time; the matching accessor then returns
    /// `None`. Fails only if the waiter thread cannot be spawned.
    pub fn new(
        bridge: Arc<dyn NativeBridge>,
        handle: NativeHandle,
        stdout_redirected: bool,
        stderr_redirected: bool,
    ) -> SubprocessResult<Self> {
        let pid = bridge.process_pid(handle);
        let shared = Arc::new(Shared {
            bridge,
            handle: Mutex::new(handle),
            latch: CompletionLatch::new(),
            pid,
        });

        // The waiter bypasses the handle mutex: the OS wait primitive is
        // safe to run concurrently with pipe I/O, and taking the lock here
        // would let a blocking read starve completion for the child's whole
        // lifetime. It keeps its own copy of the handle value and an Arc on
        // the shared state, so release cannot outrun a live waiter's Arc.
        let waiter_shared = Arc::clone(&shared);
        waiter::spawn_waiter(move || {
            if !waiter_shared.bridge.wait_for(handle) {
                // The child may still be alive, but observers must make
                // progress; pretend it terminated.
                warn!(pid = waiter_shared.pid, "waiting for process failed");
            }
            waiter_shared.latch.fire();
        })
        .map_err(SubprocessError::WaiterSpawn)?;

        debug!(pid, "wrapped native windows subprocess");
        Ok(Self {
            shared,
            stdout_redirected,
            stderr_redirected,
        })
    }

    /// The child's pid as reported by the bridge at construction.
    pub fn pid(&self) -> u32 {
        self.shared.pid
    }

    /// Deterministically release the native handle. Idempotent; also runs
    /// when the last reference (facade, adapters, waiter) is dropped. After
    /// release every handle-touching operation fails with an illegal-state
    /// error, while `finished` and the waits keep working.
    pub fn release(&self) {
        self.shared.release();
    }
}

impl Subprocess for WindowsSubprocess {
    fn destroy(&self) -> SubprocessResult<bool> {
        let guard = self.shared.lock_handle();
        let handle = Shared::live(*guard)?;

        let terminated = self.shared.bridge.terminate(handle);
        if !terminated {
            warn!(pid = self.shared.pid, "terminate request failed");
        }
        Ok(terminated)
    }

    fn exit_value(&self) -> SubprocessResult<i32> {
        let guard = self.shared.lock_handle();
        let handle = Shared::live(*guard)?;

        let code = self.shared.bridge.exit_code(handle);
        let error = self.shared.bridge.last_error(handle);
        if !error.is_empty() {
            return Err(SubprocessError::ExitCodeUnavailable(error));
        }

        Ok(code)
    }

    fn finished(&self) -> bool {
        self.shared.latch.is_fired()
    }

    fn wait_for(&self) {
        self.shared.latch.wait()
    }

    fn wait_for_interruptible(&self, cancel: &CancellationToken) -> SubprocessResult<()> {
        self.shared.latch.wait_interruptible(cancel)
    }

    fn stdin(&self) -> Box<dyn Write + Send> {
        Box::new(SubprocessStdin {
            shared: Arc::clone(&self.shared),
        })
    }

    fn stdout(&self) -> Option<Box<dyn Read + Send>> {
        if self.stdout_redirected {
            None
        } else {
            Some(Box::new(SubprocessReader {
                shared: Arc::clone(&self.shared),
                kind: StreamKind::Out,
            }))
        }
    }

    fn stderr(&self) -> Option<Box<dyn Read + Send>> {
        if self.stderr_redirected {
            None
        } else {
            Some(Box::new(SubprocessReader {
                shared: Arc::clone(&self.shared),
                kind: StreamKind::Err,
            }))
        }
    }
}

/// Byte sink feeding the stdin of a Windows subprocess.
///
/// Unbuffered: each `write` drains the whole slice through serialized native
/// writes before returning.
pub struct SubprocessStdin {
    shared: Arc<Shared>,
}

impl Write for SubprocessStdin {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.shared.write_stream(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No buffering beyond the OS pipe.
        Ok(())
    }
}

/// Byte source draining the stdout or stderr of a Windows subprocess.
///
/// Each `read` is one native read on the selected endpoint; end of stream is
/// `Ok(0)`, and a native failure surfaces as an error carrying the bridge's
/// last-error string.
pub struct SubprocessReader {
    shared: Arc<Shared>,
    kind: StreamKind,
}

impl Read for SubprocessReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.shared.read_stream(self.kind, buf)
    }
}
