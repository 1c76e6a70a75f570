//! Windows-specific subprocess implementation
//!
//! Wraps an already-spawned native child process behind the generic
//! [`subproc_core::Subprocess`] capability. The Win32 calls themselves live
//! behind the [`NativeBridge`] trait; this crate owns the concurrency and
//! lifecycle contract around a single handle.

mod bridge;
mod waiter;
mod windows_subprocess;


pub use bridge::{NativeBridge, NativeHandle, RELEASED_HANDLE};
pub use windows_subprocess::{SubprocessReader, SubprocessStdin, WindowsSubprocess};
