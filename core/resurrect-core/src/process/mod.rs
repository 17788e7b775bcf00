//! Process table capture, tree walks and liveness probing.

mod snapshot;
mod tree;

pub use snapshot::{ProcessRecord, ProcessSnapshot, ProcessSource, SystemProcessSource};
pub use tree::Detection;

/// True if `pid` names a live process.
///
/// `EPERM` means the process exists but belongs to another user, which still
/// counts as alive.
pub fn is_pid_alive(pid: u32) -> bool {
    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }

    #[cfg(unix)]
    {
        // SAFETY: kill with signal 0 performs only the existence and permission
        // check; no signal is delivered.
        #[allow(unsafe_code)]
        let rc = unsafe { libc::kill(pid as i32, 0) };
        rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }
    #[cfg(not(unix))]
    {
        false
    }
}
