//! Process-group termination.
//!
//! Provisioners fork SSH connections and helper processes; stopping only the
//! direct child would leave those running. Runs are spawned as leaders of their
//! own process group and are stopped by signalling the whole group.

/// Send SIGTERM to every process in the group led by `pgid`.
///
/// Failures are logged and swallowed. ESRCH means the group already exited.
#[cfg(unix)]
pub fn terminate_group(pgid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        tracing::warn!(pgid, "Process group id out of range, not signalling");
        return;
    };

    match killpg(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => tracing::info!(pgid, "Sent SIGTERM to process group"),
        Err(Errno::ESRCH) => tracing::debug!(pgid, "Process group already gone"),
        Err(e) => tracing::warn!(pgid, error = %e, "Failed to signal process group"),
    }
}

#[cfg(not(unix))]
pub fn terminate_group(pgid: u32) {
    tracing::warn!(pgid, "Process group termination is not supported on this platform");
}
