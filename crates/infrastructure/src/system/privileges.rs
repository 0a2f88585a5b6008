/// Whether the process runs with administrative rights. `None` where it
/// cannot be told without spawning a process.
pub fn is_elevated() -> Option<bool> {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        Some(unsafe { libc::geteuid() } == 0)
    }
    #[cfg(not(unix))]
    {
        None
    }
}
