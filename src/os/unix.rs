//! POSIX translation of the priority and name abstraction.
//!
//! Priority maps onto `pthread_setschedparam` (policy + `sched_param`),
//! thread names onto `pthread_setname_np`. The Windows-family fixed classes
//! have no POSIX representation and are rejected as unsupported.

#![allow(unsafe_code)]

use std::io;
use std::os::unix::thread::RawPthread;

use super::priority::{Priority, PriorityClass, PriorityError};

/// Longest thread name the kernel accepts, excluding the NUL terminator.
#[cfg(target_os = "linux")]
const TASK_NAME_LEN: usize = 15;

fn translate(priority: &Priority) -> Result<(libc::c_int, libc::c_int), PriorityError> {
    let policy = match priority.class {
        PriorityClass::Default | PriorityClass::Normal => libc::SCHED_OTHER,
        PriorityClass::Fifo => libc::SCHED_FIFO,
        PriorityClass::RoundRobin => libc::SCHED_RR,
        #[cfg(target_os = "linux")]
        PriorityClass::Idle => libc::SCHED_IDLE,
        #[cfg(target_os = "linux")]
        PriorityClass::Batch => libc::SCHED_BATCH,
        class => return Err(PriorityError::Unsupported { class }),
    };
    Ok((policy, libc::c_int::from(priority.level)))
}

/// Check that the descriptor is representable on this host, without touching
/// any thread.
pub(super) fn supported(priority: &Priority) -> Result<(), PriorityError> {
    priority.validate()?;
    translate(priority).map(|_| ())
}

/// Apply `priority` to a live thread.
pub(super) fn apply_priority(
    thread: RawPthread,
    priority: &Priority,
) -> Result<(), PriorityError> {
    priority.validate()?;
    let (policy, level) = translate(priority)?;
    let param = libc::sched_param {
        sched_priority: level,
    };
    let code = unsafe { libc::pthread_setschedparam(thread, policy, &param) };
    if code != 0 {
        return Err(PriorityError::Native { code });
    }
    Ok(())
}

/// Apply `priority` to the calling thread.
pub(super) fn apply_priority_self(priority: &Priority) -> Result<(), PriorityError> {
    apply_priority(unsafe { libc::pthread_self() }, priority)
}

/// Retag a live thread's name. Names longer than the kernel limit are
/// truncated at a byte boundary.
#[cfg(target_os = "linux")]
pub(super) fn apply_name(thread: RawPthread, name: &str) -> io::Result<()> {
    let bytes = name.as_bytes();
    let truncated = &bytes[..bytes.len().min(TASK_NAME_LEN)];
    let cname = std::ffi::CString::new(truncated.to_vec())
        .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    let code = unsafe { libc::pthread_setname_np(thread, cname.as_ptr()) };
    if code != 0 {
        return Err(io::Error::from_raw_os_error(code));
    }
    Ok(())
}

/// Retagging another thread's name is not available on this host.
#[cfg(not(target_os = "linux"))]
pub(super) fn apply_name(_thread: RawPthread, _name: &str) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}
