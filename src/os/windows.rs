//! Windows translation of the priority and name abstraction.
//!
//! Priority maps onto `SetThreadPriority` with the fixed `THREAD_PRIORITY_*`
//! classes, thread names onto `SetThreadDescription`. The POSIX
//! policy-plus-level model has no Windows representation and is rejected as
//! unsupported.

#![allow(unsafe_code)]

use std::io;
use std::os::windows::io::RawHandle;

use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::System::Threading::{
    GetCurrentThread, SetThreadDescription, SetThreadPriority, THREAD_PRIORITY_ABOVE_NORMAL,
    THREAD_PRIORITY_BELOW_NORMAL, THREAD_PRIORITY_HIGHEST, THREAD_PRIORITY_IDLE,
    THREAD_PRIORITY_LOWEST, THREAD_PRIORITY_NORMAL, THREAD_PRIORITY_TIME_CRITICAL,
};

use super::priority::{Priority, PriorityClass, PriorityError};

fn translate(priority: &Priority) -> Result<i32, PriorityError> {
    let class = match priority.class {
        PriorityClass::Default | PriorityClass::Normal => THREAD_PRIORITY_NORMAL,
        PriorityClass::Idle => THREAD_PRIORITY_IDLE,
        PriorityClass::Lowest => THREAD_PRIORITY_LOWEST,
        PriorityClass::BelowNormal => THREAD_PRIORITY_BELOW_NORMAL,
        PriorityClass::AboveNormal => THREAD_PRIORITY_ABOVE_NORMAL,
        PriorityClass::Highest => THREAD_PRIORITY_HIGHEST,
        PriorityClass::TimeCritical => THREAD_PRIORITY_TIME_CRITICAL,
        class @ (PriorityClass::Batch | PriorityClass::Fifo | PriorityClass::RoundRobin) => {
            return Err(PriorityError::Unsupported { class })
        }
    };
    Ok(class)
}

/// Check that the descriptor is representable on this host, without touching
/// any thread.
pub(super) fn supported(priority: &Priority) -> Result<(), PriorityError> {
    // Class first: a realtime class is unsupported here regardless of level.
    translate(priority)?;
    priority.validate()?;
    Ok(())
}

/// Apply `priority` to a live thread.
pub(super) fn apply_priority(thread: RawHandle, priority: &Priority) -> Result<(), PriorityError> {
    let class = translate(priority)?;
    priority.validate()?;
    let ok = unsafe { SetThreadPriority(thread.cast(), class) };
    if ok == 0 {
        let code = unsafe { GetLastError() };
        return Err(PriorityError::Native { code: code as i32 });
    }
    Ok(())
}

/// Apply `priority` to the calling thread.
pub(super) fn apply_priority_self(priority: &Priority) -> Result<(), PriorityError> {
    let class = translate(priority)?;
    priority.validate()?;
    let ok = unsafe { SetThreadPriority(GetCurrentThread(), class) };
    if ok == 0 {
        let code = unsafe { GetLastError() };
        return Err(PriorityError::Native { code: code as i32 });
    }
    Ok(())
}

/// Retag a live thread's name.
pub(super) fn apply_name(thread: RawHandle, name: &str) -> io::Result<()> {
    let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
    let hresult = unsafe { SetThreadDescription(thread.cast(), wide.as_ptr()) };
    if hresult < 0 {
        return Err(io::Error::from_raw_os_error(hresult));
    }
    Ok(())
}
