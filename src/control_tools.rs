// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains helpers to prepare the control thread for real-time operation.
use std::path::Path;

use crate::exception::{ControllerException, ControllerResult};

/// Determines whether the current OS kernel is a realtime kernel.
///
/// On Linux, this checks for the existence of `/sys/kernel/realtime`.
pub fn has_realtime_kernel() -> bool {
    Path::new("/sys/kernel/realtime").exists()
}

fn realtime_exception(message: &str) -> ControllerException {
    ControllerException::RealTimeException {
        message: format!("franka-hw-test: {}", message),
    }
}

/// Sets the current thread to the highest possible scheduler priority and locks the memory
/// of the process.
///
/// # Errors
/// * RealTimeException if realtime priority cannot be set for the current thread.
///
/// If the method returns an Error please check your /etc/security/limits.conf file
/// There should be a line like this:
/// ```text
///marco            -       rtprio          99
/// ```
pub fn set_current_thread_to_highest_scheduler_priority() -> ControllerResult<()> {
    unsafe {
        let max_priority = libc::sched_get_priority_max(libc::SCHED_FIFO);
        if max_priority == -1 {
            return Err(realtime_exception(
                "unable to get maximum possible thread priority",
            ));
        }
        // one below the maximum, leaving the top priority to kernel threads
        let thread_param = libc::sched_param {
            sched_priority: max_priority - 1,
        };
        if libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &thread_param) != 0 {
            return Err(realtime_exception("unable to set realtime scheduling"));
        }
        if libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) != 0 {
            return Err(realtime_exception("unable to lock memory"));
        }
    }
    Ok(())
}
