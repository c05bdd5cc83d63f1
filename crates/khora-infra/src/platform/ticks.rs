// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The system monotonic tick source.

use std::time::Duration;

use khora_core::time::{Interrupted, TickSource, Timebase};

/// Reads the OS monotonic clock and sleeps the calling thread.
///
/// On Unix this is `CLOCK_MONOTONIC` and `nanosleep`, which reports how much
/// of a sleep was left when a signal woke the thread. Elsewhere it falls back
/// to [`std::time::Instant`] and [`std::thread::sleep`], which never report
/// an interruption.
#[derive(Debug, Clone)]
pub struct SystemTicks {
    #[cfg(not(unix))]
    origin: std::time::Instant,
}

impl SystemTicks {
    /// Creates the tick source.
    pub fn new() -> Self {
        Self {
            #[cfg(not(unix))]
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl TickSource for SystemTicks {
    fn now(&self) -> u64 {
        // SAFETY: `timespec` is plain old data; all-zero is a valid value.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: `ts` is a valid out-pointer for the duration of the call.
        // CLOCK_MONOTONIC is always available, so the call cannot fail.
        unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
    }

    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }

    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        // SAFETY: as above.
        let mut request: libc::timespec = unsafe { std::mem::zeroed() };
        request.tv_sec = duration.as_secs() as libc::time_t;
        request.tv_nsec = duration.subsec_nanos() as libc::c_long;
        // SAFETY: as above.
        let mut remaining: libc::timespec = unsafe { std::mem::zeroed() };

        // SAFETY: both pointers are valid for the duration of the call.
        if unsafe { libc::nanosleep(&request, &mut remaining) } == 0 {
            return Ok(());
        }

        let error = std::io::Error::last_os_error();
        if error.raw_os_error() == Some(libc::EINTR) {
            return Err(Interrupted {
                remaining: Duration::new(remaining.tv_sec as u64, remaining.tv_nsec as u32),
            });
        }
        log::debug!("nanosleep failed: {error}");
        Ok(())
    }
}

#[cfg(not(unix))]
impl TickSource for SystemTicks {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }

    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        std::thread::sleep(duration);
        Ok(())
    }
}
