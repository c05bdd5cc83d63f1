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

use std::time::Duration;

use super::{Interrupted, TickSource, Timebase};

/// Frame caps at or above this value are rejected by [`Clock::tick_capped`].
pub const MAX_TICK_CAP: Duration = Duration::from_secs(60);

/// Upper bound on re-sleeps after early wake-ups within one capped tick.
const MAX_RESLEEPS: u32 = 16;

/// Errors returned by [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The requested frame cap is too long to be a frame cap.
    #[error("frame cap {cap:?} must be below {max:?}", max = MAX_TICK_CAP)]
    CapTooLarge {
        /// The rejected cap.
        cap: Duration,
    },
}

/// The outcome of [`Clock::tick_capped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Time since the previous rebase, sleep included.
    pub elapsed: Duration,
    /// Set when a signal cut the sleep short, holding what was left of it.
    pub interrupted: Option<Duration>,
}

/// A monotonic clock measuring time between rebases.
///
/// The timebase is queried from the source once, at construction.
#[derive(Debug)]
pub struct Clock<S: TickSource> {
    source: S,
    timebase: Timebase,
    last_sample: u64,
}

impl<S: TickSource> Clock<S> {
    /// Starts a clock rebased at the source's current tick.
    pub fn new(source: S) -> Self {
        let timebase = source.timebase();
        let last_sample = source.now();
        Self {
            source,
            timebase,
            last_sample,
        }
    }

    /// The tick source driving this clock.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Time since the last rebase. Does not rebase.
    pub fn peek(&self) -> Duration {
        self.since_last(self.source.now())
    }

    /// Returns the time since the last rebase and rebases.
    pub fn tick(&mut self) -> Duration {
        let now = self.source.now();
        let elapsed = self.since_last(now);
        self.last_sample = now;
        elapsed
    }

    /// Like [`Clock::tick`], but first sleeps until at least `cap` has elapsed.
    ///
    /// A sleep that wakes early without being interrupted is resumed for the
    /// remainder. An interrupted sleep is not resumed: the tick returns right
    /// away with the remaining duration in [`Tick::interrupted`].
    ///
    /// # Errors
    /// [`ClockError::CapTooLarge`] if `cap` is [`MAX_TICK_CAP`] or more.
    pub fn tick_capped(&mut self, cap: Duration) -> Result<Tick, ClockError> {
        if cap >= MAX_TICK_CAP {
            return Err(ClockError::CapTooLarge { cap });
        }

        let mut now = self.source.now();
        let mut elapsed = self.since_last(now);
        let mut interrupted = None;
        let mut attempts = 0;

        while elapsed < cap && attempts < MAX_RESLEEPS {
            attempts += 1;
            let result = self.source.sleep(cap - elapsed);
            now = self.source.now();
            elapsed = self.since_last(now);
            if let Err(Interrupted { remaining }) = result {
                interrupted = Some(remaining);
                break;
            }
        }

        if elapsed < cap && interrupted.is_none() {
            log::trace!("Tick source woke early {attempts} times; frame ran {elapsed:?} of {cap:?}");
        }

        self.last_sample = now;
        Ok(Tick {
            elapsed,
            interrupted,
        })
    }

    /// Whether at least `duration` has passed since the last rebase.
    ///
    /// Rebases only when returning `true`, so it fires once per threshold
    /// crossing.
    pub fn timer(&mut self, duration: Duration) -> bool {
        let now = self.source.now();
        if self.since_last(now) >= duration {
            self.last_sample = now;
            true
        } else {
            false
        }
    }

    fn since_last(&self, now: u64) -> Duration {
        self.timebase
            .ticks_to_duration(now.saturating_sub(self.last_sample))
    }
}
