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

//! Raw tick sources and their conversion to wall-clock units.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fixed-point ratio converting raw ticks to nanoseconds: `ns = ticks * numer / denom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timebase {
    /// Numerator of the ratio.
    pub numer: u32,
    /// Denominator of the ratio. Never zero.
    pub denom: u32,
}

impl Timebase {
    /// One tick per nanosecond.
    pub const NANOS: Timebase = Timebase { numer: 1, denom: 1 };

    /// Builds a timebase. Returns `None` for a zero numerator or denominator.
    pub fn new(numer: u32, denom: u32) -> Option<Self> {
        (numer != 0 && denom != 0).then_some(Self { numer, denom })
    }

    /// Converts a tick count to nanoseconds without intermediate overflow.
    #[inline]
    pub fn ticks_to_nanos(&self, ticks: u64) -> u128 {
        ticks as u128 * self.numer as u128 / self.denom as u128
    }

    /// Converts a tick count to a [`Duration`].
    pub fn ticks_to_duration(&self, ticks: u64) -> Duration {
        let nanos = self.ticks_to_nanos(ticks);
        let secs = (nanos / NANOS_PER_SEC).min(u64::MAX as u128) as u64;
        Duration::new(secs, (nanos % NANOS_PER_SEC) as u32)
    }

    /// Converts a [`Duration`] to ticks, saturating at `u64::MAX`.
    pub fn duration_to_ticks(&self, duration: Duration) -> u64 {
        let ticks = duration.as_nanos() * self.denom as u128 / self.numer as u128;
        ticks.min(u64::MAX as u128) as u64
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Self::NANOS
    }
}

/// A sleep that was cut short by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sleep interrupted with {remaining:?} remaining")]
pub struct Interrupted {
    /// How much of the requested sleep was left.
    pub remaining: Duration,
}

/// A monotonic counter plus the ability to block the calling thread.
pub trait TickSource {
    /// The current raw tick count. Never decreases.
    fn now(&self) -> u64;

    /// How raw ticks map to nanoseconds. Queried once by each [`Clock`](super::Clock).
    fn timebase(&self) -> Timebase;

    /// Blocks for about `duration`.
    ///
    /// Returning `Ok` does not guarantee the full duration passed; callers
    /// that need a lower bound re-check [`TickSource::now`].
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted>;
}

impl<S: TickSource + ?Sized> TickSource for &S {
    fn now(&self) -> u64 {
        (**self).now()
    }

    fn timebase(&self) -> Timebase {
        (**self).timebase()
    }

    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        (**self).sleep(duration)
    }
}

const NO_INTERRUPT: u64 = u64::MAX;

#[derive(Debug)]
struct ManualState {
    now: AtomicU64,
    slept: AtomicU64,
    interrupt_after: AtomicU64,
    short_sleep: AtomicU64,
}

/// A deterministic tick source driven by hand. Ticks are nanoseconds.
///
/// Sleeping advances the counter instantly instead of blocking. Clones share
/// the same counter, so a test can keep one handle while a [`Clock`](super::Clock)
/// owns another.
#[derive(Debug, Clone)]
pub struct ManualTicks {
    state: Arc<ManualState>,
}

impl ManualTicks {
    /// A source starting at tick zero.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ManualState {
                now: AtomicU64::new(0),
                slept: AtomicU64::new(0),
                interrupt_after: AtomicU64::new(NO_INTERRUPT),
                short_sleep: AtomicU64::new(NO_INTERRUPT),
            }),
        }
    }

    /// Moves time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.state
            .now
            .fetch_add(Timebase::NANOS.duration_to_ticks(duration), Ordering::SeqCst);
    }

    /// Makes the next sleep return [`Interrupted`] after only `after` has passed.
    pub fn interrupt_next_sleep(&self, after: Duration) {
        self.state
            .interrupt_after
            .store(Timebase::NANOS.duration_to_ticks(after), Ordering::SeqCst);
    }

    /// Makes the next sleep wake early, without reporting it, after `after`.
    pub fn wake_early_next_sleep(&self, after: Duration) {
        self.state
            .short_sleep
            .store(Timebase::NANOS.duration_to_ticks(after), Ordering::SeqCst);
    }

    /// Total time spent in [`TickSource::sleep`] so far.
    pub fn slept(&self) -> Duration {
        Duration::from_nanos(self.state.slept.load(Ordering::SeqCst))
    }

    fn pass(&self, nanos: u64) {
        self.state.now.fetch_add(nanos, Ordering::SeqCst);
        self.state.slept.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ManualTicks {
    fn now(&self) -> u64 {
        self.state.now.load(Ordering::SeqCst)
    }

    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }

    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let requested = Timebase::NANOS.duration_to_ticks(duration);

        let interrupt = self.state.interrupt_after.swap(NO_INTERRUPT, Ordering::SeqCst);
        if interrupt != NO_INTERRUPT && interrupt < requested {
            self.pass(interrupt);
            return Err(Interrupted {
                remaining: Duration::from_nanos(requested - interrupt),
            });
        }

        let short = self.state.short_sleep.swap(NO_INTERRUPT, Ordering::SeqCst);
        self.pass(short.min(requested));
        Ok(())
    }
}
