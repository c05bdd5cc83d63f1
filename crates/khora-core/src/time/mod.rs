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

//! Frame pacing and elapsed-time measurement.
//!
//! A [`Clock`] samples a [`TickSource`] and converts raw ticks with the
//! source's [`Timebase`]. The system source lives in `khora-infra`;
//! [`ManualTicks`] drives clocks deterministically in tests.

mod clock;
mod source;

pub use clock::{Clock, ClockError, Tick, MAX_TICK_CAP};
pub use source::{Interrupted, ManualTicks, TickSource, Timebase};
