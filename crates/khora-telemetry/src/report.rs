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

//! Suppression of repeated reports.

/// Lets a repeating condition through to the log only the first time.
///
/// Occurrences are still counted after the first, so the total can be
/// reported later. [`ReportOnce::reset`] re-arms it once the condition clears.
#[derive(Debug, Default, Clone)]
pub struct ReportOnce {
    occurrences: u64,
}

impl ReportOnce {
    /// A fresh, armed reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an occurrence and runs `report` if it is the first one.
    ///
    /// Returns whether `report` ran.
    pub fn report(&mut self, report: impl FnOnce()) -> bool {
        self.occurrences += 1;
        if self.occurrences == 1 {
            report();
            true
        } else {
            false
        }
    }

    /// How many occurrences were recorded since the last reset.
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }

    /// Re-arms the reporter and returns the occurrences it swallowed.
    pub fn reset(&mut self) -> u64 {
        let suppressed = self.occurrences.saturating_sub(1);
        self.occurrences = 0;
        suppressed
    }
}
