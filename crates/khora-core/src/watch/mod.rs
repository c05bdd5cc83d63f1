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

//! The contract for watching the module artifact on disk.

use std::fmt;
use std::path::Path;

/// What happened to the watched path since the previous poll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChangeSignal {
    /// Nothing happened.
    #[default]
    None,
    /// The file was written, created or recreated.
    Modified,
    /// The file was removed or renamed away.
    Deleted,
    /// The backend reported a failure. Callers treat it as [`ChangeSignal::None`].
    Error(String),
}

impl ChangeSignal {
    /// Whether the signal calls for a reload decision.
    pub fn is_change(&self) -> bool {
        matches!(self, ChangeSignal::Modified | ChangeSignal::Deleted)
    }

    /// Folds a later signal into this one.
    ///
    /// `Deleted` wins over `Modified` only when it came last, since a build
    /// usually removes the artifact before writing the new one. Errors never
    /// hide a real change.
    pub fn merge(self, later: ChangeSignal) -> ChangeSignal {
        match (self, later) {
            (earlier, ChangeSignal::None) => earlier,
            (ChangeSignal::None, later) => later,
            (earlier, ChangeSignal::Error(_)) if earlier.is_change() => earlier,
            (ChangeSignal::Error(_), later) if later.is_change() => later,
            (_, later) => later,
        }
    }
}

impl fmt::Display for ChangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSignal::None => f.write_str("none"),
            ChangeSignal::Modified => f.write_str("modified"),
            ChangeSignal::Deleted => f.write_str("deleted"),
            ChangeSignal::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// A non-blocking watcher over exactly one file.
pub trait ChangeMonitor {
    /// Reports what happened since the previous call. Must never block.
    fn poll(&mut self) -> ChangeSignal;

    /// The watched path.
    fn path(&self) -> &Path;
}
