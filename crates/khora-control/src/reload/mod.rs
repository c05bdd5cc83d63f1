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

//! Live reload of the game module.
//!
//! The [`ReloadController`] owns the active module, the loader that produced
//! it and the monitor watching its artifact. Polled once per iteration, it
//! walks the states below and always returns with exactly one table active:
//!
//! ```text
//! Loaded ──change──▶ Settling ──quiet & non-empty──▶ load ─┬─ ok ──▶ Loaded
//!    ▲                  ▲  │                               └─ err ─▶ LoadedWithError
//!    │                  └──┘ change / artifact missing              │
//!    └──────────────────────────── change ◀─────────────────────────┘
//! ```

mod controller;

use std::fmt;
use std::time::Duration;

pub use controller::ReloadController;

/// Configuration for the [`ReloadController`].
#[derive(Debug, Clone)]
pub struct ReloadConfig {
    /// How long the artifact must stay quiet after a change before a load is attempted.
    pub quiet_period: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(250),
        }
    }
}

/// Where the controller stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    /// The active module is the latest successful load and nothing is pending.
    Loaded,
    /// A change was seen; waiting for the artifact to settle.
    Settling,
    /// The last attempt failed; the previous module is still active.
    LoadedWithError,
}

impl fmt::Display for ReloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadState::Loaded => f.write_str("loaded"),
            ReloadState::Settling => f.write_str("settling"),
            ReloadState::LoadedWithError => f.write_str("loaded with error"),
        }
    }
}

/// What a single [`ReloadController::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Nothing pending.
    Idle,
    /// Waiting for the artifact to settle.
    Settling,
    /// A new module is active.
    Reloaded {
        /// Generation of the new module.
        generation: u64,
    },
    /// A load was attempted and failed; the previous module is still active.
    Failed,
}
