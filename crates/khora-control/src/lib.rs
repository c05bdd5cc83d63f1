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

//! # Khora Control
//!
//! Decides when the game module is reloaded. The [`ReloadController`]
//! combines a [`ChangeMonitor`](khora_core::watch::ChangeMonitor) and a
//! [`ModuleLoader`](khora_core::module::ModuleLoader), debounces change
//! signals, and keeps the last good module active when a reload fails.

#![warn(missing_docs)]

pub mod reload;

pub use reload::{ReloadConfig, ReloadController, ReloadOutcome, ReloadState};
