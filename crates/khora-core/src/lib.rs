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

//! # Khora Core
//!
//! Foundational crate containing the types and interface contracts shared by
//! the live-reload runtime and the game modules it hosts.
//!
//! Nothing here touches the OS directly: the dynamic loader, the system tick
//! source and the file watcher are implemented in `khora-infra` and
//! `khora-io` against the traits defined in [`module`], [`time`] and [`watch`].

#![warn(missing_docs)]

pub mod memory;
pub mod module;
pub mod platform;
pub mod time;
pub mod watch;

pub use memory::MemoryArena;
pub use module::EntryPointTable;
pub use time::Clock;
