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

//! The memory arena that keeps game state alive across module reloads.
//!
//! The arena is made of two fixed-capacity [`Buffer`]s:
//!
//! * the **persistent** buffer holds the module's long-lived state, laid out
//!   entirely by the module and reached through [`Buffer::slot`],
//! * the **transient** buffer is per-iteration scratch space, rewound by the
//!   runtime once per frame.
//!
//! Both are allocated once when the runtime starts and are never reallocated.

mod arena;
mod buffer;
mod error;

pub use arena::{ArenaScope, MemoryArena};
pub use buffer::Buffer;
pub use error::ArenaError;

/// Alignment of the start of every arena buffer, in bytes.
///
/// Types reinterpreted through [`Buffer::slot`] or [`Buffer::push`] must not
/// require a stricter alignment.
pub const ARENA_ALIGNMENT: usize = 64;
