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

//! Errors raised by the memory arena.

use thiserror::Error;

/// An error that can occur while acquiring or carving up the memory arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// The system allocator refused to hand out the backing storage.
    #[error("failed to allocate {bytes} bytes of arena storage")]
    AllocationFailed {
        /// The number of bytes requested from the allocator.
        bytes: usize,
    },
    /// A bump allocation did not fit in the remaining space of a buffer.
    #[error("arena buffer exhausted: requested {requested} bytes, {remaining} remaining")]
    OutOfSpace {
        /// The number of bytes requested, including alignment padding.
        requested: u64,
        /// The number of bytes still free in the buffer.
        remaining: u32,
    },
    /// The requested alignment is not a power of two or exceeds [`super::ARENA_ALIGNMENT`].
    #[error("unsupported alignment {align} (arena storage is aligned to {} bytes)", super::ARENA_ALIGNMENT)]
    UnsupportedAlignment {
        /// The alignment that was requested.
        align: usize,
    },
    /// A typed slot is larger than the whole buffer.
    #[error("state slot of {size} bytes does not fit in a buffer of {capacity} bytes")]
    SlotTooLarge {
        /// `size_of` the slot type.
        size: usize,
        /// The capacity of the buffer.
        capacity: u32,
    },
}
