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

//! The two-buffer memory arena shared with the game module.

use std::fmt;

use bytemuck::Pod;

use super::{ArenaError, Buffer};

/// Selects one of the two buffers of a [`MemoryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaScope {
    /// Long-lived module state. Survives every reload.
    Persistent,
    /// Per-iteration scratch space.
    Transient,
}

impl fmt::Display for ArenaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaScope::Persistent => f.write_str("persistent"),
            ArenaScope::Transient => f.write_str("transient"),
        }
    }
}

/// The memory block that outlives every reload of the game module.
///
/// The host owns the arena for the whole process lifetime and lends it to the
/// module by `&mut` on every entry-point call. Nothing in the reload path ever
/// touches it, which is what lets the module's state survive a code swap.
#[repr(C)]
#[derive(Debug)]
pub struct MemoryArena {
    persistent: Buffer,
    transient: Buffer,
    initialized: bool,
}

impl MemoryArena {
    /// Allocates both buffers, zeroed, in one go.
    ///
    /// # Errors
    /// Returns [`ArenaError::AllocationFailed`] if either allocation is refused.
    pub fn acquire(persistent_bytes: u32, transient_bytes: u32) -> Result<Self, ArenaError> {
        let persistent = Buffer::allocate(persistent_bytes)?;
        let transient = Buffer::allocate(transient_bytes)?;
        log::debug!(
            "Acquired memory arena: {persistent_bytes} persistent bytes, {transient_bytes} transient bytes"
        );
        Ok(Self {
            persistent,
            transient,
            initialized: false,
        })
    }

    /// The persistent buffer.
    pub fn persistent(&self) -> &Buffer {
        &self.persistent
    }

    /// The persistent buffer, mutably.
    pub fn persistent_mut(&mut self) -> &mut Buffer {
        &mut self.persistent
    }

    /// The transient buffer.
    pub fn transient(&self) -> &Buffer {
        &self.transient
    }

    /// The transient buffer, mutably.
    pub fn transient_mut(&mut self) -> &mut Buffer {
        &mut self.transient
    }

    /// The buffer selected by `scope`.
    pub fn buffer(&self, scope: ArenaScope) -> &Buffer {
        match scope {
            ArenaScope::Persistent => &self.persistent,
            ArenaScope::Transient => &self.transient,
        }
    }

    /// Rewinds the buffer selected by `scope`, leaving the other one untouched.
    pub fn reset(&mut self, scope: ArenaScope) {
        match scope {
            ArenaScope::Persistent => self.persistent.reset(),
            ArenaScope::Transient => self.transient.reset(),
        }
    }

    /// Shorthand for `persistent_mut().slot::<T>()`.
    pub fn state<T: Pod>(&mut self) -> Result<&mut T, ArenaError> {
        self.persistent.slot()
    }

    /// Whether a resolved `Initialize` entry point has run against this arena.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Records that the module's state has been initialized.
    ///
    /// The flag only ever moves from `false` to `true`. Returns `true` if this
    /// call performed the transition.
    pub fn mark_initialized(&mut self) -> bool {
        let flipped = !self.initialized;
        self.initialized = true;
        flipped
    }
}
