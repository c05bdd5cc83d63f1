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

//! Entry-point slots and the call-through table built from them.

use std::fmt;

use super::{InitializeFn, SoundFn, UpdateFn, INITIALIZE_SYMBOL, SOUND_SYMBOL, UPDATE_SYMBOL};
use crate::memory::MemoryArena;
use crate::platform::{FrameBuffer, Input, SoundBuffer};

/// One slot of an [`EntryPointTable`].
///
/// A slot is either the function resolved from the module artifact, or the
/// built-in no-op used when the artifact does not export the symbol.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint<F> {
    /// The symbol was found in the artifact.
    Resolved(F),
    /// The symbol is missing; calls do nothing.
    Default,
}

impl<F> EntryPoint<F> {
    /// Builds a slot from an optional resolved function.
    pub fn from_option(function: Option<F>) -> Self {
        match function {
            Some(f) => EntryPoint::Resolved(f),
            None => EntryPoint::Default,
        }
    }

    /// Whether the slot holds a resolved function.
    pub fn is_resolved(&self) -> bool {
        matches!(self, EntryPoint::Resolved(_))
    }
}

impl<F> fmt::Debug for EntryPoint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::Resolved(_) => f.write_str("Resolved"),
            EntryPoint::Default => f.write_str("Default"),
        }
    }
}

/// Which of the three entry points were resolved from the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// `Initialize` was found.
    pub initialize: bool,
    /// `Update` was found.
    pub update: bool,
    /// `Sound` was found.
    pub sound: bool,
}

impl Resolution {
    /// Whether all three entry points were found.
    pub fn is_complete(&self) -> bool {
        self.initialize && self.update && self.sound
    }

    /// Names of the entry points that fell back to the no-op default.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.initialize, INITIALIZE_SYMBOL),
            (self.update, UPDATE_SYMBOL),
            (self.sound, SOUND_SYMBOL),
        ]
        .into_iter()
        .filter(|(found, _)| !found)
        .map(|(_, name)| name)
        .collect()
    }
}

/// The set of callable slots the runtime invokes each iteration.
///
/// A table is never mutated after construction. Reloading builds a new table
/// and swaps it in whole, so callers never observe a partially updated one.
/// The table is deliberately not `Clone`: it must not outlive the module
/// handle its functions were resolved from.
#[derive(Debug)]
pub struct EntryPointTable {
    initialize: EntryPoint<InitializeFn>,
    update: EntryPoint<UpdateFn>,
    sound: EntryPoint<SoundFn>,
}

impl EntryPointTable {
    /// Builds a table from resolved (or defaulted) slots.
    ///
    /// # Safety
    /// Every `Resolved` function must honour the module ABI declared by its
    /// type alias and must remain callable for as long as the table exists.
    /// For functions resolved from a dynamic library this means the library
    /// handle must outlive the table.
    pub unsafe fn new(
        initialize: EntryPoint<InitializeFn>,
        update: EntryPoint<UpdateFn>,
        sound: EntryPoint<SoundFn>,
    ) -> Self {
        Self {
            initialize,
            update,
            sound,
        }
    }

    /// A table where every slot is the no-op default.
    pub fn defaults() -> Self {
        Self {
            initialize: EntryPoint::Default,
            update: EntryPoint::Default,
            sound: EntryPoint::Default,
        }
    }

    /// Reports which slots were resolved.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            initialize: self.initialize.is_resolved(),
            update: self.update.is_resolved(),
            sound: self.sound.is_resolved(),
        }
    }

    /// Calls `Initialize`.
    ///
    /// When the slot is resolved the arena is marked initialized after the
    /// call returns. The default slot leaves the arena untouched. Returns
    /// whether a resolved function ran.
    pub fn initialize(&self, arena: &mut MemoryArena) -> bool {
        match self.initialize {
            EntryPoint::Resolved(initialize) => {
                // SAFETY: guaranteed callable by the contract of `EntryPointTable::new`.
                unsafe { initialize(arena) };
                arena.mark_initialized();
                true
            }
            EntryPoint::Default => false,
        }
    }

    /// Calls `Update`.
    pub fn update(&self, arena: &mut MemoryArena, frame: &mut FrameBuffer<'_>, input: &Input) {
        if let EntryPoint::Resolved(update) = self.update {
            // SAFETY: guaranteed callable by the contract of `EntryPointTable::new`.
            unsafe { update(arena, frame, input) };
        }
    }

    /// Calls `Sound`.
    pub fn sound(&self, arena: &mut MemoryArena, sound: &mut SoundBuffer<'_>) {
        if let EntryPoint::Resolved(fill) = self.sound {
            // SAFETY: guaranteed callable by the contract of `EntryPointTable::new`.
            unsafe { fill(arena, sound) };
        }
    }
}

impl Default for EntryPointTable {
    fn default() -> Self {
        Self::defaults()
    }
}
