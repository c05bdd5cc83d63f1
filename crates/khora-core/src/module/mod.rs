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

//! The game module's entry points and the contract for loading them.
//!
//! A game module is a separately built dynamic library exporting up to three
//! unmangled `extern "C"` functions:
//!
//! | symbol       | signature                                                  |
//! |--------------|------------------------------------------------------------|
//! | `Initialize` | [`InitializeFn`]: seeds the persistent state once           |
//! | `Update`     | [`UpdateFn`]: advances the state and draws a frame          |
//! | `Sound`      | [`SoundFn`]: fills an audio buffer                          |
//!
//! Each missing symbol is replaced by a no-op, so a module exporting only
//! `Update` is valid. The host never inspects the module's state; everything
//! the module owns lives in the [`MemoryArena`](crate::memory::MemoryArena) it
//! is handed.

pub mod abi;
mod entry;
mod loader;

pub use entry::{EntryPoint, EntryPointTable, Resolution};
pub use loader::{LoadError, LoadedModule, ModuleLoader};

pub use abi::{InitializeFn, SoundFn, UpdateFn, INITIALIZE_SYMBOL, SOUND_SYMBOL, UPDATE_SYMBOL};
