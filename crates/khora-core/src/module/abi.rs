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

//! The C ABI shared by the host and every game module.
//!
//! Both sides compile against these definitions, so a module built from this
//! crate always agrees with the runtime on calling convention and layout.

use crate::memory::MemoryArena;
use crate::platform::{FrameBuffer, Input, SoundBuffer};

/// Signature of the exported `Initialize` entry point.
pub type InitializeFn = unsafe extern "C" fn(arena: &mut MemoryArena);

/// Signature of the exported `Update` entry point.
pub type UpdateFn =
    unsafe extern "C" fn(arena: &mut MemoryArena, frame: &mut FrameBuffer<'_>, input: &Input);

/// Signature of the exported `Sound` entry point.
pub type SoundFn = unsafe extern "C" fn(arena: &mut MemoryArena, sound: &mut SoundBuffer<'_>);

/// Exported name of the initialization entry point.
pub const INITIALIZE_SYMBOL: &str = "Initialize";
/// Exported name of the per-frame entry point.
pub const UPDATE_SYMBOL: &str = "Update";
/// Exported name of the audio entry point.
pub const SOUND_SYMBOL: &str = "Sound";
