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

//! # Khora SDK
//!
//! The entry point for hosts of a live-reloadable game module.
//!
//! A host reads a [`RuntimeConfig`], hands a [`Platform`](khora_core::platform::Platform)
//! backend to [`launch`], and calls [`Runtime::run`]:
//!
//! ```no_run
//! use khora_infra::HeadlessPlatform;
//! use khora_sdk::{launch, RuntimeConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = RuntimeConfig::from_environment()?;
//! let platform = HeadlessPlatform::new(
//!     config.frame_width,
//!     config.frame_height,
//!     config.audio_format(),
//!     config.audio_buffer_bytes as usize,
//! );
//! let summary = launch(&config, platform)?.run()?;
//! println!("{} frames, {} reloads", summary.frames, summary.reloads);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
mod launch;
pub mod runtime;

pub use config::{ConfigError, RuntimeConfig};
pub use error::RuntimeError;
pub use launch::{launch, LiveRuntime};
pub use runtime::{RunSummary, Runtime};

/// Re-exports for game modules and hosts.
pub mod prelude {
    pub use khora_core::memory::{ArenaScope, MemoryArena};
    pub use khora_core::platform::{
        AudioFormat, FrameBuffer, Input, Key, Pixel, Platform, SoundBuffer,
    };
}
