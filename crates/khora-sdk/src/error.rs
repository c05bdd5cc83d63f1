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

use std::io;

use khora_core::memory::ArenaError;
use khora_core::module::LoadError;
use khora_core::time::ClockError;
use khora_io::WatchError;

use crate::config::ConfigError;

/// Everything that can stop the runtime from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The memory arena could not be allocated.
    #[error("failed to acquire the memory arena: {0}")]
    Arena(#[from] ArenaError),
    /// The initial module load failed.
    #[error("failed to load the game module: {0}")]
    Load(#[from] LoadError),
    /// The module artifact could not be watched.
    #[error("failed to watch the game module: {0}")]
    Watch(#[from] WatchError),
    /// The loader's staging directory could not be created.
    #[error("failed to create the module staging directory: {0}")]
    Staging(#[source] io::Error),
    /// The frame cap was rejected by the clock.
    #[error(transparent)]
    Clock(#[from] ClockError),
}
