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

//! Wiring of the concrete OS implementations into a [`Runtime`].

use khora_control::ReloadController;
use khora_core::module::LoadError;
use khora_core::platform::Platform;
use khora_infra::{DylibLoader, SystemTicks};
use khora_io::NotifyMonitor;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::runtime::Runtime;

/// A runtime hosting a dynamic-library game module, reloaded on file changes.
pub type LiveRuntime<P> = Runtime<P, DylibLoader, NotifyMonitor, SystemTicks>;

/// Builds a [`LiveRuntime`] from `config` on top of `platform`.
///
/// Resolves the module path, loads the module, starts watching it and
/// allocates the arena. Any failure here is fatal for the host.
pub fn launch<P: Platform>(
    config: &RuntimeConfig,
    platform: P,
) -> Result<LiveRuntime<P>, RuntimeError> {
    config.validate()?;
    let artifact = config.resolve_module_path()?;
    log::info!("Game module: {}", artifact.display());
    if !artifact.exists() {
        return Err(LoadError::NotFound { path: artifact }.into());
    }

    let loader = DylibLoader::new().map_err(RuntimeError::Staging)?;
    let monitor = NotifyMonitor::new(&artifact)?;
    let ticks = SystemTicks::new();
    let controller =
        ReloadController::new(loader, monitor, config.reload_config(), ticks.clone())?;
    Runtime::new(config, platform, controller, ticks)
}
