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

//! Logger installation for runtime binaries.

use env_logger::{Builder, Env};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs `env_logger` with an `info` default, overridable through `RUST_LOG`.
///
/// Safe to call more than once: later calls leave the first logger in place.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Like [`init`], with a custom default filter.
pub fn init_with(default_filter: &str) {
    let result = Builder::from_env(Env::default().default_filter_or(default_filter))
        .filter_module("notify", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already installed");
    }
}
