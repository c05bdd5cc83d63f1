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

//! Filesystem watching for the module artifact.

mod monitor;

use std::path::PathBuf;

pub use monitor::NotifyMonitor;

/// Errors raised while setting up a watch.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The platform notification backend could not be created.
    #[error("failed to create the file notification backend: {source}")]
    Backend {
        /// The backend error.
        #[source]
        source: notify::Error,
    },
    /// The backend refused to watch the path.
    #[error("failed to watch {}: {source}", path.display())]
    Watch {
        /// The path that could not be watched.
        path: PathBuf,
        /// The backend error.
        #[source]
        source: notify::Error,
    },
}
