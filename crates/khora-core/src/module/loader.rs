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

//! The loader contract and the loaded-module value it hands out.

use std::io;
use std::path::{Path, PathBuf};

use super::EntryPointTable;

/// Errors produced while turning a module artifact into an [`EntryPointTable`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The artifact does not exist.
    #[error("module artifact not found: {}", path.display())]
    NotFound {
        /// The requested artifact.
        path: PathBuf,
    },
    /// The artifact exists but holds no bytes yet.
    #[error("module artifact is empty: {}", path.display())]
    Empty {
        /// The requested artifact.
        path: PathBuf,
    },
    /// The shadow copy of the artifact could not be created.
    #[error("failed to stage module artifact {}: {source}", path.display())]
    Stage {
        /// The requested artifact.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The dynamic loader refused the artifact.
    #[error("failed to open module {}: {reason}", path.display())]
    Open {
        /// The requested artifact.
        path: PathBuf,
        /// The loader's own description of the failure.
        reason: String,
    },
}

impl LoadError {
    /// The artifact the failed load was attempted on.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Empty { path }
            | LoadError::Stage { path, .. }
            | LoadError::Open { path, .. } => path,
        }
    }
}

/// A module that has been opened and resolved.
///
/// The table is kept behind a `Box` so its address is stable for the module's
/// whole life, and it is only ever lent out by reference. Dropping a
/// `LoadedModule` drops the table before the handle, so no function pointer
/// survives the library it came from.
#[derive(Debug)]
pub struct LoadedModule<H> {
    table: Box<EntryPointTable>,
    handle: H,
    source: PathBuf,
    generation: u64,
}

impl<H> LoadedModule<H> {
    /// Bundles a table with the handle that keeps its functions alive.
    ///
    /// # Safety
    /// Every resolved function in `table` must stay callable for as long as
    /// `handle` is alive.
    pub unsafe fn new(table: EntryPointTable, handle: H, source: PathBuf, generation: u64) -> Self {
        Self {
            table: Box::new(table),
            handle,
            source,
            generation,
        }
    }

    /// The entry points of this module.
    pub fn table(&self) -> &EntryPointTable {
        &self.table
    }

    /// The loader-specific handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// The artifact path the module was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The load counter value assigned by the loader.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops the table and returns the handle.
    ///
    /// Loaders call this from [`ModuleLoader::unload`] so that closing the
    /// handle can never leave a dangling table behind.
    pub fn into_handle(self) -> H {
        let LoadedModule { table, handle, .. } = self;
        drop(table);
        handle
    }
}

/// Turns a module artifact into callable entry points and releases it again.
///
/// Implementations decide what a handle is. The dynamic-library loader keeps
/// the opened library and its shadow copy; test loaders may use `()`.
pub trait ModuleLoader {
    /// Whatever keeps the resolved functions alive.
    type Handle;

    /// Opens the artifact at `path` and resolves its entry points.
    ///
    /// Missing entry points fall back to their defaults and are not an error.
    fn load(&mut self, path: &Path) -> Result<LoadedModule<Self::Handle>, LoadError>;

    /// Releases a module previously returned by [`ModuleLoader::load`].
    fn unload(&mut self, module: LoadedModule<Self::Handle>);
}
