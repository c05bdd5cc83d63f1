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

//! A [`ModuleLoader`] backed by the OS dynamic loader through `libloading`.
//!
//! The artifact is never opened in place. Every load copies it into a
//! loader-owned staging directory first and opens the copy, so the build
//! tool can overwrite the original while it is mapped, and the OS loader
//! never hands back its cached image of a previous generation.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use khora_core::module::{
    EntryPoint, EntryPointTable, InitializeFn, LoadError, LoadedModule, ModuleLoader, SoundFn,
    UpdateFn, INITIALIZE_SYMBOL, SOUND_SYMBOL, UPDATE_SYMBOL,
};
use libloading::Library;
use tempfile::TempDir;

/// An opened shadow copy.
#[derive(Debug)]
pub struct DylibHandle {
    library: Library,
    shadow: PathBuf,
}

impl DylibHandle {
    /// The staged copy the library was actually opened from.
    pub fn shadow_path(&self) -> &Path {
        &self.shadow
    }
}

/// Loads game modules from dynamic libraries.
#[derive(Debug)]
pub struct DylibLoader {
    staging: TempDir,
    generation: u64,
}

impl DylibLoader {
    /// Creates a loader with a fresh staging directory under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the staging directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let staging = tempfile::Builder::new().prefix("khora-live-").tempdir()?;
        log::debug!("Staging module copies in {}", staging.path().display());
        Ok(Self {
            staging,
            generation: 0,
        })
    }

    /// The directory holding shadow copies.
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// How many modules this loader has opened successfully.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn stage(&self, path: &Path, generation: u64) -> Result<PathBuf, LoadError> {
        let metadata = fs::metadata(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Stage {
                path: path.to_path_buf(),
                source,
            },
        })?;
        if metadata.len() == 0 {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        let shadow = self.staging.path().join(shadow_name(path, generation));
        fs::copy(path, &shadow).map_err(|source| LoadError::Stage {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(shadow)
    }
}

impl ModuleLoader for DylibLoader {
    type Handle = DylibHandle;

    fn load(&mut self, path: &Path) -> Result<LoadedModule<DylibHandle>, LoadError> {
        let generation = self.generation + 1;
        let shadow = self.stage(path, generation)?;

        // SAFETY: loading runs the library's initializers. The artifact is a
        // game module built against `khora_core::module::abi`.
        let library = match unsafe { Library::new(&shadow) } {
            Ok(library) => library,
            Err(e) => {
                discard(&shadow);
                return Err(LoadError::Open {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        // SAFETY: the symbol types are the ABI every game module exports them with.
        let (initialize, update, sound) = unsafe {
            (
                resolve::<InitializeFn>(&library, INITIALIZE_SYMBOL),
                resolve::<UpdateFn>(&library, UPDATE_SYMBOL),
                resolve::<SoundFn>(&library, SOUND_SYMBOL),
            )
        };
        // SAFETY: `library` moves into the handle of the returned module,
        // which drops the table before closing it.
        let table = unsafe {
            EntryPointTable::new(
                EntryPoint::from_option(initialize),
                EntryPoint::from_option(update),
                EntryPoint::from_option(sound),
            )
        };

        for symbol in table.resolution().missing() {
            log::warn!(
                "Module {} does not export `{symbol}`; using the default no-op",
                path.display()
            );
        }

        self.generation = generation;
        log::info!(
            "Loaded module {} (generation {generation})",
            path.display()
        );

        let handle = DylibHandle { library, shadow };
        // SAFETY: every resolved function comes from `handle.library`.
        Ok(unsafe { LoadedModule::new(table, handle, path.to_path_buf(), generation) })
    }

    fn unload(&mut self, module: LoadedModule<DylibHandle>) {
        let generation = module.generation();
        let DylibHandle { library, shadow } = module.into_handle();
        if let Err(e) = library.close() {
            log::warn!("Failed to close module generation {generation}: {e}");
        }
        discard(&shadow);
        log::debug!("Unloaded module generation {generation}");
    }
}

/// `<stem>.<generation>.<ext>`, or `<stem>.<generation>` when there is no extension.
fn shadow_name(path: &Path, generation: u64) -> OsString {
    let mut name = path
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("module"));
    name.push(format!(".{generation}"));
    if let Some(extension) = path.extension() {
        name.push(".");
        name.push(extension);
    }
    name
}

/// Looks up `name` and copies the function pointer out of the symbol.
///
/// # Safety
/// `T` must be the real type of the exported symbol.
unsafe fn resolve<T: Copy>(library: &Library, name: &str) -> Option<T> {
    let symbol = format!("{name}\0");
    // SAFETY: forwarded to the caller.
    unsafe { library.get::<T>(symbol.as_bytes()) }
        .ok()
        .map(|symbol| *symbol)
}

fn discard(shadow: &Path) {
    if let Err(e) = fs::remove_file(shadow) {
        log::debug!("Could not remove {}: {e}", shadow.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_names_carry_the_generation() {
        assert_eq!(
            shadow_name(Path::new("/build/libgame.so"), 3),
            OsString::from("libgame.3.so")
        );
        assert_eq!(
            shadow_name(Path::new("game.dll"), 12),
            OsString::from("game.12.dll")
        );
        assert_eq!(shadow_name(Path::new("game"), 1), OsString::from("game.1"));
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DylibLoader::new().unwrap();

        let err = loader.load(&dir.path().join("libgame.so")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert_eq!(loader.generation(), 0);
    }

    #[test]
    fn empty_artifact_is_rejected_before_staging() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("libgame.so");
        fs::write(&artifact, b"").unwrap();
        let mut loader = DylibLoader::new().unwrap();

        let err = loader.load(&artifact).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
        assert_eq!(fs::read_dir(loader.staging_dir()).unwrap().count(), 0);
    }

    #[test]
    fn truncated_artifact_fails_to_open_and_leaves_no_copy() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("libgame.so");
        fs::write(&artifact, b"\x7fELF truncated").unwrap();
        let mut loader = DylibLoader::new().unwrap();

        let err = loader.load(&artifact).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }), "{err}");
        assert_eq!(err.path(), artifact);
        assert_eq!(fs::read_dir(loader.staging_dir()).unwrap().count(), 0);
        assert_eq!(loader.generation(), 0);
    }
}
