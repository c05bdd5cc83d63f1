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

use anyhow::{Context, Result};
use game::GameState;
use khora_core::memory::MemoryArena;
use khora_core::module::ModuleLoader;
use khora_core::platform::{FrameBuffer, Input, Key, Pixel};
use khora_infra::DylibLoader;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// A system library that exports none of the module entry points.
fn library_without_entry_points() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "/lib/x86_64-linux-gnu/libm.so.6",
        "/usr/lib/x86_64-linux-gnu/libm.so.6",
        "/lib/aarch64-linux-gnu/libm.so.6",
        "/usr/lib/aarch64-linux-gnu/libm.so.6",
        "/usr/lib64/libm.so.6",
        "/lib64/libm.so.6",
        "/usr/lib/libm.so.6",
        "/lib/libm.so.6",
        "C:\\Windows\\System32\\version.dll",
    ];
    CANDIDATES.iter().map(PathBuf::from).find(|path| path.is_file())
}

/// The demo game module, as built next to this test binary.
fn built_game_module() -> Option<PathBuf> {
    let name = format!("{DLL_PREFIX}game{DLL_SUFFIX}");
    let deps = std::env::current_exe().ok()?.parent()?.to_path_buf();
    let profile = deps.parent()?.to_path_buf();

    [profile.join(&name), deps.join(&name)]
        .into_iter()
        .find(|path| path.is_file())
        .or_else(|| {
            // Dependencies may carry a metadata hash: `libgame-<hash>.so`.
            let hashed = format!("{DLL_PREFIX}game-");
            fs::read_dir(&deps)
                .ok()?
                .flatten()
                .map(|entry| entry.path())
                .find(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(&hashed) && name.ends_with(DLL_SUFFIX))
                })
        })
}

fn staged_files(loader: &DylibLoader) -> Result<usize> {
    Ok(fs::read_dir(loader.staging_dir())?.count())
}

fn copy_into(dir: &Path, source: &Path, name: &str) -> Result<PathBuf> {
    let artifact = dir.join(name);
    fs::copy(source, &artifact).with_context(|| format!("copying {}", source.display()))?;
    Ok(artifact)
}

#[test]
fn test_library_without_entry_points_gets_default_slots() -> Result<()> {
    let Some(system) = library_without_entry_points() else {
        eprintln!("no suitable system library found, skipping");
        return Ok(());
    };
    let dir = tempdir()?;
    let artifact = copy_into(dir.path(), &system, &format!("{DLL_PREFIX}nosyms{DLL_SUFFIX}"))?;
    let mut loader = DylibLoader::new()?;

    let module = loader.load(&artifact)?;
    let resolution = module.table().resolution();
    assert_eq!(resolution.missing(), vec!["Initialize", "Update", "Sound"]);

    let mut arena = MemoryArena::acquire(256, 0)?;
    assert!(!module.table().initialize(&mut arena));
    assert!(!arena.is_initialized());

    loader.unload(module);
    assert_eq!(staged_files(&loader)?, 0);
    Ok(())
}

#[test]
fn test_next_generation_loads_while_the_previous_is_mapped() -> Result<()> {
    let Some(system) = library_without_entry_points() else {
        eprintln!("no suitable system library found, skipping");
        return Ok(());
    };
    let dir = tempdir()?;
    let artifact = copy_into(dir.path(), &system, &format!("{DLL_PREFIX}nosyms{DLL_SUFFIX}"))?;
    let mut loader = DylibLoader::new()?;

    let first = loader.load(&artifact)?;
    let second = loader.load(&artifact)?;
    assert_eq!((first.generation(), second.generation()), (1, 2));
    assert_ne!(first.handle().shadow_path(), second.handle().shadow_path());
    assert_eq!(staged_files(&loader)?, 2);

    let first_shadow = first.handle().shadow_path().to_path_buf();
    loader.unload(first);
    assert!(!first_shadow.exists());
    assert!(second.handle().shadow_path().is_file());

    loader.unload(second);
    assert_eq!(staged_files(&loader)?, 0);
    Ok(())
}

#[test]
fn test_game_module_state_survives_a_generation_swap() -> Result<()> {
    let Some(built) = built_game_module() else {
        eprintln!("demo game module has not been built, skipping");
        return Ok(());
    };
    let dir = tempdir()?;
    let artifact = copy_into(dir.path(), &built, &format!("{DLL_PREFIX}game{DLL_SUFFIX}"))?;
    let mut loader = DylibLoader::new()?;
    let mut arena = MemoryArena::acquire(4096, 0)?;
    let mut pixels = vec![Pixel::default(); 200 * 200];

    let first = loader.load(&artifact)?;
    assert!(first.table().resolution().is_complete());
    assert!(first.table().initialize(&mut arena));

    let mut input = Input::new();
    input.push(Key::pressed('d'));
    {
        let mut frame = FrameBuffer::new(&mut pixels, 200, 200).context("frame")?;
        first.table().update(&mut arena, &mut frame, &input);
    }
    let state = *arena.state::<GameState>()?;
    assert_eq!((state.offset, state.x), (1, 10));

    let second = loader.load(&artifact)?;
    loader.unload(first);
    {
        let mut frame = FrameBuffer::new(&mut pixels, 200, 200).context("frame")?;
        second.table().update(&mut arena, &mut frame, &Input::new());
    }
    let state = *arena.state::<GameState>()?;
    assert_eq!((state.offset, state.x), (2, 10));
    assert_eq!(pixels[0], Pixel::rgb(0, 2, 0));

    loader.unload(second);
    Ok(())
}
