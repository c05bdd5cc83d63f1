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

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use khora_control::{ReloadConfig, ReloadController};
use khora_core::memory::MemoryArena;
use khora_core::module::{EntryPoint, EntryPointTable, LoadError, LoadedModule, ModuleLoader};
use khora_core::platform::{FrameBuffer, Input, Key, Pixel, SoundBuffer};
use khora_core::time::{ManualTicks, TickSource};
use khora_core::watch::{ChangeMonitor, ChangeSignal};
use khora_infra::HeadlessPlatform;
use khora_sdk::{RunSummary, Runtime, RuntimeConfig};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

// --- A tiny in-process game: counts frames and keys, paints, hums ---

const GREEN: Pixel = Pixel::rgb(0, 200, 0);
const BLUE: Pixel = Pixel::rgb(0, 0, 200);

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Game {
    initialized_with: u32,
    frames: u32,
    keys: u32,
}

extern "C" fn init_game(arena: &mut MemoryArena) {
    if let Ok(game) = arena.state::<Game>() {
        game.initialized_with = 7;
    }
}

extern "C" fn update_green(arena: &mut MemoryArena, frame: &mut FrameBuffer<'_>, input: &Input) {
    // Scratch space must come back empty every frame.
    let fresh = arena.transient().used() == 0;
    let _ = arena.transient_mut().alloc_bytes(256, 16);
    if let Ok(game) = arena.state::<Game>() {
        if fresh {
            game.frames += 1;
        }
        game.keys += input.len() as u32;
    }
    frame.fill(GREEN);
}

extern "C" fn update_blue(arena: &mut MemoryArena, frame: &mut FrameBuffer<'_>, _input: &Input) {
    if let Ok(game) = arena.state::<Game>() {
        game.frames += 1;
    }
    frame.fill(BLUE);
}

extern "C" fn hum(_arena: &mut MemoryArena, sound: &mut SoundBuffer<'_>) {
    for pair in sound.stereo_frames_mut() {
        pair[0] = 1000;
        pair[1] = -1000;
    }
}

fn green_table() -> EntryPointTable {
    // SAFETY: plain functions of this test binary.
    unsafe {
        EntryPointTable::new(
            EntryPoint::Resolved(init_game),
            EntryPoint::Resolved(update_green),
            EntryPoint::Resolved(hum),
        )
    }
}

fn blue_table() -> EntryPointTable {
    // SAFETY: plain functions of this test binary.
    unsafe {
        EntryPointTable::new(
            EntryPoint::Default,
            EntryPoint::Resolved(update_blue),
            EntryPoint::Default,
        )
    }
}

/// Loads the green build first and the blue build on every reload.
struct TwoBuildLoader {
    generation: u64,
}

impl ModuleLoader for TwoBuildLoader {
    type Handle = ();

    fn load(&mut self, path: &Path) -> Result<LoadedModule<()>, LoadError> {
        self.generation += 1;
        let table = if self.generation == 1 {
            green_table()
        } else {
            blue_table()
        };
        // SAFETY: see `green_table`.
        Ok(unsafe { LoadedModule::new(table, (), path.to_path_buf(), self.generation) })
    }

    fn unload(&mut self, module: LoadedModule<()>) {
        module.into_handle();
    }
}

struct QueueMonitor {
    path: PathBuf,
    signals: Rc<RefCell<VecDeque<ChangeSignal>>>,
}

impl ChangeMonitor for QueueMonitor {
    fn poll(&mut self) -> ChangeSignal {
        self.signals.borrow_mut().pop_front().unwrap_or_default()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

type TestRuntime = Runtime<HeadlessPlatform, TwoBuildLoader, QueueMonitor, ManualTicks>;

struct Fixture {
    _dir: TempDir,
    runtime: TestRuntime,
    signals: Rc<RefCell<VecDeque<ChangeSignal>>>,
    ticks: ManualTicks,
}

fn small_config() -> RuntimeConfig {
    RuntimeConfig {
        persistent_bytes: 4096,
        transient_bytes: 4096,
        target_fps: 100.0,
        reload_quiet_ms: 0,
        frame_width: 4,
        frame_height: 2,
        audio_buffer_bytes: 64,
        ..RuntimeConfig::default()
    }
}

fn fixture(config: RuntimeConfig) -> Result<Fixture> {
    let dir = tempdir()?;
    let artifact = dir.path().join("libgame.so");
    std::fs::write(&artifact, b"module")?;

    let signals = Rc::new(RefCell::new(VecDeque::new()));
    let monitor = QueueMonitor {
        path: artifact,
        signals: signals.clone(),
    };
    let ticks = ManualTicks::new();
    let controller = ReloadController::new(
        TwoBuildLoader { generation: 0 },
        monitor,
        ReloadConfig {
            quiet_period: Duration::ZERO,
        },
        ticks.clone(),
    )?;
    let platform = HeadlessPlatform::new(
        config.frame_width,
        config.frame_height,
        config.audio_format(),
        config.audio_buffer_bytes as usize,
    );
    let runtime = Runtime::new(&config, platform, controller, ticks.clone())?;

    Ok(Fixture {
        _dir: dir,
        runtime,
        signals,
        ticks,
    })
}

fn game(runtime: &TestRuntime) -> Game {
    *bytemuck::from_bytes::<Game>(&runtime.arena().persistent().as_bytes()[..std::mem::size_of::<Game>()])
}

#[test]
fn test_iteration_drives_the_module() -> Result<()> {
    let mut fx = fixture(small_config())?;
    fx.runtime.platform_mut().queue_key(Key::pressed('w'));
    fx.runtime.platform_mut().queue_key(Key::released('w'));

    assert!(fx.runtime.step()?);

    let state = game(&fx.runtime);
    assert_eq!(state.initialized_with, 7);
    assert_eq!(state.frames, 1);
    assert_eq!(state.keys, 2);
    assert!(fx.runtime.arena().is_initialized());

    let platform = fx.runtime.platform();
    assert!(platform.pixels().iter().all(|p| *p == GREEN));
    assert_eq!(platform.frames_presented(), 1);
    assert_eq!(platform.samples()[..2], [1000, -1000]);
    Ok(())
}

#[test]
fn test_transient_buffer_is_rewound_every_iteration() -> Result<()> {
    let mut fx = fixture(small_config())?;
    for _ in 0..4 {
        assert!(fx.runtime.step()?);
        assert_eq!(fx.runtime.arena().transient().used(), 0);
    }
    // `update_green` only counts frames that started with an empty scratch buffer.
    assert_eq!(game(&fx.runtime).frames, 4);
    Ok(())
}

#[test]
fn test_iterations_are_paced_to_the_frame_cap() -> Result<()> {
    let config = small_config();
    let cap = config.frame_cap();
    let mut fx = fixture(config)?;

    for _ in 0..3 {
        fx.runtime.step()?;
    }
    assert_eq!(fx.ticks.slept(), cap * 3);

    // A slow frame is not followed by a sleep.
    fx.ticks.advance(cap * 2);
    fx.runtime.step()?;
    assert_eq!(fx.ticks.slept(), cap * 3);
    Ok(())
}

#[test]
fn test_interrupted_sleep_does_not_stop_the_loop() -> Result<()> {
    let mut fx = fixture(small_config())?;
    fx.ticks.interrupt_next_sleep(Duration::from_millis(1));
    assert!(fx.runtime.step()?);
    assert!(fx.runtime.step()?);
    assert_eq!(fx.runtime.frames(), 2);
    Ok(())
}

#[test]
fn test_reload_swaps_code_and_keeps_state() -> Result<()> {
    let mut fx = fixture(small_config())?;
    for _ in 0..3 {
        fx.runtime.step()?;
    }

    fx.signals.borrow_mut().push_back(ChangeSignal::Modified);
    fx.runtime.step()?;

    let state = game(&fx.runtime);
    assert_eq!(state.initialized_with, 7);
    assert_eq!(state.frames, 4);
    assert_eq!(fx.runtime.controller().reloads(), 1);
    assert!(fx.runtime.platform().pixels().iter().all(|p| *p == BLUE));
    // The blue build has no `Sound`; the platform's buffer stays silent.
    assert!(fx.runtime.platform().samples().iter().all(|&s| s == 0));
    Ok(())
}

#[test]
fn test_run_stops_at_the_frame_limit() -> Result<()> {
    let config = RuntimeConfig {
        max_frames: Some(5),
        ..small_config()
    };
    let fx = fixture(config)?;
    fx.signals.borrow_mut().push_back(ChangeSignal::Modified);

    let summary = fx.runtime.run()?;
    assert_eq!(
        summary,
        RunSummary {
            frames: 5,
            reloads: 1,
            failed_reloads: 0,
        }
    );
    assert!(fx.ticks.now() > 0);
    Ok(())
}

#[test]
fn test_cleared_run_flag_stops_before_polling() -> Result<()> {
    let mut fx = fixture(small_config())?;
    fx.runtime.run_flag().store(false, Ordering::SeqCst);
    assert!(!fx.runtime.step()?);
    assert_eq!(fx.runtime.platform().frames_presented(), 0);
    Ok(())
}

#[test]
fn test_invalid_configuration_is_rejected() -> Result<()> {
    let config = RuntimeConfig {
        target_fps: 0.0,
        ..small_config()
    };
    assert!(fixture(config).is_err());
    Ok(())
}
