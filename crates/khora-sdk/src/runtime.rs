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

//! The loop orchestrator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use khora_control::ReloadController;
use khora_core::memory::{ArenaScope, MemoryArena};
use khora_core::module::ModuleLoader;
use khora_core::platform::{Input, Platform};
use khora_core::time::{Clock, TickSource};
use khora_core::watch::ChangeMonitor;
use khora_telemetry::FrameTelemetry;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

/// What a finished [`Runtime::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Iterations completed.
    pub frames: u64,
    /// Successful reloads.
    pub reloads: u64,
    /// Failed reload attempts.
    pub failed_reloads: u64,
}

/// Ties the platform, the arena, the reload controller and the clock together.
///
/// Each iteration of [`Runtime::step`]:
///
/// 1. checks the run flag and the frame limit,
/// 2. clears and refills the input snapshot from the platform,
/// 3. polls the reload controller, which may swap the module,
/// 4. calls `Initialize` until the arena is initialized, then `Update` and
///    `Sound` through the active table,
/// 5. presents the frame and rewinds the transient buffer,
/// 6. sleeps out the rest of the frame cap.
pub struct Runtime<P, L, M, S>
where
    P: Platform,
    L: ModuleLoader,
    M: ChangeMonitor,
    S: TickSource,
{
    platform: P,
    controller: ReloadController<L, M, S>,
    arena: MemoryArena,
    input: Input,
    clock: Clock<S>,
    stats_clock: Clock<S>,
    telemetry: FrameTelemetry,
    running: Arc<AtomicBool>,
    frame_cap: Duration,
    stats_interval: Duration,
    max_frames: Option<u64>,
    frames: u64,
}

impl<P, L, M, S> Runtime<P, L, M, S>
where
    P: Platform,
    L: ModuleLoader,
    M: ChangeMonitor,
    S: TickSource + Clone,
{
    /// Validates `config`, allocates the arena and starts the clocks.
    pub fn new(
        config: &RuntimeConfig,
        platform: P,
        controller: ReloadController<L, M, S>,
        ticks: S,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let arena = MemoryArena::acquire(config.persistent_bytes, config.transient_bytes)?;
        log::info!(
            "Runtime ready: {:.1} fps cap, {}x{} frame",
            config.target_fps,
            config.frame_width,
            config.frame_height
        );

        Ok(Self {
            platform,
            controller,
            arena,
            input: Input::new(),
            clock: Clock::new(ticks.clone()),
            stats_clock: Clock::new(ticks),
            telemetry: FrameTelemetry::new(),
            running: Arc::new(AtomicBool::new(true)),
            frame_cap: config.frame_cap(),
            stats_interval: config.stats_interval(),
            max_frames: config.max_frames,
            frames: 0,
        })
    }
}

impl<P, L, M, S> Runtime<P, L, M, S>
where
    P: Platform,
    L: ModuleLoader,
    M: ChangeMonitor,
    S: TickSource,
{
    /// The flag checked at the top of every iteration. Store `false` to stop.
    pub fn run_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// The arena lent to the module.
    pub fn arena(&self) -> &MemoryArena {
        &self.arena
    }

    /// The reload controller.
    pub fn controller(&self) -> &ReloadController<L, M, S> {
        &self.controller
    }

    /// The platform backend.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform backend, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Iterations completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one iteration. Returns `false`, without doing anything, once the
    /// loop should stop.
    pub fn step(&mut self) -> Result<bool, RuntimeError> {
        if !self.running.load(Ordering::SeqCst) {
            log::info!("Run flag cleared, stopping");
            return Ok(false);
        }
        if self.max_frames.is_some_and(|max| self.frames >= max) {
            log::info!("Reached the frame limit of {}", self.frames);
            return Ok(false);
        }

        self.input.clear();
        if !self.platform.poll_input(&mut self.input) {
            log::info!("Platform requested shutdown");
            return Ok(false);
        }

        self.controller.poll();
        let table = self.controller.table();

        if !self.arena.is_initialized() && table.initialize(&mut self.arena) {
            log::debug!("Module state initialized");
        }
        {
            let mut frame = self.platform.frame_buffer();
            table.update(&mut self.arena, &mut frame, &self.input);
        }
        self.platform.present();
        if let Some(mut sound) = self.platform.sound_buffer() {
            table.sound(&mut self.arena, &mut sound);
        }
        self.arena.reset(ArenaScope::Transient);
        self.frames += 1;

        let tick = self.clock.tick_capped(self.frame_cap)?;
        self.telemetry.record(tick.elapsed);
        if let Some(remaining) = tick.interrupted {
            log::warn!("Frame sleep interrupted with {remaining:?} left");
        }
        if self.stats_clock.timer(self.stats_interval) {
            self.telemetry.log_window();
        }
        Ok(true)
    }

    /// Steps until the loop stops, then unloads the module.
    pub fn run(mut self) -> Result<RunSummary, RuntimeError> {
        log::info!("Entering the main loop");
        while self.step()? {}

        let summary = RunSummary {
            frames: self.frames,
            reloads: self.controller.reloads(),
            failed_reloads: self.controller.failed_reloads(),
        };
        self.telemetry.log_window();
        self.controller.shutdown();
        log::info!(
            "Stopped after {} frames ({} reloads, {} failed)",
            summary.frames,
            summary.reloads,
            summary.failed_reloads
        );
        Ok(summary)
    }
}
