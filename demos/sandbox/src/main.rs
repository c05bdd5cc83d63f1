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

//! Runs the demo game module headless and reloads it whenever it is rebuilt.
//!
//! ```text
//! cargo build -p game && cargo run -p sandbox
//! # in another terminal, edit demos/game and:
//! cargo build -p game
//! ```
//!
//! Settings come from `khora-live.ron` in the working directory; the module
//! path can be overridden with `KHORA_MODULE`.

use std::process::ExitCode;
use std::sync::atomic::Ordering;

use khora_infra::HeadlessPlatform;
use khora_sdk::{launch, RunSummary, RuntimeConfig};
use khora_telemetry::{logging, FatalError, OrFatal};

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(summary) => {
            log::info!(
                "Sandbox finished: {} frames, {} reloads, {} failed reloads",
                summary.frames,
                summary.reloads,
                summary.failed_reloads
            );
            ExitCode::SUCCESS
        }
        Err(fatal) => {
            fatal.log();
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<RunSummary, FatalError> {
    let config = RuntimeConfig::from_environment().or_fatal()?;
    let platform = HeadlessPlatform::new(
        config.frame_width,
        config.frame_height,
        config.audio_format(),
        config.audio_buffer_bytes as usize,
    );

    let runtime = launch(&config, platform).or_fatal()?;

    let running = runtime.run_flag();
    ctrlc::set_handler(move || {
        log::info!("Interrupt received, finishing the current frame");
        running.store(false, Ordering::SeqCst);
    })
    .or_fatal()?;

    runtime.run().or_fatal()
}
