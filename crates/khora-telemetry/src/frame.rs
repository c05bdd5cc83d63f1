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

//! Per-frame timing statistics.

use std::fmt;
use std::time::Duration;

/// Statistics for the frames recorded since the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frames in the window.
    pub frames: u64,
    /// Mean frame time.
    pub average: Duration,
    /// Longest frame time.
    pub worst: Duration,
}

impl FrameSummary {
    /// Frames per second implied by the average frame time.
    pub fn fps(&self) -> f64 {
        let secs = self.average.as_secs_f64();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, avg {:.2} ms ({:.1} fps), worst {:.2} ms",
            self.frames,
            self.average.as_secs_f64() * 1000.0,
            self.fps(),
            self.worst.as_secs_f64() * 1000.0
        )
    }
}

/// Accumulates frame times and reports them window by window.
#[derive(Debug, Default, Clone)]
pub struct FrameTelemetry {
    total_frames: u64,
    window_frames: u64,
    window_time: Duration,
    window_worst: Duration,
}

impl FrameTelemetry {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame.
    pub fn record(&mut self, elapsed: Duration) {
        self.total_frames += 1;
        self.window_frames += 1;
        self.window_time += elapsed;
        self.window_worst = self.window_worst.max(elapsed);
    }

    /// Frames recorded since creation.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Closes the current window and returns its statistics.
    ///
    /// Returns `None` if no frame was recorded in the window.
    pub fn flush(&mut self) -> Option<FrameSummary> {
        if self.window_frames == 0 {
            return None;
        }
        let summary = FrameSummary {
            frames: self.window_frames,
            average: mean(self.window_time, self.window_frames),
            worst: self.window_worst,
        };
        self.window_frames = 0;
        self.window_time = Duration::ZERO;
        self.window_worst = Duration::ZERO;
        Some(summary)
    }

    /// Flushes the window and logs it at `info` level.
    pub fn log_window(&mut self) {
        if let Some(summary) = self.flush() {
            log::info!("Frame stats: {summary}");
        }
    }
}

fn mean(total: Duration, frames: u64) -> Duration {
    let nanos = total.as_nanos() / u128::from(frames.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
