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

//! Contracts between the runtime and the platform layer.
//!
//! Window creation, presentation, audio devices and keyboard capture live
//! outside the runtime. They meet it through the [`Platform`] trait and the
//! `#[repr(C)]` views defined here, which are also what the game module sees.

mod frame;
mod input;
mod sound;

pub use frame::{FrameBuffer, Pixel};
pub use input::{Input, Key, MAX_KEYS};
pub use sound::{AudioFormat, SoundBuffer};

/// The abstract contract for a platform backend driving the runtime loop.
///
/// Any windowing or headless backend can implement this trait. The runtime
/// calls the methods in a fixed order once per iteration: `poll_input`,
/// `frame_buffer`, `present`, then `sound_buffer`.
pub trait Platform {
    /// Pumps pending platform events and records key events into `input`.
    ///
    /// `input` is cleared by the caller beforehand. Returns `false` once the
    /// platform wants the loop to stop.
    fn poll_input(&mut self, input: &mut Input) -> bool;

    /// Lends the frame buffer to be drawn this iteration.
    fn frame_buffer(&mut self) -> FrameBuffer<'_>;

    /// Shows the frame drawn since the last call.
    fn present(&mut self);

    /// Lends an audio buffer if the device wants more samples, `None` otherwise.
    fn sound_buffer(&mut self) -> Option<SoundBuffer<'_>>;
}
