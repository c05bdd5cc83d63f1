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

//! A demo game module: a pulsing green background, a yellow square moved
//! with WASD, and a stereo tone. Edit, rebuild, and watch the running
//! sandbox pick up the change without losing the square's position.

#![allow(non_snake_case)]

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use khora_core::memory::MemoryArena;
use khora_core::platform::{FrameBuffer, Input, Pixel, SoundBuffer};

const SPEED: i32 = 10;
const SQUARE: (i32, i32, i32, i32) = (20, 20, 100, 100);
const YELLOW: Pixel = Pixel::rgb(255, 255, 0);
const LEFT_TONE_HZ: f32 = 440.0;
const RIGHT_TONE_HZ: f32 = 220.0;
const AMPLITUDE: f32 = 32767.0;

/// Everything the game keeps between frames, stored at the start of the
/// persistent arena buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameState {
    /// Green level of the background, 0..=255.
    pub offset: i32,
    /// Whether the background is getting brighter (non-zero) or darker.
    pub increase: u32,
    /// Phase of the left channel tone, in radians.
    pub theta: f32,
    /// Phase of the right channel tone, in radians.
    pub alpha: f32,
    /// Horizontal offset of the square.
    pub x: i32,
    /// Vertical offset of the square.
    pub y: i32,
}

impl GameState {
    fn pulse(&mut self) {
        if self.offset >= 255 {
            self.increase = 0;
        }
        if self.offset <= 0 {
            self.increase = 1;
        }
        self.offset += if self.increase != 0 { 1 } else { -1 };
    }

    fn steer(&mut self, input: &Input) {
        for key in input.keys() {
            match key.as_char() {
                Some('a') => self.x -= SPEED,
                Some('d') => self.x += SPEED,
                Some('w') => self.y -= SPEED,
                Some('s') => self.y += SPEED,
                _ => {}
            }
        }
    }
}

/// Seeds the game state.
#[no_mangle]
pub extern "C" fn Initialize(arena: &mut MemoryArena) {
    if let Ok(state) = arena.state::<GameState>() {
        *state = GameState {
            increase: 1,
            ..GameState::default()
        };
    }
}

/// Advances the game by one frame and draws it.
#[no_mangle]
pub extern "C" fn Update(arena: &mut MemoryArena, frame: &mut FrameBuffer<'_>, input: &Input) {
    let Ok(state) = arena.state::<GameState>() else {
        return;
    };
    state.steer(input);
    state.pulse();

    frame.fill(Pixel::rgb(0, state.offset.clamp(0, 255) as u8, 0));
    let (left, top, right, bottom) = SQUARE;
    frame.fill_rect(
        left + state.x,
        top + state.y,
        right + state.x,
        bottom + state.y,
        YELLOW,
    );
}

/// Fills `sound` with a 440 Hz tone on the left and 220 Hz on the right.
#[no_mangle]
pub extern "C" fn Sound(arena: &mut MemoryArena, sound: &mut SoundBuffer<'_>) {
    if !arena.is_initialized() {
        sound.silence();
        return;
    }
    let Ok(state) = arena.state::<GameState>() else {
        sound.silence();
        return;
    };

    let sample_rate = sound.samples_per_second().max(1) as f32;
    let left_step = TAU * LEFT_TONE_HZ / sample_rate;
    let right_step = TAU * RIGHT_TONE_HZ / sample_rate;

    for pair in sound.stereo_frames_mut() {
        pair[0] = (state.theta.sin() * AMPLITUDE) as i16;
        pair[1] = (state.alpha.sin() * AMPLITUDE) as i16;

        state.theta += left_step;
        state.alpha += right_step;
        if state.theta > TAU {
            state.theta -= TAU;
        }
        if state.alpha > TAU {
            state.alpha -= TAU;
        }
    }
}
