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

//! A windowless [`Platform`] that keeps frames and audio in memory.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use khora_core::platform::{AudioFormat, FrameBuffer, Input, Key, Pixel, Platform, SoundBuffer};

/// A platform with no window and no audio device.
///
/// Frames are drawn into an owned pixel buffer and never shown; audio is
/// requested every iteration and discarded. Key events are queued by hand.
/// The loop stops when the shared run flag is cleared or after an optional
/// number of iterations.
#[derive(Debug)]
pub struct HeadlessPlatform {
    width: i32,
    height: i32,
    pixels: Vec<Pixel>,
    samples: Vec<i16>,
    format: AudioFormat,
    pending: VecDeque<Key>,
    running: Arc<AtomicBool>,
    frame_limit: Option<u64>,
    polled: u64,
    presented: u64,
    sound_requests: u64,
}

impl HeadlessPlatform {
    /// Creates a platform with a `width` x `height` frame and an audio buffer
    /// of `audio_buffer_bytes` in `format`.
    ///
    /// Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32, format: AudioFormat, audio_buffer_bytes: usize) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            pixels: vec![Pixel::default(); width as usize * height as usize],
            samples: vec![0; format.samples_in(audio_buffer_bytes)],
            format,
            pending: VecDeque::new(),
            running: Arc::new(AtomicBool::new(true)),
            frame_limit: None,
            polled: 0,
            presented: 0,
            sound_requests: 0,
        }
    }

    /// Stops the loop after `frames` iterations.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// The flag polled at the start of every iteration. Clearing it stops the loop.
    pub fn run_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Queues a key event for a later iteration.
    pub fn queue_key(&mut self, key: Key) {
        self.pending.push_back(key);
    }

    /// The audio format of the sound buffer.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// The last drawn frame.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// The samples written by the last `Sound` call.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// How many frames were presented.
    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// How many times a sound buffer was handed out.
    pub fn sound_requests(&self) -> u64 {
        self.sound_requests
    }
}

impl Platform for HeadlessPlatform {
    fn poll_input(&mut self, input: &mut Input) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }
        if self.frame_limit.is_some_and(|limit| self.polled >= limit) {
            log::debug!("Headless platform reached its frame limit of {}", self.polled);
            return false;
        }
        self.polled += 1;

        while !input.is_full() {
            match self.pending.pop_front() {
                Some(key) => {
                    input.push(key);
                }
                None => break,
            }
        }
        true
    }

    fn frame_buffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(&mut self.pixels, self.width, self.height)
            .unwrap_or_else(FrameBuffer::empty)
    }

    fn present(&mut self) {
        self.presented += 1;
        log::trace!("Presented frame {}", self.presented);
    }

    fn sound_buffer(&mut self) -> Option<SoundBuffer<'_>> {
        if self.samples.is_empty() {
            return None;
        }
        self.sound_requests += 1;
        self.samples.fill(0);
        let rate = self.format.sample_rate;
        SoundBuffer::new(&mut self.samples).map(|sound| sound.with_sample_rate(rate))
    }
}
