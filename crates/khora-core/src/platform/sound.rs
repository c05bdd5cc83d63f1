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

//! The audio output view and its stream format.

use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

/// Describes the PCM stream the platform audio layer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// The number of channels (e.g., 2 for stereo).
    pub channels: u16,
    /// The number of frames per second (e.g., 44100 Hz).
    pub sample_rate: u32,
    /// Bits per single-channel sample.
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Interleaved signed 16-bit stereo at 44.1 kHz.
    pub const STEREO_16: AudioFormat = AudioFormat {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
    };

    /// Size of one frame (one sample per channel) in bytes.
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// How many individual samples fit in `bytes`, rounded down to whole frames.
    pub fn samples_in(&self, bytes: usize) -> usize {
        let frame = self.bytes_per_frame();
        if frame == 0 {
            return 0;
        }
        (bytes / frame) * self.channels as usize
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::STEREO_16
    }
}

/// A view over interleaved stereo 16-bit samples owned by the platform layer.
///
/// `sample_count` counts individual `i16` samples, both channels included.
/// `samples_per_second` is the playback rate, so a module can compute its
/// phase steps without knowing the platform's [`AudioFormat`].
#[repr(C)]
#[derive(Debug)]
pub struct SoundBuffer<'a> {
    samples_per_second: u32,
    sample_count: u32,
    samples: NonNull<i16>,
    _storage: PhantomData<&'a mut [i16]>,
}

impl<'a> SoundBuffer<'a> {
    /// Wraps `samples`, played back at the [`AudioFormat::STEREO_16`] rate.
    ///
    /// Returns `None` if the slice length does not fit in a `u32`.
    pub fn new(samples: &'a mut [i16]) -> Option<Self> {
        let sample_count = u32::try_from(samples.len()).ok()?;
        Some(Self {
            samples_per_second: AudioFormat::STEREO_16.sample_rate,
            sample_count,
            samples: NonNull::from(samples).cast(),
            _storage: PhantomData,
        })
    }

    /// Sets the playback rate in frames per second.
    pub fn with_sample_rate(mut self, samples_per_second: u32) -> Self {
        self.samples_per_second = samples_per_second;
        self
    }

    /// Playback rate in frames per second.
    #[inline]
    pub fn samples_per_second(&self) -> u32 {
        self.samples_per_second
    }

    /// Number of individual samples (left and right counted separately).
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// The interleaved samples.
    pub fn samples(&self) -> &[i16] {
        // SAFETY: constructed from a slice of exactly `sample_count` samples borrowed for `'a`.
        unsafe { slice::from_raw_parts(self.samples.as_ptr(), self.sample_count as usize) }
    }

    /// The interleaved samples, mutably.
    pub fn samples_mut(&mut self) -> &mut [i16] {
        // SAFETY: as above; `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.samples.as_ptr(), self.sample_count as usize) }
    }

    /// Iterates over `[left, right]` pairs. A trailing odd sample is skipped.
    pub fn stereo_frames_mut(&mut self) -> impl Iterator<Item = &mut [i16]> + '_ {
        self.samples_mut().chunks_exact_mut(2)
    }

    /// Writes silence over the whole buffer.
    pub fn silence(&mut self) {
        self.samples_mut().fill(0);
    }
}
