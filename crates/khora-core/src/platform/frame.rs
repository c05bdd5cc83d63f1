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

//! The frame buffer view lent to the game module each iteration.

use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

use bytemuck::{Pod, Zeroable};

/// One RGBA8 pixel, laid out `RR GG BB AA` in memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Pixel {
    /// Builds an opaque pixel.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A row-major view over pixel storage owned by the platform layer.
///
/// The view borrows the storage for `'a`; the game module only ever receives
/// it by `&mut` for the duration of one `Update` call.
#[repr(C)]
#[derive(Debug)]
pub struct FrameBuffer<'a> {
    width: i32,
    height: i32,
    pixels: NonNull<Pixel>,
    _storage: PhantomData<&'a mut [Pixel]>,
}

impl<'a> FrameBuffer<'a> {
    /// Wraps `pixels` as a `width` x `height` image.
    ///
    /// Returns `None` if either dimension is negative or if `pixels` does not
    /// hold exactly `width * height` entries.
    pub fn new(pixels: &'a mut [Pixel], width: i32, height: i32) -> Option<Self> {
        if width < 0 || height < 0 {
            return None;
        }
        let expected = (width as usize).checked_mul(height as usize)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: NonNull::from(pixels).cast(),
            _storage: PhantomData,
        })
    }

    /// A zero-sized frame that owns nothing.
    pub const fn empty() -> Self {
        FrameBuffer {
            width: 0,
            height: 0,
            pixels: NonNull::dangling(),
            _storage: PhantomData,
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[Pixel] {
        // SAFETY: constructed from a slice of exactly `width * height` pixels borrowed for `'a`.
        unsafe { slice::from_raw_parts(self.pixels.as_ptr(), self.len()) }
    }

    /// All pixels, row by row, mutably.
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        // SAFETY: as above; `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.pixels.as_ptr(), self.len()) }
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: Pixel) {
        self.pixels_mut().fill(color);
    }

    /// Fills the half-open rectangle `[left, right) x [top, bottom)`, clipped to the frame.
    pub fn fill_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32, color: Pixel) {
        let left = left.clamp(0, self.width) as usize;
        let right = right.clamp(0, self.width) as usize;
        let top = top.clamp(0, self.height) as usize;
        let bottom = bottom.clamp(0, self.height) as usize;
        if left >= right || top >= bottom {
            return;
        }

        let stride = self.width as usize;
        let pixels = self.pixels_mut();
        for y in top..bottom {
            pixels[y * stride + left..y * stride + right].fill(color);
        }
    }

    fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_storage() {
        let mut pixels = vec![Pixel::default(); 10];
        assert!(FrameBuffer::new(&mut pixels, 4, 4).is_none());
        assert!(FrameBuffer::new(&mut pixels, -2, -5).is_none());
        assert!(FrameBuffer::new(&mut pixels, 5, 2).is_some());
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut pixels = vec![Pixel::default(); 4 * 3];
        let mut frame = FrameBuffer::new(&mut pixels, 4, 3).unwrap();
        let yellow = Pixel::rgb(255, 255, 0);

        frame.fill_rect(-5, 1, 2, 10, yellow);

        let painted: Vec<bool> = frame.pixels().iter().map(|p| *p == yellow).collect();
        #[rustfmt::skip]
        assert_eq!(painted, vec![
            false, false, false, false,
            true,  true,  false, false,
            true,  true,  false, false,
        ]);
    }

    #[test]
    fn empty_frame_has_no_pixels() {
        let mut frame = FrameBuffer::empty();
        frame.fill(Pixel::rgb(1, 1, 1));
        assert!(frame.pixels().is_empty());
    }

    #[test]
    fn empty_rect_is_a_no_op() {
        let mut pixels = vec![Pixel::default(); 4];
        let mut frame = FrameBuffer::new(&mut pixels, 2, 2).unwrap();
        frame.fill_rect(1, 1, 1, 2, Pixel::rgb(1, 2, 3));
        assert!(frame.pixels().iter().all(|p| *p == Pixel::default()));
    }
}
