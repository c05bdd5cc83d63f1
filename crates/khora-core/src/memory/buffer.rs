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

//! A fixed-capacity linear buffer handed across the module boundary.

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;
use std::slice;

use bytemuck::Pod;

use super::{ArenaError, ARENA_ALIGNMENT};

/// A fixed-capacity, bump-allocated byte region.
///
/// The backing storage is allocated once, zeroed, aligned to
/// [`ARENA_ALIGNMENT`], and never moved or resized afterwards. The layout is
/// `#[repr(C)]` because the buffer is read by the game module through the
/// [`MemoryArena`](super::MemoryArena) it is embedded in.
///
/// Invariant: `used <= capacity`.
#[repr(C)]
#[derive(Debug)]
pub struct Buffer {
    capacity: u32,
    used: u32,
    data: NonNull<u8>,
}

// SAFETY: the buffer exclusively owns its allocation; no aliasing pointer is kept elsewhere.
unsafe impl Send for Buffer {}

impl Buffer {
    /// Allocates a zeroed buffer of `capacity` bytes.
    pub(crate) fn allocate(capacity: u32) -> Result<Self, ArenaError> {
        if capacity == 0 {
            return Ok(Self {
                capacity: 0,
                used: 0,
                data: NonNull::dangling(),
            });
        }

        let layout = Self::layout(capacity)?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let data = NonNull::new(ptr).ok_or(ArenaError::AllocationFailed {
            bytes: capacity as usize,
        })?;

        Ok(Self {
            capacity,
            used: 0,
            data,
        })
    }

    fn layout(capacity: u32) -> Result<Layout, ArenaError> {
        Layout::from_size_align(capacity as usize, ARENA_ALIGNMENT).map_err(|_| {
            ArenaError::AllocationFailed {
                bytes: capacity as usize,
            }
        })
    }

    /// Total size of the buffer in bytes.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of bytes handed out since the last reset.
    #[inline]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Number of bytes still available for bump allocation.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.capacity - self.used
    }

    /// Rewinds the bump pointer. The bytes themselves are left untouched.
    #[inline]
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// The whole backing storage, regardless of how much is in use.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `data` points to `capacity` initialized bytes (or is dangling with length 0).
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.capacity as usize) }
    }

    /// Mutable view of the whole backing storage.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.capacity as usize) }
    }

    /// Bump-allocates `len` zeroed bytes aligned to `align`.
    pub fn alloc_bytes(&mut self, len: u32, align: usize) -> Result<&mut [u8], ArenaError> {
        if !align.is_power_of_two() || align > ARENA_ALIGNMENT {
            return Err(ArenaError::UnsupportedAlignment { align });
        }

        // The base pointer is ARENA_ALIGNMENT-aligned, so aligning the offset aligns the address.
        let align = align as u64;
        let start = (u64::from(self.used) + align - 1) & !(align - 1);
        let end = start + u64::from(len);
        if end > u64::from(self.capacity) {
            return Err(ArenaError::OutOfSpace {
                requested: end - u64::from(self.used),
                remaining: self.remaining(),
            });
        }

        self.used = end as u32;
        let region = &mut self.as_bytes_mut()[start as usize..end as usize];
        region.fill(0);
        Ok(region)
    }

    /// Bump-allocates a zeroed `T`.
    pub fn push<T: Pod>(&mut self) -> Result<&mut T, ArenaError> {
        let size = u32::try_from(mem::size_of::<T>()).map_err(|_| ArenaError::SlotTooLarge {
            size: mem::size_of::<T>(),
            capacity: self.capacity,
        })?;
        let bytes = self.alloc_bytes(size, mem::align_of::<T>())?;
        bytemuck::try_from_bytes_mut(bytes).map_err(|_| ArenaError::UnsupportedAlignment {
            align: mem::align_of::<T>(),
        })
    }

    /// Reinterprets the start of the buffer as the module's state type.
    ///
    /// This is the one place where arena bytes become a typed value. The
    /// contract between host and module is:
    ///
    /// * the slot lives at offset 0 and is `size_of::<T>()` bytes long,
    /// * `size_of::<T>()` must not exceed [`capacity`](Self::capacity),
    /// * `align_of::<T>()` must not exceed [`ARENA_ALIGNMENT`],
    /// * `T: Pod`, so any byte pattern (including the initial zeroes) is a valid `T`.
    ///
    /// The bump pointer is advanced past the slot so later `push` calls do not overlap it.
    pub fn slot<T: Pod>(&mut self) -> Result<&mut T, ArenaError> {
        let size = mem::size_of::<T>();
        let align = mem::align_of::<T>();
        if align > ARENA_ALIGNMENT {
            return Err(ArenaError::UnsupportedAlignment { align });
        }
        if size > self.capacity as usize {
            return Err(ArenaError::SlotTooLarge {
                size,
                capacity: self.capacity,
            });
        }

        self.used = self.used.max(size as u32);
        bytemuck::try_from_bytes_mut(&mut self.as_bytes_mut()[..size])
            .map_err(|_| ArenaError::UnsupportedAlignment { align })
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }
        if let Ok(layout) = Self::layout(self.capacity) {
            // SAFETY: allocated in `allocate` with this exact layout.
            unsafe { alloc::dealloc(self.data.as_ptr(), layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, Pod, Zeroable)]
    struct Counter {
        value: u64,
        step: u32,
        _pad: u32,
    }

    #[repr(C, align(128))]
    #[derive(Debug, Clone, Copy)]
    struct OverAligned {
        bytes: [u8; 128],
    }

    // SAFETY: plain bytes with no padding.
    unsafe impl Zeroable for OverAligned {}
    // SAFETY: plain bytes with no padding.
    unsafe impl Pod for OverAligned {}

    #[test]
    fn allocation_is_zeroed_and_aligned() {
        let buffer = Buffer::allocate(256).unwrap();
        assert_eq!(buffer.capacity(), 256);
        assert_eq!(buffer.used(), 0);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buffer.as_bytes().as_ptr() as usize % ARENA_ALIGNMENT, 0);
    }

    #[test]
    fn zero_capacity_buffer_is_valid() {
        let mut buffer = Buffer::allocate(0).unwrap();
        assert!(buffer.as_bytes().is_empty());
        assert!(matches!(
            buffer.alloc_bytes(1, 1),
            Err(ArenaError::OutOfSpace { .. })
        ));
    }

    #[test]
    fn bump_allocations_respect_alignment() {
        let mut buffer = Buffer::allocate(64).unwrap();
        buffer.alloc_bytes(3, 1).unwrap();
        assert_eq!(buffer.used(), 3);

        let aligned = buffer.alloc_bytes(8, 8).unwrap();
        assert_eq!(aligned.len(), 8);
        assert_eq!(buffer.used(), 16);
    }

    #[test]
    fn exhausting_the_buffer_reports_remaining_space() {
        let mut buffer = Buffer::allocate(16).unwrap();
        buffer.alloc_bytes(12, 1).unwrap();
        let err = buffer.alloc_bytes(8, 1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfSpace {
                requested: 8,
                remaining: 4
            }
        );
        assert_eq!(buffer.used(), 12, "a failed allocation must not move the bump pointer");
    }

    #[test]
    fn invalid_alignment_is_rejected() {
        let mut buffer = Buffer::allocate(64).unwrap();
        assert_eq!(
            buffer.alloc_bytes(4, 3).unwrap_err(),
            ArenaError::UnsupportedAlignment { align: 3 }
        );
        assert_eq!(
            buffer.alloc_bytes(4, 256).unwrap_err(),
            ArenaError::UnsupportedAlignment { align: 256 }
        );
    }

    #[test]
    fn reset_rewinds_without_clearing() {
        let mut buffer = Buffer::allocate(32).unwrap();
        buffer.alloc_bytes(4, 1).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        buffer.reset();
        assert_eq!(buffer.used(), 0);
        assert_eq!(&buffer.as_bytes()[..4], &[1, 2, 3, 4]);

        // Re-allocating hands the bytes out zeroed again.
        assert_eq!(buffer.alloc_bytes(4, 1).unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn slot_is_stable_across_calls() {
        let mut buffer = Buffer::allocate(128).unwrap();
        {
            let counter = buffer.slot::<Counter>().unwrap();
            counter.value = 41;
            counter.step = 1;
        }
        let counter = buffer.slot::<Counter>().unwrap();
        counter.value += counter.step as u64;
        assert_eq!(counter.value, 42);
        assert_eq!(buffer.used() as usize, mem::size_of::<Counter>());
    }

    #[test]
    fn push_does_not_overlap_the_slot() {
        let mut buffer = Buffer::allocate(128).unwrap();
        buffer.slot::<Counter>().unwrap().value = 7;
        let scratch = buffer.push::<Counter>().unwrap();
        scratch.value = 99;
        assert_eq!(buffer.slot::<Counter>().unwrap().value, 7);
    }

    #[test]
    fn slot_contract_is_enforced() {
        let mut small = Buffer::allocate(8).unwrap();
        assert_eq!(
            small.slot::<Counter>().unwrap_err(),
            ArenaError::SlotTooLarge {
                size: 16,
                capacity: 8
            }
        );

        let mut big = Buffer::allocate(512).unwrap();
        assert_eq!(
            big.slot::<OverAligned>().unwrap_err(),
            ArenaError::UnsupportedAlignment { align: 128 }
        );
    }
}
