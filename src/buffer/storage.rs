// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Aligned byte storage for `TimelineBuffer`, backed by `bytemuck` reinterpretation instead of
//! raw pointers so the crate can keep `unsafe_code = "forbid"`.

use bytemuck::{Pod, Zeroable};

use crate::errors::{alloc_failed_error, Result};

/// A 16-byte-aligned block of 16 bytes.
///
/// `Vec<AlignedChunk>` is guaranteed by `#[repr(align(16))]` to start on a 16-byte boundary,
/// which is the alignment every SIMD-layout buffer requires (invariant I1). Ordinary (non-SIMD)
/// layouts are stored in the same chunked region; they simply don't need the stricter alignment
/// it happens to provide.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, align(16))]
struct AlignedChunk([u8; 16]);

/// The alignment, in bytes, every `AlignedStorage` region satisfies.
pub const STORAGE_ALIGNMENT: usize = 16;

/// An owned, 16-byte-aligned region of bytes.
///
/// `AlignedStorage` never allocates after construction; growing requires replacing it with a new
/// `AlignedStorage` (the `TimelineBuffer` reallocation path does exactly this).
#[derive(Clone, Default)]
pub struct AlignedStorage {
    chunks: Vec<AlignedChunk>,
    len: usize,
}

impl AlignedStorage {
    /// Allocates a zero-filled, 16-byte-aligned region of exactly `len` bytes.
    ///
    /// Fails with `AllocFailed` if `len` would require a chunk count that overflows `usize`, or
    /// if `alignment` is not a power of two no greater than [`STORAGE_ALIGNMENT`] (every such
    /// alignment is satisfied automatically since the backing chunks are always 16-byte aligned).
    pub fn new(len: usize, alignment: usize) -> Result<Self> {
        if !alignment.is_power_of_two() || alignment > STORAGE_ALIGNMENT {
            return alloc_failed_error(
                "requested alignment exceeds the 16-byte guarantee this storage provides",
            );
        }

        let num_chunks = len.div_ceil(16);

        Ok(AlignedStorage { chunks: vec![AlignedChunk([0; 16]); num_chunks], len })
    }

    /// The number of valid bytes in this region (may be less than `chunks.len() * 16`).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// This storage's alignment in bytes. Always [`STORAGE_ALIGNMENT`].
    pub fn alignment(&self) -> usize {
        STORAGE_ALIGNMENT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.chunks)[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.chunks)[..self.len]
    }
}
