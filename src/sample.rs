// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sample` module defines the closed set of sample layouts a `TimelineBuffer` may hold, and
//! the per-variant stride/width rules that every other component relies on.

/// `SampleLayout` is a closed, tagged enumeration of every sample representation a
/// `TimelineBuffer` can store.
///
/// A layout fully determines the per-channel bit width and, together with the channel count, the
/// buffer's stride (`bytes_per_sample`). Typed accessors validate a buffer's declared layout
/// before decoding; there is no implicit cast from raw bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum SampleLayout {
    /// Single-bit digital channels, packed 8 per byte.
    Digital1,
    /// Four-bit digital (nibble) channels, packed 2 per byte.
    Digital4,
    /// Eight-bit digital channels, one per byte.
    Digital8,
    /// Signed 8-bit analog samples.
    AnalogI8,
    /// Single-precision floating point analog samples.
    AnalogF32,
    /// Double-precision floating point analog samples.
    AnalogF64,
    /// Exactly 8 channels of signed 16-bit analog samples, interleaved at a fixed 16-byte stride
    /// so one aligned 128-bit vector load covers an entire sample.
    Simd_I16x8,
    /// Exactly 8 channels of signed 24-bit analog samples, interleaved in SIMD channel order.
    Simd_I24x8,
}

impl SampleLayout {
    /// The number of bits occupied by a single channel value in this layout.
    pub fn bit_width(self) -> u32 {
        match self {
            SampleLayout::Digital1 => 1,
            SampleLayout::Digital4 => 4,
            SampleLayout::Digital8 => 8,
            SampleLayout::AnalogI8 => 8,
            SampleLayout::AnalogF32 => 32,
            SampleLayout::AnalogF64 => 64,
            SampleLayout::Simd_I16x8 => 16,
            SampleLayout::Simd_I24x8 => 24,
        }
    }

    /// `true` if this layout is one of the fixed-channel-count SIMD layouts.
    pub fn is_simd(self) -> bool {
        matches!(self, SampleLayout::Simd_I16x8 | SampleLayout::Simd_I24x8)
    }

    /// For SIMD layouts, the fixed logical channel count (always 8). `None` otherwise, meaning
    /// the channel count is caller-specified at allocation time.
    pub fn fixed_channel_count(self) -> Option<u8> {
        if self.is_simd() {
            Some(8)
        }
        else {
            None
        }
    }

    /// Computes `bytes_per_sample` for `channel_count` channels of this layout.
    ///
    /// For `Simd_I16x8`, the stride is fixed at 16 bytes regardless of how many of the 8 lanes
    /// are actually in use, so a single aligned vector load always covers one full sample. Every
    /// other layout uses `ceil(channel_count * bit_width / 8)`.
    pub fn bytes_per_sample(self, channel_count: u8) -> u32 {
        if let SampleLayout::Simd_I16x8 = self {
            return 16;
        }

        let bits = u32::from(channel_count) * self.bit_width();
        bits.div_ceil(8)
    }
}
