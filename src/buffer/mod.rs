// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `TimelineBuffer`, the crate's central type: an aligned, byte-addressable store for a fixed
//! number of samples across a fixed number of channels, tagged with the [`SampleLayout`] and
//! [`TimeBase`] that give its bytes meaning.

pub mod plan;
pub mod storage;

use bytemuck::{bytes_of, pod_read_unaligned};

use crate::errors::{bad_shape_error, out_of_bounds_error, type_mismatch_error, Result};
use crate::sample::SampleLayout;
use crate::units::TimeBase;

pub use plan::{InterpolationPlan, PlanEntry};
pub use storage::{AlignedStorage, STORAGE_ALIGNMENT};

/// An in-memory, uniformly-sampled, multi-channel timeline of samples.
///
/// A `TimelineBuffer` owns one contiguous, 16-byte-aligned byte region (invariant I1), and knows
/// how to carve it into fixed-stride samples according to its [`SampleLayout`] and channel count
/// (invariant I2). Typed accessors (`read_*`/`write_*`) validate the requested layout against the
/// buffer's own before touching any bytes (invariant I3); everything else — sample-rate
/// conversion, min/max aggregation, layout adaptation — is built on top of these accessors and the
/// raw byte view they share.
pub struct TimelineBuffer {
    storage: AlignedStorage,
    layout: SampleLayout,
    channel_count: u8,
    sample_count: u32,
    bytes_per_sample: u32,
    time_base: TimeBase,
}

impl TimelineBuffer {
    /// Allocates a new, zero-filled `TimelineBuffer` with `sample_count` samples of
    /// `channel_count` channels of `layout`, clocked by `time_base`.
    ///
    /// `channel_count` is ignored in favor of [`SampleLayout::fixed_channel_count`] for the SIMD
    /// layouts; passing a mismatched count for those layouts is not an error, it is simply
    /// overridden, matching how the original reference implementation always reports 8 channels
    /// for `Simd_I16x8`/`Simd_I24x8` regardless of what the caller asked for.
    ///
    /// Fails with `BadShape` if `sample_count` or `channel_count` is zero, or `AllocFailed` if the
    /// backing storage cannot be sized (invariant I1, checked by `AlignedStorage::new`).
    pub fn allocate(
        layout: SampleLayout,
        channel_count: u8,
        sample_count: u32,
        time_base: TimeBase,
    ) -> Result<Self> {
        if sample_count == 0 {
            return bad_shape_error("sample_count must be at least 1");
        }

        let channel_count = layout.fixed_channel_count().unwrap_or(channel_count);
        if channel_count == 0 {
            return bad_shape_error("channel_count must be at least 1");
        }

        let bytes_per_sample = layout.bytes_per_sample(channel_count);
        let total_bytes = bytes_per_sample as usize * sample_count as usize;

        let alignment = if layout.is_simd() { STORAGE_ALIGNMENT } else { 1 };
        let storage = AlignedStorage::new(total_bytes, alignment)?;

        Ok(TimelineBuffer {
            storage,
            layout,
            channel_count,
            sample_count,
            bytes_per_sample,
            time_base,
        })
    }

    /// An empty, zero-sample placeholder buffer. Useful as a destination that `reallocate` will
    /// immediately replace.
    pub fn empty(layout: SampleLayout, time_base: TimeBase) -> Self {
        let channel_count = layout.fixed_channel_count().unwrap_or(1);
        TimelineBuffer {
            storage: AlignedStorage::default(),
            layout,
            channel_count,
            sample_count: 0,
            bytes_per_sample: layout.bytes_per_sample(channel_count),
            time_base,
        }
    }

    /// Releases this buffer's storage, leaving it in the same state as [`TimelineBuffer::empty`].
    pub fn free(&mut self) {
        self.storage = AlignedStorage::default();
        self.sample_count = 0;
    }

    /// Reallocates this buffer in place to `sample_count` samples, discarding existing contents.
    ///
    /// Equivalent to `*self = TimelineBuffer::allocate(self.layout, self.channel_count,
    /// sample_count, self.time_base)?`, provided as a convenience so callers don't need to thread
    /// the layout/channel/time-base triple back through themselves.
    pub fn reallocate(&mut self, sample_count: u32) -> Result<()> {
        *self = TimelineBuffer::allocate(self.layout, self.channel_count, sample_count, self.time_base)?;
        Ok(())
    }

    pub fn layout(&self) -> SampleLayout {
        self.layout
    }

    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn bytes_per_sample(&self) -> u32 {
        self.bytes_per_sample
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    /// The sampling frequency in Hz implied by this buffer's time base.
    pub fn frequency_hz(&self) -> f64 {
        self.time_base.frequency_hz()
    }

    pub fn total_time_sec(&self) -> f64 {
        self.time_base.total_time_sec(self.sample_count as usize)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_bytes()
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.storage.as_bytes_mut()
    }

    /// The byte offset of the first byte of sample `sample_index`.
    ///
    /// Fails with `OutOfBounds` if `sample_index >= sample_count`.
    pub fn sample_byte_offset(&self, sample_index: u32) -> Result<usize> {
        if sample_index >= self.sample_count {
            return out_of_bounds_error("sample index exceeds buffer's sample count");
        }
        Ok(sample_index as usize * self.bytes_per_sample as usize)
    }

    /// Validates that this buffer's layout is exactly `expected`, for use by typed accessors.
    fn require_layout(&self, expected: SampleLayout) -> Result<()> {
        if self.layout != expected {
            return type_mismatch_error("accessor's layout does not match buffer's declared layout");
        }
        Ok(())
    }

    /// Byte range for channel `channel` of sample `sample_index`, given a per-channel byte width.
    fn channel_byte_range(
        &self,
        sample_index: u32,
        channel: u8,
        channel_width: usize,
    ) -> Result<std::ops::Range<usize>> {
        if channel >= self.channel_count {
            return out_of_bounds_error("channel index exceeds buffer's channel count");
        }
        let sample_offset = self.sample_byte_offset(sample_index)?;
        let start = sample_offset + channel as usize * channel_width;
        Ok(start..start + channel_width)
    }

    /// Reads channel `channel` of sample `sample_index` as a signed 8-bit analog value.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `AnalogI8`.
    pub fn read_i8(&self, sample_index: u32, channel: u8) -> Result<i8> {
        self.require_layout(SampleLayout::AnalogI8)?;
        let range = self.channel_byte_range(sample_index, channel, 1)?;
        Ok(self.as_bytes()[range][0] as i8)
    }

    /// Writes channel `channel` of sample `sample_index` as a signed 8-bit analog value.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `AnalogI8`.
    pub fn write_i8(&mut self, sample_index: u32, channel: u8, value: i8) -> Result<()> {
        self.require_layout(SampleLayout::AnalogI8)?;
        let range = self.channel_byte_range(sample_index, channel, 1)?;
        self.as_bytes_mut()[range][0] = value as u8;
        Ok(())
    }

    /// Reads channel `channel` of sample `sample_index` as a single-precision float.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `AnalogF32`.
    pub fn read_f32(&self, sample_index: u32, channel: u8) -> Result<f32> {
        self.require_layout(SampleLayout::AnalogF32)?;
        let range = self.channel_byte_range(sample_index, channel, 4)?;
        Ok(pod_read_unaligned(&self.as_bytes()[range]))
    }

    /// Writes channel `channel` of sample `sample_index` as a single-precision float.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `AnalogF32`.
    pub fn write_f32(&mut self, sample_index: u32, channel: u8, value: f32) -> Result<()> {
        self.require_layout(SampleLayout::AnalogF32)?;
        let range = self.channel_byte_range(sample_index, channel, 4)?;
        self.as_bytes_mut()[range].copy_from_slice(bytes_of(&value));
        Ok(())
    }

    /// Reads all 8 lanes of sample `sample_index` as signed 16-bit analog values.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `Simd_I16x8`.
    pub fn read_i16_simd(&self, sample_index: u32) -> Result<[i16; 8]> {
        self.require_layout(SampleLayout::Simd_I16x8)?;
        let offset = self.sample_byte_offset(sample_index)?;
        let bytes = &self.as_bytes()[offset..offset + 16];
        Ok(decode_i16x8(bytes))
    }

    /// Writes all 8 lanes of sample `sample_index` as signed 16-bit analog values.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `Simd_I16x8`.
    pub fn write_i16_simd(&mut self, sample_index: u32, values: [i16; 8]) -> Result<()> {
        self.require_layout(SampleLayout::Simd_I16x8)?;
        let offset = self.sample_byte_offset(sample_index)?;
        let bytes = &mut self.as_bytes_mut()[offset..offset + 16];
        bytes.copy_from_slice(bytes_of(&values));
        Ok(())
    }

    /// Reads all 8 lanes of sample `sample_index` as signed 24-bit analog values, sign-extended
    /// into `i32`.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `Simd_I24x8`.
    pub fn read_i24_simd(&self, sample_index: u32) -> Result<[i32; 8]> {
        self.require_layout(SampleLayout::Simd_I24x8)?;
        let offset = self.sample_byte_offset(sample_index)?;
        let bytes = &self.as_bytes()[offset..offset + 24];
        let mut out = [0i32; 8];
        for (lane, chunk) in out.iter_mut().zip(bytes.chunks_exact(3)) {
            *lane = crate::util::sign_extend_i24(chunk[0], chunk[1], chunk[2]);
        }
        Ok(out)
    }

    /// Writes all 8 lanes of sample `sample_index` as signed 24-bit analog values, truncating each
    /// `i32` lane to its low 24 bits.
    ///
    /// Fails with `TypeMismatch` unless this buffer's layout is `Simd_I24x8`.
    pub fn write_i24_simd(&mut self, sample_index: u32, values: [i32; 8]) -> Result<()> {
        self.require_layout(SampleLayout::Simd_I24x8)?;
        let offset = self.sample_byte_offset(sample_index)?;
        let bytes = &mut self.as_bytes_mut()[offset..offset + 24];
        for (lane, chunk) in values.iter().zip(bytes.chunks_exact_mut(3)) {
            let le = lane.to_le_bytes();
            chunk.copy_from_slice(&le[..3]);
        }
        Ok(())
    }
}

/// Decodes a 16-byte SIMD sample into its 8 `i16` lanes. Exposed at crate-private scope so backend
/// kernels can bypass the layout check `read_i16_simd` pays for, when they've already validated
/// the layout once for the whole buffer.
pub(crate) fn decode_i16x8(bytes: &[u8]) -> [i16; 8] {
    let mut out = [0i16; 8];
    for (lane, chunk) in out.iter_mut().zip(bytes.chunks_exact(2)) {
        *lane = pod_read_unaligned(chunk);
    }
    out
}

/// Flattens a `Simd_I16x8` buffer into a lane-major `Vec<i16>` (`out[idx * 8 + lane]`), the shape
/// every backend kernel expects. Shared by the resample and min/max engines so they read samples
/// identically.
pub(crate) fn read_i16x8_flat(buf: &TimelineBuffer) -> Result<Vec<i16>> {
    let mut out = Vec::with_capacity(buf.sample_count() as usize * 8);
    for i in 0..buf.sample_count() {
        out.extend_from_slice(&buf.read_i16_simd(i)?);
    }
    Ok(out)
}

/// Writes a lane-major `[i16]` slice (as produced by a backend kernel) back into a `Simd_I16x8`
/// buffer, the inverse of [`read_i16x8_flat`].
pub(crate) fn write_i16x8_flat(buf: &mut TimelineBuffer, flat: &[i16]) -> Result<()> {
    for i in 0..buf.sample_count() {
        let offset = i as usize * 8;
        let lanes: [i16; 8] = flat[offset..offset + 8].try_into().expect("flat buffer sized by caller");
        buf.write_i16_simd(i, lanes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tb() -> TimeBase {
        TimeBase::new(1, -6)
    }

    #[test]
    fn verify_allocate_zero_fills_and_sizes_storage() {
        let buf = TimelineBuffer::allocate(SampleLayout::AnalogI8, 4, 100, tb()).unwrap();
        assert_eq!(buf.channel_count(), 4);
        assert_eq!(buf.sample_count(), 100);
        assert_eq!(buf.bytes_per_sample(), 4);
        assert_eq!(buf.as_bytes().len(), 400);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn verify_simd_layout_forces_channel_count_and_alignment() {
        let buf = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 1, 10, tb()).unwrap();
        assert_eq!(buf.channel_count(), 8);
        assert_eq!(buf.bytes_per_sample(), 16);
        assert_eq!(buf.as_bytes().as_ptr() as usize % STORAGE_ALIGNMENT, 0);
    }

    #[test]
    fn verify_rejects_zero_sample_count() {
        assert!(TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 0, tb()).is_err());
    }

    #[test]
    fn verify_i8_round_trip() {
        let mut buf = TimelineBuffer::allocate(SampleLayout::AnalogI8, 2, 4, tb()).unwrap();
        buf.write_i8(0, 1, -5).unwrap();
        assert_eq!(buf.read_i8(0, 1).unwrap(), -5);
        assert!(buf.read_f32(0, 0).is_err(), "wrong-layout accessor must fail");
    }

    #[test]
    fn verify_f32_round_trip() {
        let mut buf = TimelineBuffer::allocate(SampleLayout::AnalogF32, 2, 4, tb()).unwrap();
        buf.write_f32(2, 0, 3.5).unwrap();
        assert_eq!(buf.read_f32(2, 0).unwrap(), 3.5);
    }

    #[test]
    fn verify_i16_simd_round_trip() {
        let mut buf = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 8, 3, tb()).unwrap();
        let values = [1, -2, 3, -4, 5, -6, 7, -8];
        buf.write_i16_simd(1, values).unwrap();
        assert_eq!(buf.read_i16_simd(1).unwrap(), values);
    }

    #[test]
    fn verify_i24_simd_round_trip_with_sign_extension() {
        let mut buf = TimelineBuffer::allocate(SampleLayout::Simd_I24x8, 8, 2, tb()).unwrap();
        let mut values = [0i32; 8];
        values[0] = -1;
        values[1] = 0x7F_FFFF;
        values[2] = -0x80_0000;
        buf.write_i24_simd(0, values).unwrap();
        assert_eq!(buf.read_i24_simd(0).unwrap(), values);
    }

    #[test]
    fn verify_out_of_bounds_sample_index() {
        let buf = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 2, tb()).unwrap();
        assert!(buf.read_i8(5, 0).is_err());
    }

    #[test]
    fn verify_reallocate_resets_contents() {
        let mut buf = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 4, tb()).unwrap();
        buf.write_i8(0, 0, 9).unwrap();
        buf.reallocate(10).unwrap();
        assert_eq!(buf.sample_count(), 10);
        assert_eq!(buf.read_i8(0, 0).unwrap(), 0);
    }
}
