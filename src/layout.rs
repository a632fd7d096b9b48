// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `LayoutAdapter` converts between scalar `AnalogI8` buffers and the SIMD-aligned `Simd_I16x8`
//! layout that the resampling and min/max kernels operate on.
//!
//! This is a narrow, single-purpose utility: it moves one channel at a time between the two
//! layouts and leaves clipping and channel-selection policy to the caller.

use crate::buffer::TimelineBuffer;
use crate::errors::Result;
use crate::sample::SampleLayout;

/// Allocates `dst` as an 8-channel `Simd_I16x8` buffer with the same sample count and time base as
/// `src`, ready to receive one or more channels via [`widen_channel`].
///
/// `src` need not itself be `AnalogI8`; only its sample count and time base are used. The
/// function is named for its primary use (adapting an `AnalogI8` source) but works from any
/// buffer shape.
pub fn prepare_simd_i16x8_from_i8(src: &TimelineBuffer, dst: &mut TimelineBuffer) -> Result<()> {
    *dst = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 8, src.sample_count(), src.time_base())?;
    Ok(())
}

/// Copies `src`'s channel `src_channel` (an `AnalogI8` buffer) into lane `dst_channel` of `dst` (a
/// `Simd_I16x8` buffer), sign-extending each `i8` value into its `i16` lane.
///
/// Fails with `TypeMismatch` if `src` is not `AnalogI8` or `dst` is not `Simd_I16x8`, or with
/// `OutOfBounds` if either channel index or the sample counts disagree.
pub fn widen_channel(
    src: &TimelineBuffer,
    dst: &mut TimelineBuffer,
    src_channel: u8,
    dst_channel: u8,
) -> Result<()> {
    if src.sample_count() != dst.sample_count() {
        return crate::errors::out_of_bounds_error("src and dst sample counts must match");
    }
    if dst_channel >= 8 {
        return crate::errors::out_of_bounds_error("dst_channel must be in 0..8 for Simd_I16x8");
    }

    for i in 0..src.sample_count() {
        let value = src.read_i8(i, src_channel)?;
        let mut lanes = dst.read_i16_simd(i)?;
        lanes[dst_channel as usize] = i16::from(value);
        dst.write_i16_simd(i, lanes)?;
    }
    Ok(())
}

/// Copies lane 0 of `src` (a `Simd_I16x8` buffer) into `dst` (an `AnalogI8` buffer), truncating
/// each `i16` lane to its low byte.
///
/// Narrowing discards the upper byte outright; it does not clip to `i8::MIN..=i8::MAX`. Callers
/// that need saturating behavior must clip before calling this function.
///
/// Fails with `TypeMismatch` if `src` is not `Simd_I16x8` or `dst` is not `AnalogI8`, or with
/// `OutOfBounds` if the sample counts disagree.
pub fn narrow_to_i8(src: &TimelineBuffer, dst: &mut TimelineBuffer) -> Result<()> {
    if src.sample_count() != dst.sample_count() {
        return crate::errors::out_of_bounds_error("src and dst sample counts must match");
    }

    for i in 0..src.sample_count() {
        let lane0 = src.read_i16_simd(i)?[0];
        // Truncate to the low byte, matching the narrowing's documented "discard the upper byte"
        // contract rather than `as i8`'s numerically-equivalent-but-differently-phrased cast.
        let truncated = (lane0 as u16 & 0x00FF) as u8 as i8;
        dst.write_i8(i, 0, truncated)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::TimeBase;

    fn tb() -> TimeBase {
        TimeBase::new(1, -6)
    }

    #[test]
    fn verify_prepare_allocates_eight_channel_aligned_buffer() {
        let src = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 10, tb()).unwrap();
        let mut dst = TimelineBuffer::empty(SampleLayout::Simd_I16x8, tb());
        prepare_simd_i16x8_from_i8(&src, &mut dst).unwrap();

        assert_eq!(dst.layout(), SampleLayout::Simd_I16x8);
        assert_eq!(dst.channel_count(), 8);
        assert_eq!(dst.sample_count(), 10);
        assert_eq!(dst.bytes_per_sample(), 16);
    }

    #[test]
    fn verify_widen_channel_sign_extends() {
        let mut src = TimelineBuffer::allocate(SampleLayout::AnalogI8, 2, 3, tb()).unwrap();
        src.write_i8(0, 0, -5).unwrap();
        src.write_i8(1, 0, 127).unwrap();
        src.write_i8(2, 0, -128).unwrap();

        let mut dst = TimelineBuffer::empty(SampleLayout::Simd_I16x8, tb());
        prepare_simd_i16x8_from_i8(&src, &mut dst).unwrap();
        widen_channel(&src, &mut dst, 0, 3).unwrap();

        assert_eq!(dst.read_i16_simd(0).unwrap()[3], -5);
        assert_eq!(dst.read_i16_simd(1).unwrap()[3], 127);
        assert_eq!(dst.read_i16_simd(2).unwrap()[3], -128);
        // Unused lanes stay zero.
        assert_eq!(dst.read_i16_simd(0).unwrap()[0], 0);
    }

    #[test]
    fn verify_narrow_truncates_lane_zero() {
        let mut src = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 8, 2, tb()).unwrap();
        let mut lanes = [0i16; 8];
        lanes[0] = 0x0142; // low byte 0x42, discarded high byte 0x01
        src.write_i16_simd(0, lanes).unwrap();
        lanes[0] = -1; // 0xFFFF truncates to 0xFF = -1i8
        src.write_i16_simd(1, lanes).unwrap();

        let mut dst = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 2, tb()).unwrap();
        narrow_to_i8(&src, &mut dst).unwrap();

        assert_eq!(dst.read_i8(0, 0).unwrap(), 0x42);
        assert_eq!(dst.read_i8(1, 0).unwrap(), -1);
    }

    #[test]
    fn verify_rejects_mismatched_sample_counts() {
        let src = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 8, 5, tb()).unwrap();
        let mut dst = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 4, tb()).unwrap();
        assert!(narrow_to_i8(&src, &mut dst).is_err());
    }
}
