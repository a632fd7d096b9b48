// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Min/max aggregation: downsamples a window of input samples to a fixed number of output bins,
//! each holding the per-channel extremes of its input sub-range.

use crate::backend::{active_backend, Backend};
use crate::buffer::{read_i16x8_flat, write_i16x8_flat, TimelineBuffer};
use crate::errors::{bad_shape_error, out_of_bounds_error, Result};
use crate::sample::SampleLayout;

/// Two-phase min/max aggregator: `prepare` allocates the two output buffers, `aggregate`
/// partitions the input window into bins and fills them via the active backend.
pub struct MinMaxAggregator {
    bin_count: u32,
}

impl MinMaxAggregator {
    /// Allocates `out_min` and `out_max` with the same layout, channel count, and time base as
    /// `input`, each sized to hold `bin_count` samples.
    pub fn prepare(
        input: &TimelineBuffer,
        bin_count: u32,
        out_min: &mut TimelineBuffer,
        out_max: &mut TimelineBuffer,
    ) -> Result<Self> {
        if bin_count == 0 {
            return bad_shape_error("bin_count must be at least 1");
        }
        match input.layout() {
            SampleLayout::Simd_I16x8 => {}
            SampleLayout::AnalogI8 if input.channel_count() == 1 => {}
            SampleLayout::AnalogI8 => {
                return bad_shape_error("AnalogI8 min/max aggregation only supports a single channel")
            }
            _ => return bad_shape_error("min/max aggregation only supports Simd_I16x8 or AnalogI8 layouts"),
        }

        *out_min = TimelineBuffer::allocate(input.layout(), input.channel_count(), bin_count, input.time_base())?;
        *out_max = TimelineBuffer::allocate(input.layout(), input.channel_count(), bin_count, input.time_base())?;

        Ok(MinMaxAggregator { bin_count })
    }

    /// Partitions `[in_offset, in_offset + in_samples)` into `bin_count` equal (floating-point
    /// stride) sub-ranges and writes each bin's per-channel min/max through the active backend.
    pub fn aggregate(
        &self,
        input: &TimelineBuffer,
        in_offset: u32,
        in_samples: u32,
        out_min: &mut TimelineBuffer,
        out_max: &mut TimelineBuffer,
    ) -> Result<()> {
        if in_offset.checked_add(in_samples).map_or(true, |end| end > input.sample_count()) {
            return out_of_bounds_error("aggregation window extends past input.sample_count()");
        }

        let bins = self.compute_bins(in_offset, in_samples);

        match input.layout() {
            SampleLayout::Simd_I16x8 => self.aggregate_simd_i16x8(input, &bins, out_min, out_max),
            SampleLayout::AnalogI8 => self.aggregate_analog_i8(input, &bins, out_min, out_max),
            _ => bad_shape_error("min/max aggregation only supports Simd_I16x8 or AnalogI8 layouts"),
        }
    }

    /// Computes `(start, end)` sample index ranges for each of `bin_count` bins over
    /// `[in_offset, in_offset + in_samples)`, using a floating-point stride so bins are as even as
    /// possible; degenerate (empty) bins are widened to at least one sample, then clamped to the
    /// window's end.
    fn compute_bins(&self, in_offset: u32, in_samples: u32) -> Vec<(u32, u32)> {
        let stride = f64::from(in_samples) / f64::from(self.bin_count);
        let window_end = in_offset + in_samples;

        (0..self.bin_count)
            .map(|i| {
                let start = in_offset + (f64::from(i) * stride).floor() as u32;
                let mut end = in_offset + (f64::from(i + 1) * stride).floor() as u32;
                if end <= start {
                    end = start + 1;
                }
                (start, end.min(window_end))
            })
            .collect()
    }

    fn aggregate_simd_i16x8(
        &self,
        input: &TimelineBuffer,
        bins: &[(u32, u32)],
        out_min: &mut TimelineBuffer,
        out_max: &mut TimelineBuffer,
    ) -> Result<()> {
        let flat = read_i16x8_flat(input)?;

        let mut min_flat = vec![0i16; bins.len() * 8];
        let mut max_flat = vec![0i16; bins.len() * 8];
        active_backend().aggregate_minmax_i16x8(&flat, bins, &mut min_flat, &mut max_flat);

        write_i16x8_flat(out_min, &min_flat)?;
        write_i16x8_flat(out_max, &max_flat)
    }

    fn aggregate_analog_i8(
        &self,
        input: &TimelineBuffer,
        bins: &[(u32, u32)],
        out_min: &mut TimelineBuffer,
        out_max: &mut TimelineBuffer,
    ) -> Result<()> {
        if input.channel_count() != 1 {
            return bad_shape_error("AnalogI8 min/max aggregation only supports a single channel");
        }

        let mut flat = Vec::with_capacity(input.sample_count() as usize);
        for i in 0..input.sample_count() {
            flat.push(input.read_i8(i, 0)?);
        }

        let mut min_flat = vec![0i8; bins.len()];
        let mut max_flat = vec![0i8; bins.len()];
        active_backend().aggregate_minmax_i8(&flat, bins, &mut min_flat, &mut max_flat);

        for (i, (&min, &max)) in min_flat.iter().zip(max_flat.iter()).enumerate() {
            out_min.write_i8(i as u32, 0, min)?;
            out_max.write_i8(i as u32, 0, max)?;
        }
        Ok(())
    }
}
