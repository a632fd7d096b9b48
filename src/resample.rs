// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample-rate conversion: a two-phase `prepare`/`convert` engine that hoists all `f64`
//! derivation into `prepare`, leaving `convert` a tight, division-free loop over a precomputed
//! [`InterpolationPlan`].

use crate::backend::{active_backend, Backend};
use crate::buffer::{read_i16x8_flat, write_i16x8_flat, InterpolationPlan, TimelineBuffer};
use crate::errors::{bad_shape_error, empty_input_error, Result};
use crate::sample::SampleLayout;
use crate::units::{normalize_to_exponent, rate_ratio, TimeBase};

/// A snapshot of the ratio derived during `prepare`, retained on the converter for diagnostics and
/// for `convert` to size its per-call work without recomputing it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RateInfo {
    pub ratio: f64,
}

/// Two-phase sample-rate converter: `prepare` derives everything that needs `f64` arithmetic or
/// fallible allocation, `convert` runs the resulting plan against the active backend.
pub struct SampleRateConverter {
    plan: InterpolationPlan,
    rate_info: RateInfo,
}

impl SampleRateConverter {
    /// Derives `output`'s sample count and time base from `input` and `target_rate_hz`, allocates
    /// `output`'s storage, and precomputes the interpolation plan `convert` will later consume.
    ///
    /// Fails with `EmptyInput` if `input.sample_count() < 2`; with `BadShape` if `input`'s layout
    /// is neither `Simd_I16x8` nor single-channel `AnalogI8` (the only shapes this converter
    /// supports); with whatever `TimelineBuffer::allocate` reports otherwise.
    pub fn prepare(input: &TimelineBuffer, target_rate_hz: f64, output: &mut TimelineBuffer) -> Result<Self> {
        if input.sample_count() < 2 {
            return empty_input_error("sample-rate conversion requires at least 2 input samples");
        }

        match input.layout() {
            SampleLayout::Simd_I16x8 => {}
            SampleLayout::AnalogI8 if input.channel_count() == 1 => {}
            SampleLayout::AnalogI8 => {
                return bad_shape_error("AnalogI8 sample-rate conversion only supports a single channel")
            }
            _ => return bad_shape_error("sample-rate conversion only supports Simd_I16x8 or AnalogI8 layouts"),
        }

        let ratio = rate_ratio(input.time_base(), target_rate_hz);
        let output_sample_count = (f64::from(input.sample_count()) * ratio).floor() as u32;
        let output_sample_count = output_sample_count.max(1);

        let interval_sec = 1.0 / target_rate_hz;
        let (time_step, time_exponent) =
            normalize_to_exponent(interval_sec).unwrap_or((input.time_base().time_step, input.time_base().time_exponent));

        *output = TimelineBuffer::allocate(
            input.layout(),
            input.channel_count(),
            output_sample_count,
            TimeBase::new(time_step, time_exponent),
        )?;

        // Both supported layouts drive their `convert` kernel from a precomputed plan; building it
        // here, rather than in `convert`, keeps all `f64` division/rounding and allocation out of
        // the hot per-sample loop (the "plan + kernel separation" this converter exists to enforce).
        let plan = InterpolationPlan::build(input.sample_count(), output_sample_count);

        Ok(SampleRateConverter { plan, rate_info: RateInfo { ratio } })
    }

    pub fn rate_info(&self) -> RateInfo {
        self.rate_info
    }

    pub fn plan(&self) -> &InterpolationPlan {
        &self.plan
    }

    /// Runs the conversion, reading `input` and writing every sample of `output`, dispatching to
    /// the process-wide active backend.
    ///
    /// `output` must be the same buffer `prepare` sized (or one shaped identically); layout
    /// mismatches are reported as `BadShape`.
    pub fn convert(&self, input: &TimelineBuffer, output: &mut TimelineBuffer) -> Result<()> {
        match input.layout() {
            SampleLayout::Simd_I16x8 => self.convert_simd_i16x8(input, output),
            SampleLayout::AnalogI8 => self.convert_analog_i8(input, output),
            _ => bad_shape_error("sample-rate conversion only supports Simd_I16x8 or AnalogI8 layouts"),
        }
    }

    fn convert_simd_i16x8(&self, input: &TimelineBuffer, output: &mut TimelineBuffer) -> Result<()> {
        let input_samples = read_i16x8_flat(input)?;
        let mut output_samples = vec![0i16; self.plan.len() * 8];

        active_backend().convert_sample_rate_i16x8(&input_samples, self.plan.entries(), &mut output_samples);

        write_i16x8_flat(output, &output_samples)
    }

    fn convert_analog_i8(&self, input: &TimelineBuffer, output: &mut TimelineBuffer) -> Result<()> {
        if input.channel_count() != 1 {
            return bad_shape_error("AnalogI8 sample-rate conversion only supports a single channel");
        }

        let mut input_samples = Vec::with_capacity(input.sample_count() as usize);
        for i in 0..input.sample_count() {
            input_samples.push(input.read_i8(i, 0)?);
        }

        let mut output_samples = vec![0i8; output.sample_count() as usize];
        active_backend().convert_sample_rate_i8(&input_samples, self.plan.entries(), &mut output_samples);

        for (i, &value) in output_samples.iter().enumerate() {
            output.write_i8(i as u32, 0, value)?;
        }
        Ok(())
    }
}
