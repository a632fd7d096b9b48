// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The portable, scalar reference backend. Always compiled in; every SIMD backend's output is
//! defined to match this one exactly (property P6).

use crate::buffer::PlanEntry;

use super::Backend;

/// A division-free, branch-free-per-sample scalar kernel set. Every other backend's output must
/// agree with this one bit-for-bit.
pub struct ScalarBackend;

/// `(v0 * inv_frac + v1 * frac) / 0x10000`, rounded to nearest.
///
/// Accumulates in `i64`: at the weight endpoints (`frac_q16` or `inv_frac_q16` == `0x10000`) the
/// product plus the rounding bias can exceed `i32::MAX`, so `i32` accumulation would overflow.
fn interpolate_q16(v0: i32, v1: i32, frac_q16: u32, inv_frac_q16: u32) -> i32 {
    let acc = i64::from(v0) * i64::from(inv_frac_q16) + i64::from(v1) * i64::from(frac_q16);
    // Round-to-nearest via a half-unit bias before the shift.
    ((acc + 0x8000) >> 16) as i32
}

impl Backend for ScalarBackend {
    fn name(&self) -> &'static str {
        "C Backend"
    }

    fn convert_sample_rate_i16x8(&self, input: &[i16], plan: &[PlanEntry], output: &mut [i16]) {
        for (i, entry) in plan.iter().enumerate() {
            let (idx0, idx1) = (entry.idx0 as usize, entry.idx1 as usize);
            for lane in 0..8 {
                let v0 = i32::from(input[idx0 * 8 + lane]);
                let v1 = i32::from(input[idx1 * 8 + lane]);
                let interpolated = interpolate_q16(v0, v1, entry.frac_q16, entry.inv_frac_q16);
                output[i * 8 + lane] = interpolated.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
            }
        }
    }

    fn convert_sample_rate_i8(&self, input: &[i8], plan: &[PlanEntry], output: &mut [i8]) {
        for (i, entry) in plan.iter().enumerate() {
            let v0 = i32::from(input[entry.idx0 as usize]);
            let v1 = i32::from(input[entry.idx1 as usize]);
            let interpolated = interpolate_q16(v0, v1, entry.frac_q16, entry.inv_frac_q16);
            output[i] = interpolated.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
        }
    }

    fn aggregate_minmax_i16x8(
        &self,
        input: &[i16],
        bins: &[(u32, u32)],
        out_min: &mut [i16],
        out_max: &mut [i16],
    ) {
        for (bin_index, &(start, end)) in bins.iter().enumerate() {
            for lane in 0..8 {
                let mut min = i16::MAX;
                let mut max = i16::MIN;
                for sample in start..end {
                    let v = input[sample as usize * 8 + lane];
                    min = min.min(v);
                    max = max.max(v);
                }
                out_min[bin_index * 8 + lane] = min;
                out_max[bin_index * 8 + lane] = max;
            }
        }
    }

    fn aggregate_minmax_i8(&self, input: &[i8], bins: &[(u32, u32)], out_min: &mut [i8], out_max: &mut [i8]) {
        for (bin_index, &(start, end)) in bins.iter().enumerate() {
            let mut min = i8::MAX;
            let mut max = i8::MIN;
            for sample in start..end {
                let v = input[sample as usize];
                min = min.min(v);
                max = max.max(v);
            }
            out_min[bin_index] = min;
            out_max[bin_index] = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_identity_conversion_is_exact() {
        let backend = ScalarBackend;
        let input: Vec<i16> = (0..16).collect();
        let plan: Vec<PlanEntry> =
            (0..2).map(|i| PlanEntry { idx0: i, idx1: (i + 1).min(1), frac_q16: 0, inv_frac_q16: 0x10000 }).collect();
        let mut output = vec![0i16; 16];
        backend.convert_sample_rate_i16x8(&input, &plan, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn verify_minmax_i8_over_single_bin() {
        let backend = ScalarBackend;
        let input: Vec<i8> = vec![3, -5, 10, -2];
        let bins = [(0u32, 4u32)];
        let mut out_min = [0i8; 1];
        let mut out_max = [0i8; 1];
        backend.aggregate_minmax_i8(&input, &bins, &mut out_min, &mut out_max);
        assert_eq!(out_min[0], -5);
        assert_eq!(out_max[0], 10);
    }

    #[test]
    fn verify_minmax_i16x8_per_lane() {
        let backend = ScalarBackend;
        // Two samples, 8 lanes each; lane `l` holds values `l` and `-l`.
        let mut input = [0i16; 16];
        for l in 0..8 {
            input[l] = l as i16;
            input[8 + l] = -(l as i16);
        }
        let bins = [(0u32, 2u32)];
        let mut out_min = [0i16; 8];
        let mut out_max = [0i16; 8];
        backend.aggregate_minmax_i16x8(&input, &bins, &mut out_min, &mut out_max);
        for l in 0..8 {
            assert_eq!(out_min[l], -(l as i16));
            assert_eq!(out_max[l], l as i16);
        }
    }
}
