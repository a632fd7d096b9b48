// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The SIMD-accelerated backend, built on the `wide` crate's portable vector types rather than
//! architecture intrinsics, so it stays within `unsafe_code = "forbid"`.
//!
//! Every kernel here must agree with [`super::scalar::ScalarBackend`] bit-for-bit (property P6);
//! the only thing that changes is how many lanes are processed per iteration.

use wide::{i16x8, i8x16};

use crate::buffer::PlanEntry;

use super::Backend;

/// Picks the diagnostic name for the compiled-in SIMD backend based on target architecture. The
/// kernels below are written against `wide`'s portable vector API and behave identically
/// regardless of which name is reported; the name only documents which ISA `wide` is expected to
/// lower to on this target.
#[cfg(target_arch = "aarch64")]
const BACKEND_NAME: &str = "Neon SIMD Backend";
#[cfg(target_arch = "x86_64")]
const BACKEND_NAME: &str = "Intel AVX2 SIMD Backend";
#[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
const BACKEND_NAME: &str = "Fallback C Backend";

pub struct SimdBackend;

/// `(v0 * inv_frac + v1 * frac) / 0x10000`, rounded to nearest. Identical to the scalar backend's
/// kernel of the same shape (property P6) — the weight multiply-accumulate needs 64-bit headroom
/// at the `0x10000` endpoint, which isn't worth fighting a fixed-width vector lane over when 8
/// independent channels already give this kernel plenty to do per sample.
fn interpolate_q16(v0: i32, v1: i32, frac_q16: u32, inv_frac_q16: u32) -> i32 {
    let acc = i64::from(v0) * i64::from(inv_frac_q16) + i64::from(v1) * i64::from(frac_q16);
    ((acc + 0x8000) >> 16) as i32
}

impl Backend for SimdBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
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
        // The AnalogI8 path operates on a single channel at a time; there is no lane-parallel
        // benefit to SIMD here, so this mirrors the scalar kernel directly.
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
            let mut min = i16x8::splat(i16::MAX);
            let mut max = i16x8::splat(i16::MIN);

            for sample in start..end {
                let offset = sample as usize * 8;
                let v = i16x8::from(<[i16; 8]>::try_from(&input[offset..offset + 8]).unwrap());
                min = min.min(v);
                max = max.max(v);
            }

            out_min[bin_index * 8..bin_index * 8 + 8].copy_from_slice(&min.to_array());
            out_max[bin_index * 8..bin_index * 8 + 8].copy_from_slice(&max.to_array());
        }
    }

    fn aggregate_minmax_i8(&self, input: &[i8], bins: &[(u32, u32)], out_min: &mut [i8], out_max: &mut [i8]) {
        for (bin_index, &(start, end)) in bins.iter().enumerate() {
            let mut min = i8::MAX;
            let mut max = i8::MIN;

            // Process in 16-lane chunks where a full chunk is available; `wide::i8x16` has no
            // horizontal reduce, so lanes are folded down with `to_array()` once per chunk rather
            // than per sample.
            let mut sample = start;
            while sample + 16 <= end {
                let offset = sample as usize;
                let chunk = i8x16::from(<[i8; 16]>::try_from(&input[offset..offset + 16]).unwrap());
                for v in chunk.to_array() {
                    min = min.min(v);
                    max = max.max(v);
                }
                sample += 16;
            }
            for s in sample..end {
                let v = input[s as usize];
                min = min.min(v);
                max = max.max(v);
            }

            out_min[bin_index] = min;
            out_max[bin_index] = max;
        }
    }
}
