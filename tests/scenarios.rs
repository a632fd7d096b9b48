// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Black-box end-to-end scenarios exercising the public API exactly as an external consumer
//! (a signal source on one side, a plotting widget on the other) would.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use tracebuf::{
    backend, units::TimeBase, MinMaxAggregator, SampleLayout, SampleRateConverter, TimelineBuffer,
};

fn simd_buffer_from_channel0(values: &[i16], time_base: TimeBase) -> TimelineBuffer {
    let mut buf = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 8, values.len() as u32, time_base).unwrap();
    for (i, &v) in values.iter().enumerate() {
        let mut lanes = [0i16; 8];
        lanes[0] = v;
        buf.write_i16_simd(i as u32, lanes).unwrap();
    }
    buf
}

#[test]
fn identity_sample_rate_conversion() {
    let time_base = TimeBase::new(1, -6);
    let values: Vec<i16> = (0..1000).collect();
    let input = simd_buffer_from_channel0(&values, time_base);

    let mut output = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    let converter = SampleRateConverter::prepare(&input, 1_000_000.0, &mut output).unwrap();
    assert_eq!(output.sample_count(), 1000);

    converter.convert(&input, &mut output).unwrap();
    for i in 0..1000u32 {
        assert_eq!(output.read_i16_simd(i).unwrap()[0], i as i16);
        // Unused lanes stay zero throughout the conversion.
        assert_eq!(output.read_i16_simd(i).unwrap()[1], 0);
    }
}

#[test]
fn two_times_upsample() {
    let time_base = TimeBase::new(1, -6);
    let input = simd_buffer_from_channel0(&[0, 100, 200, 300], time_base);

    let mut output = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    let converter = SampleRateConverter::prepare(&input, 2_000_000.0, &mut output).unwrap();
    assert_eq!(output.sample_count(), 8);

    converter.convert(&input, &mut output).unwrap();
    let expected = [0, 50, 100, 150, 200, 250, 300, 300];
    for (i, &exp) in expected.iter().enumerate() {
        let got = output.read_i16_simd(i as u32).unwrap()[0];
        assert!((i32::from(got) - exp).abs() <= 1, "index {i}: got {got}, expected {exp}");
    }
}

#[test]
fn non_integer_downsample() {
    let time_base = TimeBase::new(1, -6);
    let input = simd_buffer_from_channel0(&[0, 10, 20, 30, 40, 50, 60, 70, 80, 90], time_base);

    let mut output = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    let converter = SampleRateConverter::prepare(&input, 300_000.0, &mut output).unwrap();
    assert_eq!(output.sample_count(), 3);

    converter.convert(&input, &mut output).unwrap();
    let expected = [0, 33, 67];
    for (i, &exp) in expected.iter().enumerate() {
        let got = output.read_i16_simd(i as u32).unwrap()[0];
        assert!((i32::from(got) - exp).abs() <= 1, "index {i}: got {got}, expected {exp}");
    }
}

#[test]
fn minmax_bins_over_analog_i8() {
    let time_base = TimeBase::new(1, -6);
    let values: [i8; 20] = [-5, 7, -3, 2, 4, -1, 8, 0, -8, 3, 6, -2, 1, 9, -9, 5, 7, -7, 4, 0];

    let mut input = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 20, time_base).unwrap();
    for (i, &v) in values.iter().enumerate() {
        input.write_i8(i as u32, 0, v).unwrap();
    }

    let mut out_min = TimelineBuffer::empty(SampleLayout::AnalogI8, time_base);
    let mut out_max = TimelineBuffer::empty(SampleLayout::AnalogI8, time_base);
    let aggregator = MinMaxAggregator::prepare(&input, 4, &mut out_min, &mut out_max).unwrap();
    aggregator.aggregate(&input, 0, 20, &mut out_min, &mut out_max).unwrap();

    let expected_min = [-5, -8, -9, -7];
    let expected_max = [7, 8, 9, 7];
    for i in 0..4u32 {
        assert_eq!(out_min.read_i8(i, 0).unwrap(), expected_min[i as usize]);
        assert_eq!(out_max.read_i8(i, 0).unwrap(), expected_max[i as usize]);
    }
}

#[test]
fn engineering_units_render_expected_prefixes() {
    let one_mhz = TimeBase::new(1, -6);
    assert_eq!(one_mhz.engineering_frequency(), (1.0, "MHz"));
    assert_eq!(one_mhz.engineering_interval(), (1.0, "\u{b5}s"));

    let forty_eight_us = TimeBase::new(48, -6);
    assert_eq!(forty_eight_us.engineering_interval(), (48.0, "\u{b5}s"));
    let (value, unit) = forty_eight_us.engineering_frequency();
    assert_eq!(unit, "kHz");
    assert!((value - 20.833_333_333_333_332).abs() < 1e-9);
}

#[test]
fn scalar_and_simd_backends_agree_on_a_large_pseudo_random_stream() {
    let time_base = TimeBase::new(1, -6);
    let mut rng = SmallRng::seed_from_u64(0xC0FF_EE42);

    let sample_count = 10_000u32;
    let mut input = TimelineBuffer::allocate(SampleLayout::Simd_I16x8, 8, sample_count, time_base).unwrap();
    for i in 0..sample_count {
        let mut lanes = [0i16; 8];
        for lane in lanes.iter_mut() {
            *lane = rng.random_range(i16::MIN..=i16::MAX);
        }
        input.write_i16_simd(i, lanes).unwrap();
    }

    // Sample-rate conversion at 0.8x: scalar and SIMD backends must agree within 1 LSB (P7).
    let original_backend_index = (0..backend::backend_count())
        .find(|&i| backend::backend_name(i).unwrap() == backend::active_backend().name())
        .unwrap();

    backend::set_backend(0).unwrap();
    let mut scalar_out = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    let scalar_converter = SampleRateConverter::prepare(&input, 800_000.0, &mut scalar_out).unwrap();
    scalar_converter.convert(&input, &mut scalar_out).unwrap();

    if backend::backend_count() > 1 {
        backend::set_backend(1).unwrap();
        let mut simd_out = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
        let simd_converter = SampleRateConverter::prepare(&input, 800_000.0, &mut simd_out).unwrap();
        simd_converter.convert(&input, &mut simd_out).unwrap();

        assert_eq!(scalar_out.sample_count(), simd_out.sample_count());
        for i in 0..scalar_out.sample_count() {
            let a = scalar_out.read_i16_simd(i).unwrap();
            let b = simd_out.read_i16_simd(i).unwrap();
            for lane in 0..8 {
                assert!(
                    (i32::from(a[lane]) - i32::from(b[lane])).abs() <= 1,
                    "sample {i} lane {lane}: scalar {} vs simd {}",
                    a[lane],
                    b[lane]
                );
            }
        }
    }

    // Min/max aggregation must agree bit-exactly (P6) across both backends, bin_count = 256.
    backend::set_backend(0).unwrap();
    let mut scalar_min = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    let mut scalar_max = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    let scalar_agg = MinMaxAggregator::prepare(&input, 256, &mut scalar_min, &mut scalar_max).unwrap();
    scalar_agg.aggregate(&input, 0, sample_count, &mut scalar_min, &mut scalar_max).unwrap();

    if backend::backend_count() > 1 {
        backend::set_backend(1).unwrap();
        let mut simd_min = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
        let mut simd_max = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
        let simd_agg = MinMaxAggregator::prepare(&input, 256, &mut simd_min, &mut simd_max).unwrap();
        simd_agg.aggregate(&input, 0, sample_count, &mut simd_min, &mut simd_max).unwrap();

        for i in 0..256u32 {
            assert_eq!(scalar_min.read_i16_simd(i).unwrap(), simd_min.read_i16_simd(i).unwrap());
            assert_eq!(scalar_max.read_i16_simd(i).unwrap(), simd_max.read_i16_simd(i).unwrap());
        }
    }

    backend::set_backend(original_backend_index).unwrap();
}

#[test]
fn layout_adapter_round_trips_a_widened_and_narrowed_channel() {
    let time_base = TimeBase::new(1, -6);
    let mut src = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 5, time_base).unwrap();
    for i in 0..5u32 {
        src.write_i8(i, 0, (i as i8) * 10 - 20).unwrap();
    }

    let mut simd = TimelineBuffer::empty(SampleLayout::Simd_I16x8, time_base);
    tracebuf::layout::prepare_simd_i16x8_from_i8(&src, &mut simd).unwrap();
    tracebuf::layout::widen_channel(&src, &mut simd, 0, 0).unwrap();

    let mut narrowed = TimelineBuffer::allocate(SampleLayout::AnalogI8, 1, 5, time_base).unwrap();
    tracebuf::layout::narrow_to_i8(&simd, &mut narrowed).unwrap();

    for i in 0..5u32 {
        assert_eq!(narrowed.read_i8(i, 0).unwrap(), src.read_i8(i, 0).unwrap());
    }
}

#[test]
fn backend_registry_exposes_expected_names_and_rejects_bad_indices() {
    assert_eq!(backend::backend_name(0).unwrap(), "C Backend");
    assert!(backend::backend_name(backend::backend_count()).is_err());
    assert!(backend::set_backend(backend::backend_count()).is_err());
}
