// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `units` module provides the engineering-unit time base shared by every `TimelineBuffer`.

/// A `TimeBase` is the conversion factor between a sample index and elapsed time, expressed as an
/// integer step in units of `10^time_exponent` seconds.
///
/// In other words, consecutive samples are `time_step * 10^time_exponent` seconds apart. Unlike a
/// `numer/denom` rational time base, this representation is chosen so that the exponent can be
/// picked independently to land on a convenient SI prefix (see `normalize_to_exponent`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeBase {
    /// The integer step between consecutive samples, in units of `10^time_exponent` seconds.
    pub time_step: u32,
    /// The signed decimal exponent applied to `time_step`.
    pub time_exponent: i8,
}

impl TimeBase {
    /// Creates a new `TimeBase`. Panics if `time_step` is 0, matching invariant I4.
    pub fn new(time_step: u32, time_exponent: i8) -> Self {
        assert!(time_step >= 1, "TimeBase time_step must be at least 1");
        TimeBase { time_step, time_exponent }
    }

    /// The sampling frequency in Hz: `1 / (time_step * 10^time_exponent)`.
    pub fn frequency_hz(&self) -> f64 {
        frequency_hz(self.time_step, self.time_exponent)
    }

    /// The duration of one sample interval, in seconds.
    pub fn interval_sec(&self) -> f64 {
        f64::from(self.time_step) * exp10(self.time_exponent)
    }

    /// The derived window duration in seconds for a buffer of `sample_count` samples using this
    /// time base.
    pub fn total_time_sec(&self, sample_count: usize) -> f64 {
        self.interval_sec() * sample_count as f64
    }

    /// Derives the ratio by which this time base's sampling rate must be scaled to reach
    /// `output_sample_rate_hz`.
    pub fn rate_ratio(&self, output_sample_rate_hz: f64) -> f64 {
        rate_ratio(*self, output_sample_rate_hz)
    }

    /// Engineering-unit rendering of this time base's sampling frequency, e.g. `(1.0, "MHz")`.
    pub fn engineering_frequency(&self) -> (f64, &'static str) {
        engineering_frequency(self.time_step, self.time_exponent)
    }

    /// Engineering-unit rendering of this time base's sample interval, e.g. `(1.0, "µs")`.
    pub fn engineering_interval(&self) -> (f64, &'static str) {
        engineering_interval(self.time_step, self.time_exponent)
    }
}

/// `1 / (time_step * 10^time_exponent)`, the sampling frequency in Hz for the given step/exponent
/// pair.
pub fn frequency_hz(time_step: u32, time_exponent: i8) -> f64 {
    1.0 / (f64::from(time_step) * exp10(time_exponent))
}

/// `output_rate / (1 / (input.time_step * 10^input.time_exponent))`, the ratio by which
/// `input`'s sampling rate must be scaled to reach `output_sample_rate_hz`.
pub fn rate_ratio(input: TimeBase, output_sample_rate_hz: f64) -> f64 {
    output_sample_rate_hz / frequency_hz(input.time_step, input.time_exponent)
}

fn exp10(exponent: i8) -> f64 {
    10f64.powi(i32::from(exponent))
}

/// SI prefixes applied to Hz, in ascending order.
const FREQUENCY_UNITS: &[&str] = &["Hz", "kHz", "MHz", "GHz", "THz", "PHz"];

/// Chooses an engineering-unit rendering `(value, unit)` of the sampling frequency implied by
/// `time_step`/`time_exponent`, such that `value` falls in `[1, 1000)` whenever possible.
///
/// The mantissa is only allowed outside `[1, 1000)` when the unit has already saturated at `PHz`
/// (property P8).
pub fn engineering_frequency(time_step: u32, time_exponent: i8) -> (f64, &'static str) {
    let mut value = frequency_hz(time_step, time_exponent);
    let mut unit_index = 0;

    while value >= 1000.0 && unit_index + 1 < FREQUENCY_UNITS.len() {
        value /= 1000.0;
        unit_index += 1;
    }

    (value, FREQUENCY_UNITS[unit_index])
}

/// Chooses an engineering-unit rendering `(value, unit)` of the sample interval implied by
/// `time_step`/`time_exponent`. Unlike `engineering_frequency`, the unit is a direct table lookup
/// on `time_exponent` rather than a search: the interval's value is always `time_step` itself,
/// re-based into whichever unit `time_exponent` names.
pub fn engineering_interval(time_step: u32, time_exponent: i8) -> (f64, &'static str) {
    let unit = match time_exponent {
        0 => "s",
        -3 => "ms",
        -6 => "µs",
        -9 => "ns",
        -12 => "ps",
        -15 => "fs",
        _ => "?s",
    };
    (f64::from(time_step), unit)
}

/// Picks the largest exponent `e` in `{+15, +12, ..., -15}` such that `target_seconds / 10^e >= 1`,
/// and the integer step that best approximates `target_seconds` at that exponent.
///
/// Returns `None` if no exponent in range produces a step that fits in a `u32`.
pub fn normalize_to_exponent(target_seconds: f64) -> Option<(u32, i8)> {
    if !(target_seconds > 0.0) || !target_seconds.is_finite() {
        return None;
    }

    for e in (-15..=15).rev().step_by(3) {
        let scaled = target_seconds / exp10(e as i8);
        if scaled >= 1.0 {
            let step = scaled.round();
            if step <= f64::from(u32::MAX) {
                return Some((step as u32, e as i8));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_engineering_frequency() {
        assert_eq!(engineering_frequency(1, -6), (1.0, "MHz"));
        let (value, unit) = engineering_frequency(48, -6);
        assert_eq!(unit, "kHz");
        assert!((value - 20.833_333_333_333_332).abs() < 1e-9);
    }

    #[test]
    fn verify_engineering_frequency_caps_at_phz() {
        // An absurdly high frequency must still report a unit, capped at PHz, even though the
        // mantissa then exceeds 1000 (P8's documented exception).
        let (_, unit) = engineering_frequency(1, -20);
        assert_eq!(unit, "PHz");
    }

    #[test]
    fn verify_engineering_interval() {
        assert_eq!(engineering_interval(1, -6), (1.0, "µs"));
        assert_eq!(engineering_interval(48, -6), (48.0, "µs"));
        assert_eq!(engineering_interval(1, 0).1, "s");
        assert_eq!(engineering_interval(1, -3).1, "ms");
        assert_eq!(engineering_interval(1, -9).1, "ns");
        assert_eq!(engineering_interval(1, -12).1, "ps");
        assert_eq!(engineering_interval(1, -15).1, "fs");
        assert_eq!(engineering_interval(1, 7).1, "?s");
    }

    #[test]
    fn verify_normalize_to_exponent() {
        // One microsecond.
        assert_eq!(normalize_to_exponent(1e-6), Some((1, -6)));
        // 48 microseconds.
        assert_eq!(normalize_to_exponent(48e-6), Some((48, -6)));
    }

    #[test]
    fn verify_rate_ratio() {
        let tb = TimeBase::new(1, -6);
        assert!((tb.rate_ratio(2_000_000.0) - 2.0).abs() < 1e-9);
        assert!((tb.rate_ratio(300_000.0) - 0.3).abs() < 1e-9);
    }
}
