// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # tracebuf
//!
//! `tracebuf` is an in-memory time-series buffer library for multi-channel, fixed-rate,
//! uniformly-sampled numeric signals: audio, oscilloscope traces, and instrumentation streams.
//!
//! It provides three tightly coupled capabilities built on a single typed, interleaved buffer
//! abstraction (atop [`buffer::TimelineBuffer`] and its [`units::TimeBase`]):
//!
//! - **Sample-rate conversion** ([`resample::SampleRateConverter`]) resamples a buffer to a new
//!   rate via linear interpolation, driven by a precomputed Bresenham-style interpolation plan.
//! - **Min/max aggregation** ([`minmax::MinMaxAggregator`]) downsamples a window of input samples
//!   to a fixed number of output bins for visualization, one `(min, max)` pair per bin.
//! - **Layout adaptation** ([`layout`]) converts between the scalar `AnalogI8` layout and the
//!   SIMD-aligned 8-channel `Simd_I16x8` layout the two engines above are optimized for.
//!
//! Both engines dispatch their hot inner loops through a swappable [`backend::Backend`]: a
//! portable scalar reference implementation, always present, and an accelerated implementation
//! built on the `wide` crate's portable SIMD types, compiled in under the default `simd` feature.
//! The two backends are guaranteed to agree exactly on min/max aggregation and within one LSB on
//! sample-rate conversion (rounding differs only at the edges of the Q16 fixed-point math).
//!
//! This crate contains no I/O, no wire format, and no rendering; it is a pure, in-process
//! computational core meant to sit between a signal source (packet capture, a waveform generator)
//! and a consumer (a plotting widget) that each live outside this crate's scope.

pub mod backend;
pub mod buffer;
pub mod errors;
pub mod layout;
pub mod minmax;
pub mod resample;
pub mod sample;
pub mod units;
mod util;

pub use backend::{backend_count, backend_name, set_backend, BackendId};
pub use buffer::TimelineBuffer;
pub use errors::{Result, TracebufError};
pub use minmax::MinMaxAggregator;
pub use resample::{RateInfo, SampleRateConverter};
pub use sample::SampleLayout;
pub use units::TimeBase;
