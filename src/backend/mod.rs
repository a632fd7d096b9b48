// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `BackendRegistry` selects, at runtime, which kernel implementation services sample-rate
//! conversion and min/max aggregation: a portable scalar reference backend, always present, and
//! an optional SIMD-accelerated backend compiled in under the `simd` feature.
//!
//! This mirrors how a codec registry picks a decoder implementation, except there is always
//! exactly one active backend process-wide rather than one per stream.

pub mod scalar;
#[cfg(feature = "simd")]
pub mod simd;

use std::sync::{OnceLock, RwLock};

use crate::buffer::PlanEntry;
use crate::errors::{invalid_backend_error, Result};

/// The function table a sample-rate-conversion/min-max backend must implement.
///
/// Every method takes already-validated, already-shaped slices; backends are not responsible for
/// bounds or layout checking; `resample`/`minmax` do that before dispatching here.
pub trait Backend: Send + Sync {
    /// A short, human-readable name for diagnostics and `BackendRegistry::backend_name`.
    fn name(&self) -> &'static str;

    /// Interpolates 8-lane `i16` samples from `input` according to `plan`, writing one output
    /// sample (8 lanes) per plan entry into `output`.
    ///
    /// `input` and `output` are flat, lane-major arrays: `input[idx * 8 + lane]`.
    fn convert_sample_rate_i16x8(&self, input: &[i16], plan: &[PlanEntry], output: &mut [i16]);

    /// Interpolates single-channel `i8` samples from `input` according to `plan`.
    fn convert_sample_rate_i8(&self, input: &[i8], plan: &[PlanEntry], output: &mut [i8]);

    /// Computes per-channel, per-bin min/max pairs over 8-lane `i16` samples.
    ///
    /// `input` is lane-major as above. `bins` gives `(start, end)` sample index ranges, one per
    /// output bin. `out_min`/`out_max` are lane-major, one `(min, max)` pair per `(bin, lane)`.
    fn aggregate_minmax_i16x8(
        &self,
        input: &[i16],
        bins: &[(u32, u32)],
        out_min: &mut [i16],
        out_max: &mut [i16],
    );

    /// Computes min/max pairs over single-channel `i8` samples, one pair per bin.
    fn aggregate_minmax_i8(&self, input: &[i8], bins: &[(u32, u32)], out_min: &mut [i8], out_max: &mut [i8]);
}

/// A registered backend and its diagnostic name.
struct Entry {
    backend: &'static dyn Backend,
}

fn registered_backends() -> &'static [Entry] {
    static SCALAR: scalar::ScalarBackend = scalar::ScalarBackend;

    #[cfg(feature = "simd")]
    {
        static SIMD: simd::SimdBackend = simd::SimdBackend;
        static BACKENDS: [Entry; 2] = [Entry { backend: &SCALAR }, Entry { backend: &SIMD }];
        &BACKENDS
    }

    #[cfg(not(feature = "simd"))]
    {
        static BACKENDS: [Entry; 1] = [Entry { backend: &SCALAR }];
        &BACKENDS
    }
}

fn active_slot() -> &'static RwLock<&'static dyn Backend> {
    static ACTIVE: OnceLock<RwLock<&'static dyn Backend>> = OnceLock::new();
    ACTIVE.get_or_init(|| {
        // The SIMD backend, when compiled in, is preferred by default; it is always registered
        // last, so it is always the highest index.
        let backends = registered_backends();
        RwLock::new(backends[backends.len() - 1].backend)
    })
}

/// Identifies a registered backend by its index in the process-wide registry.
pub type BackendId = usize;

/// The number of backends compiled into this build: 1 without the `simd` feature, 2 with it.
pub fn backend_count() -> usize {
    registered_backends().len()
}

/// The diagnostic name of the backend at `index`, e.g. `"C Backend"` or `"SIMD Backend"`.
///
/// Fails with `InvalidBackend` if `index` is not a registered backend. There is no sentinel index
/// for "the current backend" here, unlike the original C API's `-1`/`"current"` convention: call
/// `active_backend().name()` directly instead, which is unambiguous and needs no reserved value.
pub fn backend_name(index: BackendId) -> Result<&'static str> {
    match registered_backends().get(index) {
        Some(entry) => Ok(entry.backend.name()),
        None => invalid_backend_error("no backend registered at this index"),
    }
}

/// Switches the process-wide active backend to the one at `index`.
///
/// Fails with `InvalidBackend` if `index` is not a registered backend.
pub fn set_backend(index: BackendId) -> Result<()> {
    let Some(entry) = registered_backends().get(index)
    else {
        return invalid_backend_error("no backend registered at this index");
    };

    *active_slot().write().expect("backend lock poisoned") = entry.backend;
    log::debug!("tracebuf (backend): switched to {}", entry.backend.name());
    Ok(())
}

/// The currently active backend.
pub fn active_backend() -> &'static dyn Backend {
    *active_slot().read().expect("backend lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_backend_count_matches_feature_set() {
        let count = backend_count();
        if cfg!(feature = "simd") {
            assert_eq!(count, 2);
        }
        else {
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn verify_backend_name_index_zero_is_c_backend() {
        assert_eq!(backend_name(0).unwrap(), "C Backend");
    }

    #[test]
    fn verify_invalid_backend_index_is_rejected() {
        assert!(backend_name(backend_count()).is_err());
        assert!(set_backend(backend_count()).is_err());
    }

    #[test]
    fn verify_set_backend_changes_active_backend() {
        let original = active_backend().name();
        set_backend(0).unwrap();
        assert_eq!(active_backend().name(), "C Backend");
        // Restore, since `active_slot` is a process-wide singleton shared across tests.
        for i in 0..backend_count() {
            if backend_name(i).unwrap() == original {
                set_backend(i).unwrap();
                break;
            }
        }
    }
}
