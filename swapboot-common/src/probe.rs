// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Region capacity probe.
//!
//! Finds how much of the firmware region is readable with an exponential
//! search: start at the smallest granule, read one word at the probed size,
//! and keep doubling while reads succeed. The result is the last size whose
//! read succeeded, so it is always a power-of-two multiple of the granule.

use crate::hw::WordReader;

/// Probe the readable region size.
///
/// `min_unit` is the smallest readable granule of the device and is assumed
/// to be readable; if even that read fails, `min_unit` is returned.
pub fn probe_region_size<R: WordReader + ?Sized>(reader: &mut R, min_unit: u32) -> u32 {
    let mut size = min_unit;
    if reader.read_word(size).is_none() {
        return size;
    }

    loop {
        let Some(next) = size.checked_mul(2) else {
            return size;
        };
        if reader.read_word(next).is_none() {
            return size;
        }
        size = next;
    }
}
