// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the region capacity probe.

use swapboot_common::probe_region_size;

/// Reader that succeeds for offsets up to and including `limit` and records every read.
struct BoundedReader {
    limit: u64,
    probed: Vec<u32>,
}

impl BoundedReader {
    fn new(limit: u64) -> Self {
        Self {
            limit,
            probed: Vec::new(),
        }
    }
}

impl swapboot_common::hw::WordReader for BoundedReader {
    fn read_word(&mut self, offset: u32) -> Option<u32> {
        self.probed.push(offset);
        if (offset as u64) <= self.limit {
            Some(0xFFFF_FFFF)
        } else {
            None
        }
    }
}

// =============================================================================
// Boundary search
// =============================================================================

#[test]
fn test_probe_2048_up_to_16384() {
    let mut reader = BoundedReader::new(16384);
    assert_eq!(probe_region_size(&mut reader, 2048), 16384);
    assert_eq!(reader.probed, vec![2048, 4096, 8192, 16384, 32768]);
}

#[test]
fn test_probe_returns_boundary_for_every_power_of_two_multiple() {
    for min_unit in [256u32, 2048, 4096] {
        for shift in 0..12 {
            let boundary = min_unit << shift;
            let mut reader = BoundedReader::new(boundary as u64);
            assert_eq!(
                probe_region_size(&mut reader, min_unit),
                boundary,
                "min_unit={} boundary={}",
                min_unit,
                boundary
            );
        }
    }
}

#[test]
fn test_probe_stops_at_first_failure() {
    let mut reader = BoundedReader::new(8192);
    probe_region_size(&mut reader, 4096);
    assert_eq!(reader.probed.last(), Some(&16384));
    assert_eq!(reader.probed.len(), 3);
}

#[test]
fn test_probe_min_unit_unreadable_returns_min_unit() {
    let mut reader = BoundedReader::new(1024);
    assert_eq!(probe_region_size(&mut reader, 2048), 2048);
    assert_eq!(reader.probed, vec![2048]);
}

#[test]
fn test_probe_min_unit_only() {
    let mut reader = BoundedReader::new(4096);
    assert_eq!(probe_region_size(&mut reader, 4096), 4096);
}

#[test]
fn test_probe_never_failing_reader_stops_before_overflow() {
    let mut reader = BoundedReader::new(u64::MAX);
    assert_eq!(probe_region_size(&mut reader, 4096), 1 << 31);
}

#[test]
fn test_probe_accepts_closure_reader() {
    let mut reads = 0;
    let mut reader = |offset: u32| {
        reads += 1;
        (offset <= 64 * 1024).then_some(0u32)
    };
    assert_eq!(probe_region_size(&mut reader, 4096), 64 * 1024);
    assert_eq!(reads, 6);
}
